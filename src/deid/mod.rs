//! De-identification pipeline
//!
//! Text flows through language detection, layered entity detection,
//! resolution, optional external validation and anonymization. All offsets
//! exchanged between stages are Unicode code points.

pub mod anonymizer;
pub mod audit;
pub mod detector;
pub mod engine;
pub mod keywords;
pub mod language;
pub mod models;
pub mod resolver;
pub mod text;
pub mod validator;

pub use engine::{DeidEngine, PipelineStage};
pub use models::{
    AnonymizationMethod, Entity, EntityType, Language, MaskKeyword, ProcessRequest,
    ProcessResponse,
};
