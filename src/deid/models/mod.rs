//! Data models for the de-identification pipeline

pub mod entity;
pub mod request;

pub use entity::{DetectionSource, Entity, EntityType};
pub use request::{
    default_enabled_entity_types, AnonymizationMethod, Language, MaskKeyword, ProcessRequest,
    ProcessResponse, Statistics,
};
