// ThaiDeid - Thai/English medical text de-identification
// Copyright (c) 2025 ThaiDeid Contributors
// Licensed under the MIT License

//! # ThaiDeid
//!
//! De-identification of protected health information in Thai, English and
//! mixed-script clinical text.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`deid`] - The pipeline: detection, resolution, validation, anonymization
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thaideid::deid::{AnonymizationMethod, DeidEngine, MaskKeyword, ProcessRequest};
//!
//! # fn example() -> thaideid::domain::Result<()> {
//! let engine = DeidEngine::with_defaults()?;
//!
//! let request = ProcessRequest::new("Patient John Smith, HN: 12345", AnonymizationMethod::Mask)
//!     .with_mask_list(vec![MaskKeyword::new("John Smith", "PERSON")]);
//! let response = engine.process(&request)?;
//!
//! assert_eq!(response.deidentified_text, "Patient [PERSON], [ID]");
//! # Ok(())
//! # }
//! ```
//!
//! ## Validation
//!
//! [`deid::DeidEngine::process_with_validation`] sends the resolved
//! candidates to an external validator. Any validator failure yields the
//! same response as [`deid::DeidEngine::process`].
//!
//! ```rust,no_run
//! use thaideid::config::load_config_or_default;
//! use thaideid::deid::{AnonymizationMethod, DeidEngine, ProcessRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("thaideid.toml")?;
//! let engine = DeidEngine::from_config(&config)?;
//!
//! let request = ProcessRequest::new("นพ.สมชาย ใจดี มาตรวจ", AnonymizationMethod::Pseudonymize);
//! let response = engine.process_with_validation(&request).await?;
//! println!("{}", response.deidentified_text);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod deid;
pub mod domain;
pub mod logging;
