//! Pipeline orchestrator
//!
//! This module provides [`DeidEngine`], which runs one request through the
//! de-identification state machine:
//!
//! ```text
//! Received -> LanguageDetected -> EntitiesDetected -> EntitiesResolved
//!          -> [ExternallyValidated] -> Anonymized -> Responded
//! ```
//!
//! A request without text moves straight to `Failed`. The validation stage
//! only exists for [`DeidEngine::process_with_validation`] with an enabled,
//! configured validator; any validator failure falls back to the resolved
//! candidates.
//!
//! # Examples
//!
//! ```no_run
//! use thaideid::deid::engine::DeidEngine;
//! use thaideid::deid::models::{AnonymizationMethod, ProcessRequest};
//!
//! # fn example() -> thaideid::domain::Result<()> {
//! let engine = DeidEngine::with_defaults()?;
//! let request = ProcessRequest::new("Patient John Smith, HN: 12345", AnonymizationMethod::Mask);
//! let response = engine.process(&request)?;
//! println!("{}", response.deidentified_text);
//! # Ok(())
//! # }
//! ```

use crate::config::DeidConfig;
use crate::deid::anonymizer::anonymize;
use crate::deid::audit::{AuditLogger, AuditRecord};
use crate::deid::detector::{EntityDetector, Lexicon, PatternRegistry};
use crate::deid::language::detect_language;
use crate::deid::models::{Entity, Language, ProcessRequest, ProcessResponse, Statistics};
use crate::deid::resolver::{merge_overlapping, EntityResolver};
use crate::deid::validator::{self, EntityValidator};
use crate::domain::{DeidError, Result, ValidatorError};
use crate::{log_error_with_context, log_stage_transition, log_validator_fallback};
use chrono::Utc;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    LanguageDetected,
    EntitiesDetected,
    EntitiesResolved,
    ExternallyValidated,
    Anonymized,
    Responded,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "Received",
            PipelineStage::LanguageDetected => "LanguageDetected",
            PipelineStage::EntitiesDetected => "EntitiesDetected",
            PipelineStage::EntitiesResolved => "EntitiesResolved",
            PipelineStage::ExternallyValidated => "ExternallyValidated",
            PipelineStage::Anonymized => "Anonymized",
            PipelineStage::Responded => "Responded",
            PipelineStage::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Responded | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one request moving through the pipeline
#[derive(Debug)]
pub struct PipelineRun {
    request_id: Uuid,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
    started: Instant,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            stage: PipelineStage::Received,
            history: vec![PipelineStage::Received],
            started: Instant::now(),
        }
    }

    fn advance(&mut self, to: PipelineStage) {
        log_stage_transition!(self.request_id, self.stage, to);
        self.stage = to;
        self.history.push(to);
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Every stage entered so far, in order
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Main de-identification engine
///
/// Holds only read-only tables and stateless collaborators, so one engine
/// can serve concurrent requests behind an `Arc`.
pub struct DeidEngine {
    detector: EntityDetector,
    resolver: EntityResolver,
    validator: Option<Arc<dyn EntityValidator>>,
    validator_timeout: Duration,
    audit: AuditLogger,
}

impl DeidEngine {
    /// Engine over an explicit pattern library and lexicon, without
    /// validator or audit trail
    pub fn new(registry: Arc<PatternRegistry>, lexicon: Arc<Lexicon>) -> Self {
        Self::from_parts(
            EntityDetector::new(registry, lexicon.clone()),
            EntityResolver::new(lexicon),
        )
    }

    /// Engine assembled from ready-made stages
    pub fn from_parts(detector: EntityDetector, resolver: EntityResolver) -> Self {
        Self {
            detector,
            resolver,
            validator: None,
            validator_timeout: Duration::from_secs(30),
            audit: AuditLogger::disabled(),
        }
    }

    /// Engine over the embedded pattern library and lexicon
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Pattern`] if the embedded tables fail to compile.
    pub fn with_defaults() -> Result<Self> {
        let registry = PatternRegistry::default_patterns().map_err(pattern_error)?;
        let lexicon = Lexicon::default_lexicon().map_err(pattern_error)?;
        Ok(Self::new(Arc::new(registry), Arc::new(lexicon)))
    }

    /// Engine described by a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern or lexicon file cannot be loaded, the
    /// validator client cannot be built or the audit directory cannot be
    /// created.
    pub fn from_config(config: &DeidConfig) -> Result<Self> {
        let registry = match config.pipeline.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        }
        .map_err(pattern_error)?;

        let lexicon = match config.pipeline.lexicon {
            Some(ref path) => Lexicon::from_file(path),
            None => Lexicon::default_lexicon(),
        }
        .map_err(pattern_error)?;

        let mut engine = Self::new(Arc::new(registry), Arc::new(lexicon));

        if config.validator.enabled {
            let validator = validator::from_config(&config.validator)?;
            engine = engine.with_validator(
                validator,
                Duration::from_secs(config.validator.timeout_seconds),
            );
        }

        if config.audit.enabled {
            let logger = AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                true,
            )
            .map_err(|e| DeidError::Audit(format!("{e:#}")))?;
            engine = engine.with_audit_logger(logger);
        }

        Ok(engine)
    }

    /// Attach an external validator, bounded by `timeout` per call
    pub fn with_validator(mut self, validator: Arc<dyn EntityValidator>, timeout: Duration) -> Self {
        self.validator = Some(validator);
        self.validator_timeout = timeout;
        self
    }

    pub fn with_audit_logger(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    /// Validator that the validation stage would call, if any
    pub fn active_validator(&self) -> Option<&Arc<dyn EntityValidator>> {
        self.validator.as_ref().filter(|v| v.is_configured())
    }

    /// Regex-only de-identification
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::InvalidInput`] for empty text and
    /// [`DeidError::Internal`] if a pipeline stage crashes. Every other
    /// condition yields a response.
    pub fn process(&self, request: &ProcessRequest) -> Result<ProcessResponse> {
        let mut run = self.receive(request)?;
        let (language, entities) = self.analyze(&mut run, request)?;
        self.respond(run, request, language, entities, false)
    }

    /// De-identification with an external validation pass
    ///
    /// Identical to [`process`](Self::process) when the validator is absent,
    /// unconfigured, fails or times out.
    ///
    /// # Errors
    ///
    /// Same as [`process`](Self::process); validator errors never surface.
    pub async fn process_with_validation(&self, request: &ProcessRequest) -> Result<ProcessResponse> {
        let mut run = self.receive(request)?;
        let (language, candidates) = self.analyze(&mut run, request)?;

        let (entities, validated) = match self.active_validator() {
            Some(validator) => {
                let outcome = self.validate(validator.as_ref(), request, candidates).await;
                run.advance(PipelineStage::ExternallyValidated);
                outcome
            }
            None => (candidates, false),
        };

        self.respond(run, request, language, entities, validated)
    }

    /// Run the resolver alone over caller-supplied candidates
    pub fn resolve_candidates(&self, text: &str, candidates: Vec<Entity>) -> Vec<Entity> {
        self.resolver.resolve(candidates, text)
    }

    fn receive(&self, request: &ProcessRequest) -> Result<PipelineRun> {
        let mut run = PipelineRun::new();
        if request.text.trim().is_empty() {
            run.advance(PipelineStage::Failed);
            return Err(DeidError::InvalidInput("Text is required".to_string()));
        }
        Ok(run)
    }

    /// Language detection, detection and resolution
    fn analyze(
        &self,
        run: &mut PipelineRun,
        request: &ProcessRequest,
    ) -> Result<(Language, Vec<Entity>)> {
        guarded(run, |run| {
            let language = detect_language(&request.text);
            run.advance(PipelineStage::LanguageDetected);

            let candidates = self.detector.detect(
                &request.text,
                &request.enabled_entity_types,
                &request.custom_mask_list,
            );
            run.advance(PipelineStage::EntitiesDetected);

            let resolved = self.resolver.resolve(candidates, &request.text);
            run.advance(PipelineStage::EntitiesResolved);

            (language, resolved)
        })
    }

    async fn validate(
        &self,
        validator: &dyn EntityValidator,
        request: &ProcessRequest,
        candidates: Vec<Entity>,
    ) -> (Vec<Entity>, bool) {
        let call = validator.validate(&request.text, &candidates, &request.custom_mask_list);

        let error = match tokio::time::timeout(self.validator_timeout, call).await {
            Ok(Ok(entities)) => {
                tracing::debug!(
                    validator = validator.name(),
                    candidates = candidates.len(),
                    validated = entities.len(),
                    "Validator accepted"
                );
                return (merge_overlapping(entities), true);
            }
            Ok(Err(e)) => e,
            Err(_) => ValidatorError::Timeout(self.validator_timeout.as_secs()),
        };

        log_validator_fallback!(validator.name(), error, candidates.len());
        (candidates, false)
    }

    fn respond(
        &self,
        mut run: PipelineRun,
        request: &ProcessRequest,
        language: Language,
        entities: Vec<Entity>,
        validated: bool,
    ) -> Result<ProcessResponse> {
        let outcome = guarded(&mut run, |run| {
            let outcome = anonymize(&request.text, &entities, request.method);
            run.advance(PipelineStage::Anonymized);
            outcome
        })?;

        let record = AuditRecord {
            request_id: run.request_id(),
            timestamp: Utc::now(),
            method: request.method,
            language,
            validated,
            processing_time_ms: run.elapsed_ms(),
            entities: &entities,
        };
        if let Err(e) = self.audit.log_run(&record) {
            log_error_with_context!(format!("{e:#}"), "Failed to write audit entry");
        }

        run.advance(PipelineStage::Responded);
        tracing::info!(
            request_id = %run.request_id(),
            language = %language,
            method = %request.method,
            entities = entities.len(),
            skipped = outcome.skipped,
            validated = validated,
            elapsed_ms = run.elapsed_ms(),
            "Request processed"
        );

        Ok(ProcessResponse {
            deidentified_text: outcome.text,
            statistics: Statistics::from_entities(&entities),
            entities,
            language,
            warnings: outcome.warnings,
        })
    }
}

/// Run a synchronous stage, turning a panic into [`DeidError::Internal`]
fn guarded<T>(run: &mut PipelineRun, stage: impl FnOnce(&mut PipelineRun) -> T) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(|| stage(&mut *run))) {
        Ok(value) => Ok(value),
        Err(_) => {
            tracing::error!(
                request_id = %run.request_id(),
                stage = %run.stage(),
                "Pipeline stage panicked"
            );
            run.advance(PipelineStage::Failed);
            Err(DeidError::Internal("internal pipeline error".to_string()))
        }
    }
}

fn pattern_error(e: anyhow::Error) -> DeidError {
    DeidError::Pattern(format!("{e:#}"))
}
