//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates the pure domain (routing, scoring, validation) with the
//! ports it needs: the synthesizer, the verified source registry and the
//! trigger cache.

pub mod handlers;

pub use handlers::{
    GenerateTriggersCommand, GenerateTriggersError, GenerateTriggersHandler, PipelineError, PipelineInput,
    PipelineOutcome, PipelineResult, RouteSignalsCommand, RouteSignalsHandler, RouteSignalsResult, TriggerPipeline,
};
