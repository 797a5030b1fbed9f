//! Command and query handlers.

pub mod triggers;

pub use triggers::{
    GenerateTriggersCommand, GenerateTriggersError, GenerateTriggersHandler, PipelineError, PipelineInput,
    PipelineOutcome, PipelineResult, RouteSignalsCommand, RouteSignalsHandler, RouteSignalsResult, TriggerPipeline,
};
