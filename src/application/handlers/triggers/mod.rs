//! Trigger handlers - signal routing and cached trigger generation.

mod generate_triggers;
mod pipeline;
mod route_signals;

pub use generate_triggers::{
    GenerateTriggersCommand, GenerateTriggersError, GenerateTriggersHandler, PipelineOutcome,
};
pub use pipeline::{
    PipelineError, PipelineInput, PipelineResult, TriggerPipeline, DEFAULT_MAX_BATCH_SIZE, TIME_SENSITIVE_DAYS,
};
pub use route_signals::{RouteSignalsCommand, RouteSignalsHandler, RouteSignalsResult, DEFAULT_TOP_N};
