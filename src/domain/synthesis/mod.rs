//! Synthesis module - the bounded, content-only view of signals sent to the synthesizer.

mod batch;

pub use batch::{BatchSample, PromptSample, SynthesisBatch, SynthesisRequest};
