//! Trigger synthesizer adapters.

mod mock;

pub use mock::{MockResponse, MockSynthesizer, EMPTY_RESPONSE};
