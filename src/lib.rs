//! Trigger Guard - buying-trigger guardrail pipeline
//!
//! Routes and scores third-party buyer signals per business profile, hands
//! a bounded content-only batch to an external synthesizer, and accepts
//! only triggers that pass anti-hallucination and buyer/product-fit
//! validation. Accepted results sit behind a stale-while-revalidate cache.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
