//! Update pipeline assembly and dispatch.
//!
//! Wires the other crates into one per-bot [`Pipeline`]: roster merge,
//! command tree, middleware plan, dictionary, pending-reply store and
//! the outbound sink.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineBuilder};
