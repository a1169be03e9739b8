//! FlowStack proposal backend
//!
//! Turns a captured lead (prospect context + precomputed leakage figures)
//! into a narrative sales proposal via a two-pass, multi-model LLM pipeline,
//! and forwards leads to the automation webhook.

pub mod config;
pub mod proposal;
pub mod server;
