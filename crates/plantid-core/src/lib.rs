#![deny(missing_docs)]
//! PlantID core library.
//!
//! Prompt building, model access, response parsing and reply formatting
//! for the plant identification bot. Nothing in here talks to Telegram.

/// Plant analysis: prompts, model request and response parsing.
pub mod analysis;
/// Configuration management.
pub mod config;
/// Reply rendering for analysis results.
pub mod formatting;
/// Vision model providers.
pub mod llm;
