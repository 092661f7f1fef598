//! # Prompt Templates
//!
//! This module organizes all prompt templates used by the `PromptClient`.
//!
//! - [`core`]: SQL generation (schema, rules, chart instructions, few-shot examples).
//! - [`narration`]: turning a result set back into a human-readable answer.

pub mod core;
pub mod narration;
