//! # Prompt Template Modules
//!
//! This module organizes the prompt templates sent to the text-generation service.

pub mod core;
