//! LLM wrapper for document attribute extraction.
//!
//! This crate provides structured attribute extraction from veterinary
//! documents (vaccination certificates, lab reports, invoices) using
//! vision-capable Llama 3.2 models via llama.cpp bindings.

pub mod prompts;
pub mod extraction;

pub use extraction::*;
pub use prompts::*;
