//! Prompt variants and A/B selection for the Aethon assistant.
//!
//! This crate owns the assistant's system prompt, the registry of labeled
//! prompt variants, and weighted A/B selection between them. Selection is
//! total: an unknown or disabled test always resolves to the `production`
//! label, so callers never need a fallback path of their own.

pub mod ab;
pub mod error;
pub mod store;

pub use ab::{AbTestConfig, AbTestManager, AbTestStatus, DEFAULT_TEST};
pub use error::{PromptError, Result};
pub use store::{
    AETHON_SYSTEM_PROMPT, GenerationParams, PRODUCTION_LABEL, PromptStore, PromptVariant,
};
