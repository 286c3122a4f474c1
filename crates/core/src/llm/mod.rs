//! Text-generation collaborators
//!
//! Drafting, verifying and aggregating all go through [`TextGenerator`], so
//! the pipeline never depends on a concrete provider.

mod client;
#[cfg(test)]
pub(crate) mod testing;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::OpenAiClient;
pub use types::*;

/// A chat model answering one system + user prompt pair.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the trimmed text of the model's reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
