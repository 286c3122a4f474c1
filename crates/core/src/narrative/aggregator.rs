//! Cross-game aggregation of per-position narratives

use tracing::info;

use super::prompts;
use crate::error::{Error, Result};
use crate::llm::TextGenerator;

/// Condenses several per-game strategies into one recurring-pattern summary.
pub async fn aggregate(generator: &dyn TextGenerator, narratives: &[String]) -> Result<String> {
    if narratives.is_empty() {
        return Err(Error::validation("No narratives to aggregate"));
    }

    let (system, user) = prompts::aggregation(narratives);
    let summary = generator.complete(&system, &user).await?;
    info!(games = narratives.len(), "aggregated strategy summary");
    Ok(summary)
}
