//! Narrative synthesizer: drafts the strategic plan

use tracing::info;

use super::prompts::{self, PlanFacts};
use crate::error::{Error, Result};
use crate::llm::TextGenerator;

/// Sends the facts to the narrator and returns its draft.
pub async fn synthesize(narrator: &dyn TextGenerator, facts: &PlanFacts<'_>) -> Result<String> {
    if facts.insights.is_empty() {
        return Err(Error::validation(
            "Missing one or more of: structure insights, side",
        ));
    }

    let (system, user) = prompts::synthesis(facts);
    let draft = narrator.complete(&system, &user).await?;
    info!(model = narrator.model(), chars = draft.len(), "draft narrative synthesized");
    Ok(draft)
}
