//! Verifier / corrector
//!
//! A draft moves through a small state machine:
//!
//! ```text
//! Drafted ──valid──────────────▶ Verified   (draft is final)
//!    └────needs_correction──▶ Correcting ──▶ Corrected (rewrite is final)
//! ```
//!
//! There is exactly one correction attempt and the rewrite is never
//! re-verified.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::prompts::{self, PlanFacts};
use crate::error::{Error, Result};
use crate::llm::TextGenerator;

pub const AUTO_CORRECTED_MARKER: &str = "[Auto-corrected]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    NeedsCorrection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub verdict: Verdict,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl VerificationVerdict {
    /// Reads the verifier's reply. Anything that is not a well-formed verdict
    /// becomes `needs_correction` with an issue describing why.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<VerificationVerdict>(strip_code_fence(raw)) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "verifier returned a malformed verdict");
                VerificationVerdict {
                    verdict: Verdict::NeedsCorrection,
                    issues: vec![format!("Invalid JSON from verifier: {}", e)],
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        Some((tag, body)) if !tag.contains('{') => body.trim(),
        _ => rest.trim(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Drafted {
        draft: String,
    },
    Correcting {
        draft: String,
        verdict: VerificationVerdict,
        raw: String,
    },
    Verified {
        draft: String,
        verdict: VerificationVerdict,
        raw: String,
    },
    Corrected {
        draft: String,
        corrected: String,
        verdict: VerificationVerdict,
        raw: String,
    },
}

impl ReviewState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewState::Verified { .. } | ReviewState::Corrected { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReviewState::Drafted { .. } => "drafted",
            ReviewState::Correcting { .. } => "correcting",
            ReviewState::Verified { .. } => "verified",
            ReviewState::Corrected { .. } => "corrected",
        }
    }
}

/// Outcome of reviewing one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub verdict: VerificationVerdict,
    pub corrected: Option<String>,
    pub final_narrative: String,
    /// Raw verifier reply, plus a marker when a rewrite replaced the draft.
    pub audit_trail: String,
}

impl Review {
    fn from_terminal(state: ReviewState) -> Result<Self> {
        match state {
            ReviewState::Verified {
                draft,
                verdict,
                raw,
            } => Ok(Review {
                verdict,
                corrected: None,
                final_narrative: draft,
                audit_trail: raw,
            }),
            ReviewState::Corrected {
                corrected,
                verdict,
                raw,
                ..
            } => Ok(Review {
                verdict,
                corrected: Some(corrected.clone()),
                final_narrative: corrected,
                audit_trail: format!("{}\n\n{}", raw, AUTO_CORRECTED_MARKER),
            }),
            other => Err(Error::Pipeline(format!(
                "review stopped in non-terminal state '{}'",
                other.name()
            ))),
        }
    }
}

pub struct Verifier<'a> {
    narrator: &'a dyn TextGenerator,
    verifier: &'a dyn TextGenerator,
}

impl<'a> Verifier<'a> {
    pub fn new(narrator: &'a dyn TextGenerator, verifier: &'a dyn TextGenerator) -> Self {
        Self { narrator, verifier }
    }

    /// Runs the machine from `Drafted` to a terminal state.
    pub async fn review(&self, draft: &str, facts: &PlanFacts<'_>) -> Result<Review> {
        if draft.trim().is_empty() {
            return Err(Error::validation("Missing synthesized strategy"));
        }

        let mut state = ReviewState::Drafted {
            draft: draft.to_string(),
        };
        while !state.is_terminal() {
            state = self.step(state, facts).await?;
        }
        Review::from_terminal(state)
    }

    /// Performs one transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: ReviewState, facts: &PlanFacts<'_>) -> Result<ReviewState> {
        match state {
            ReviewState::Drafted { draft } => {
                let (system, user) = prompts::verification(facts, &draft);
                let raw = self.verifier.complete(&system, &user).await?;
                let verdict = VerificationVerdict::parse(&raw);

                if verdict.is_valid() {
                    info!(model = self.verifier.model(), "draft verified");
                    Ok(ReviewState::Verified {
                        draft,
                        verdict,
                        raw,
                    })
                } else {
                    warn!(issues = verdict.issues.len(), "draft needs correction");
                    Ok(ReviewState::Correcting {
                        draft,
                        verdict,
                        raw,
                    })
                }
            }
            ReviewState::Correcting {
                draft,
                verdict,
                raw,
            } => {
                let (system, user) = prompts::correction(&draft, &verdict.issues);
                let corrected = self.narrator.complete(&system, &user).await?;
                info!(model = self.narrator.model(), "draft auto-corrected");
                Ok(ReviewState::Corrected {
                    draft,
                    corrected,
                    verdict,
                    raw,
                })
            }
            terminal => Ok(terminal),
        }
    }
}
