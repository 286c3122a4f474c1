//! Narrative stages: drafting, verification, formatting and aggregation

pub mod aggregator;
pub mod formatter;
pub mod prompts;
pub mod synthesizer;
pub mod verifier;

pub use aggregator::aggregate;
pub use formatter::{format, FormattedStrategy};
pub use prompts::PlanFacts;
pub use synthesizer::synthesize;
pub use verifier::{Review, ReviewState, Verdict, VerificationVerdict, Verifier};
