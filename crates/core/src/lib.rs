//! Chess Strategist Core Library
//!
//! Deterministic move and position analysis feeding a drafted, verified and
//! formatted strategic plan.

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod narrative;
pub mod parser;
pub mod pipeline;
pub mod rules;
pub mod service;

pub use analysis::{MoveRecord, PositionFeatures, Side, StructureInsight};
pub use config::LlmConfig;
pub use error::{Error, Result};
pub use llm::{OpenAiClient, TextGenerator};
pub use pipeline::{PipelineInput, PipelineOutput, Services, StrategyPipeline};
pub use service::{BatchSummary, GamePosition, GameSummary, SingleSummary, StrategyService};
