//! Strategy pipeline: a fixed DAG of stages over one typed state
//!
//! ```text
//! fen_validator ─▶ move_simulator ─┬─▶ structure_extractor ─────────┬─▶ join ─▶ idea_synthesizer ─▶ verifier ─▶ strategy_formatter
//!                                  └─▶ position_feature_extractor ──┘
//! ```

mod executor;
pub mod graph;
pub mod stage;
mod state;

pub use executor::{Services, StrategyPipeline};
pub use graph::Node;
pub use stage::{FactSheet, Stage};
pub use state::{
    Field, NodeOutput, PipelineInput, PipelineOutput, PipelineState, VerificationReport,
};
