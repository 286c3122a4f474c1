//! Stage implementations, one per graph node

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::analysis::{
    features, simulate, structure, MoveRecord, PositionFeatures, Side, StructureInsight,
};
use crate::error::{Error, Result};
use crate::llm::TextGenerator;
use crate::narrative::{self, FormattedStrategy, PlanFacts, Review, Verifier};
use crate::rules::{self, BoardSummary};

/// A unit of pipeline work: takes exactly the fields it needs, returns
/// exactly the fields it produces.
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn run(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Owned copy of the facts the narrative stages need, so they can move
/// onto a task.
#[derive(Debug, Clone)]
pub struct FactSheet {
    pub fen: String,
    pub moves: String,
    pub side: Side,
    pub features: Option<PositionFeatures>,
    pub insights: Vec<StructureInsight>,
}

impl FactSheet {
    pub fn as_facts(&self) -> PlanFacts<'_> {
        PlanFacts {
            fen: &self.fen,
            moves: &self.moves,
            side: self.side,
            features: self.features.as_ref(),
            insights: &self.insights,
        }
    }
}

pub struct FenValidator;

#[async_trait]
impl Stage for FenValidator {
    type Input = Option<String>;
    type Output = Option<BoardSummary>;

    async fn run(&self, fen: Option<String>) -> Result<Option<BoardSummary>> {
        let Some(fen) = fen else {
            debug!("no FEN supplied; starting from the initial position");
            return Ok(None);
        };
        let position = rules::parse_fen(&fen)?;
        Ok(Some(rules::board_summary(&position)))
    }
}

pub struct MoveSimulator;

#[async_trait]
impl Stage for MoveSimulator {
    type Input = (Option<String>, String);
    type Output = Vec<MoveRecord>;

    async fn run(&self, (fen, moves): (Option<String>, String)) -> Result<Vec<MoveRecord>> {
        simulate(fen.as_deref(), &moves)
    }
}

pub struct StructureExtractor;

#[async_trait]
impl Stage for StructureExtractor {
    type Input = Vec<MoveRecord>;
    type Output = Vec<StructureInsight>;

    async fn run(&self, records: Vec<MoveRecord>) -> Result<Vec<StructureInsight>> {
        structure::extract(&records)
    }
}

pub struct PositionFeatureExtractor;

#[async_trait]
impl Stage for PositionFeatureExtractor {
    type Input = Option<String>;
    type Output = Option<PositionFeatures>;

    async fn run(&self, fen: Option<String>) -> Result<Option<PositionFeatures>> {
        features::extract(fen.as_deref())
    }
}

pub struct IdeaSynthesizer {
    narrator: Arc<dyn TextGenerator>,
}

impl IdeaSynthesizer {
    pub fn new(narrator: Arc<dyn TextGenerator>) -> Self {
        Self { narrator }
    }
}

#[async_trait]
impl Stage for IdeaSynthesizer {
    type Input = FactSheet;
    type Output = String;

    async fn run(&self, facts: FactSheet) -> Result<String> {
        narrative::synthesize(self.narrator.as_ref(), &facts.as_facts()).await
    }
}

pub struct ReviewStage {
    narrator: Arc<dyn TextGenerator>,
    verifier: Arc<dyn TextGenerator>,
}

impl ReviewStage {
    pub fn new(narrator: Arc<dyn TextGenerator>, verifier: Arc<dyn TextGenerator>) -> Self {
        Self { narrator, verifier }
    }
}

#[async_trait]
impl Stage for ReviewStage {
    type Input = (FactSheet, String);
    type Output = Review;

    async fn run(&self, (facts, draft): (FactSheet, String)) -> Result<Review> {
        Verifier::new(self.narrator.as_ref(), self.verifier.as_ref())
            .review(&draft, &facts.as_facts())
            .await
    }
}

pub struct StrategyFormatter;

#[async_trait]
impl Stage for StrategyFormatter {
    type Input = String;
    type Output = FormattedStrategy;

    async fn run(&self, narrative: String) -> Result<FormattedStrategy> {
        narrative::format(&narrative)
    }
}

/// Fails unless a required field has been written.
pub(crate) fn require<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| Error::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;

    const MIDDLEGAME: &str = "2kr3r/pp5p/2Pb2pQ/3p4/4pPq1/2N5/P1P3PP/R3R1K1 b - - 0 21";

    #[tokio::test]
    async fn test_fen_validator_summarizes_board() {
        let summary = FenValidator
            .run(Some(MIDDLEGAME.to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.side_to_move, Side::Black);
        assert_eq!(summary.piece_map.get("h6"), Some(&'Q'));
        assert!(!summary.is_check);
    }

    #[tokio::test]
    async fn test_fen_validator_without_fen_is_noop() {
        assert!(FenValidator.run(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fen_validator_rejects_garbage() {
        let err = FenValidator.run(Some("not a fen".to_string())).await.unwrap_err();
        assert!(matches!(err, Error::InvalidFen { .. }));
    }

    #[tokio::test]
    async fn test_synthesizer_stage_uses_narrator() {
        let narrator = Arc::new(ScriptedGenerator::new("narrator", ["Strategic Goal\nPush d4"]));
        let records = MoveSimulator
            .run((None, "1. e4 e5".to_string()))
            .await
            .unwrap();
        let insights = StructureExtractor.run(records).await.unwrap();
        let facts = FactSheet {
            fen: String::new(),
            moves: "1. e4 e5".to_string(),
            side: Side::White,
            features: None,
            insights,
        };

        let stage = IdeaSynthesizer::new(narrator.clone());
        let draft = stage.run(facts).await.unwrap();
        assert_eq!(draft, "Strategic Goal\nPush d4");
        assert_eq!(narrator.call_count(), 1);
    }

    #[test]
    fn test_require_reports_missing_field() {
        let err = require::<u8>(None, "Missing structure insights").unwrap_err();
        assert_eq!(err.to_string(), "Missing structure insights");
    }
}
