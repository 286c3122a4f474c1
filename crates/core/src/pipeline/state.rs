//! Typed pipeline state

use serde::{Deserialize, Serialize};

use super::graph::Node;
use crate::analysis::{MoveRecord, PositionFeatures, Side, StructureInsight};
use crate::error::{Error, Result};
use crate::narrative::{FormattedStrategy, Review, Verdict};
use crate::rules::BoardSummary;

/// What a caller hands to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInput {
    #[serde(default)]
    pub fen: String,
    pub moves: String,
    pub side: Side,
}

impl PipelineInput {
    pub fn new(fen: impl Into<String>, moves: impl Into<String>, side: Side) -> Self {
        Self {
            fen: fen.into(),
            moves: moves.into(),
            side,
        }
    }
}

/// A state field a node may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BoardSummary,
    MoveRecords,
    StructureInsights,
    PositionFeatures,
    DraftNarrative,
    Verification,
    CorrectedNarrative,
    FinalNarrative,
    FormattedStrategy,
}

/// Partial update returned by one node.
#[derive(Debug, Clone)]
pub enum NodeOutput {
    BoardSummary(Option<BoardSummary>),
    MoveRecords(Vec<MoveRecord>),
    StructureInsights(Vec<StructureInsight>),
    PositionFeatures(Option<PositionFeatures>),
    Joined,
    Draft(String),
    Review(Review),
    Formatted(FormattedStrategy),
}

impl NodeOutput {
    pub fn writes(&self) -> &'static [Field] {
        match self {
            NodeOutput::BoardSummary(_) => &[Field::BoardSummary],
            NodeOutput::MoveRecords(_) => &[Field::MoveRecords],
            NodeOutput::StructureInsights(_) => &[Field::StructureInsights],
            NodeOutput::PositionFeatures(_) => &[Field::PositionFeatures],
            NodeOutput::Joined => &[],
            NodeOutput::Draft(_) => &[Field::DraftNarrative],
            NodeOutput::Review(_) => &[
                Field::Verification,
                Field::CorrectedNarrative,
                Field::FinalNarrative,
            ],
            NodeOutput::Formatted(_) => &[Field::FormattedStrategy],
        }
    }
}

/// Everything one run has learned so far. Fields only ever go from `None`
/// to `Some`.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub fen: String,
    pub moves: String,
    pub side: Side,
    pub board_summary: Option<BoardSummary>,
    pub move_records: Option<Vec<MoveRecord>>,
    pub structure_insights: Option<Vec<StructureInsight>>,
    pub position_features: Option<PositionFeatures>,
    pub draft_narrative: Option<String>,
    pub review: Option<Review>,
    pub formatted: Option<FormattedStrategy>,
    completed: Vec<Node>,
}

impl PipelineState {
    pub fn new(input: PipelineInput) -> Self {
        Self {
            fen: input.fen.trim().to_string(),
            moves: input.moves,
            side: input.side,
            board_summary: None,
            move_records: None,
            structure_insights: None,
            position_features: None,
            draft_narrative: None,
            review: None,
            formatted: None,
            completed: Vec::new(),
        }
    }

    /// Starting FEN, when one was supplied.
    pub fn fen(&self) -> Option<&str> {
        Some(self.fen.as_str()).filter(|f| !f.is_empty())
    }

    pub fn has_completed(&self, node: Node) -> bool {
        self.completed.contains(&node)
    }

    pub fn completed(&self) -> &[Node] {
        &self.completed
    }

    pub fn final_narrative(&self) -> Option<&str> {
        self.review.as_ref().map(|r| r.final_narrative.as_str())
    }

    /// Folds one node's update into the state.
    pub fn merge(&mut self, node: Node, output: NodeOutput) {
        match output {
            NodeOutput::BoardSummary(summary) => self.board_summary = summary,
            NodeOutput::MoveRecords(records) => self.move_records = Some(records),
            NodeOutput::StructureInsights(insights) => self.structure_insights = Some(insights),
            NodeOutput::PositionFeatures(features) => self.position_features = features,
            NodeOutput::Joined => {}
            NodeOutput::Draft(draft) => self.draft_narrative = Some(draft),
            NodeOutput::Review(review) => self.review = Some(review),
            NodeOutput::Formatted(formatted) => self.formatted = Some(formatted),
        }
        self.completed.push(node);
    }

    pub fn into_output(self) -> Result<PipelineOutput> {
        let missing = |what: &str| Error::Pipeline(format!("pipeline finished without {}", what));

        let review = self.review.ok_or_else(|| missing("a verification"))?;
        let formatted = self.formatted.ok_or_else(|| missing("a formatted strategy"))?;

        Ok(PipelineOutput {
            fen: self.fen,
            moves: self.moves,
            side: self.side,
            board_summary: self.board_summary,
            move_records: self.move_records.ok_or_else(|| missing("move records"))?,
            structure_insights: self
                .structure_insights
                .ok_or_else(|| missing("structure insights"))?,
            position_features: self.position_features,
            draft_narrative: self
                .draft_narrative
                .ok_or_else(|| missing("a draft narrative"))?,
            verification: VerificationReport {
                verdict: review.verdict.verdict,
                issues: review.verdict.issues,
                audit_trail: review.audit_trail,
            },
            corrected_narrative: review.corrected,
            final_narrative: review.final_narrative,
            formatted_strategy: formatted.to_string(),
            strategy: formatted,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub verdict: Verdict,
    pub issues: Vec<String>,
    pub audit_trail: String,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub fen: String,
    pub moves: String,
    pub side: Side,
    pub board_summary: Option<BoardSummary>,
    pub move_records: Vec<MoveRecord>,
    pub structure_insights: Vec<StructureInsight>,
    pub position_features: Option<PositionFeatures>,
    pub draft_narrative: String,
    pub verification: VerificationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_narrative: Option<String>,
    pub final_narrative: String,
    pub formatted_strategy: String,
    pub strategy: FormattedStrategy,
}
