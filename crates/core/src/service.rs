//! Request-level entry points over the pipeline

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::Side;
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::narrative;
use crate::parser::extract_moves;
use crate::pipeline::{PipelineInput, PipelineOutput, Services, StrategyPipeline};

/// One game position submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePosition {
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub fen: String,
    pub moves: String,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchRequest {
    pub positions: Vec<GamePosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub aggregated_summary: String,
    pub per_game_summaries: Vec<GameSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleSummary {
    pub summary: String,
}

pub struct StrategyService {
    pipeline: StrategyPipeline,
}

impl StrategyService {
    pub fn new(services: Services) -> Result<Self> {
        Ok(Self {
            pipeline: StrategyPipeline::new(services)?,
        })
    }

    pub fn from_config(config: LlmConfig) -> Result<Self> {
        Self::new(Services::from_config(config)?)
    }

    pub fn pipeline(&self) -> &StrategyPipeline {
        &self.pipeline
    }

    /// Full pipeline output for one position.
    pub async fn analyze(&self, position: GamePosition) -> Result<PipelineOutput> {
        self.pipeline.run(pipeline_input(position)?).await
    }

    /// Formatted strategy for one position.
    pub async fn analyze_single(&self, position: GamePosition) -> Result<SingleSummary> {
        let output = self.analyze(position).await?;
        Ok(SingleSummary {
            summary: output.formatted_strategy,
        })
    }

    /// Runs every position on its own pipeline, then condenses the results.
    pub async fn analyze_batch(&self, positions: Vec<GamePosition>) -> Result<BatchSummary> {
        if positions.is_empty() {
            return Err(Error::validation("No positions provided"));
        }

        info!(games = positions.len(), "batch strategy analysis started");
        let runs = positions.into_iter().map(|position| async move {
            let game_id = position.game_id.clone();
            let output = self.analyze(position).await?;
            Ok::<_, Error>(GameSummary {
                game_id,
                summary: output.formatted_strategy,
            })
        });
        let per_game_summaries = try_join_all(runs).await?;

        let summaries: Vec<String> = per_game_summaries
            .iter()
            .map(|g| g.summary.clone())
            .collect();
        let aggregated_summary =
            narrative::aggregate(self.pipeline.services().narrator.as_ref(), &summaries).await?;

        Ok(BatchSummary {
            aggregated_summary,
            per_game_summaries,
        })
    }
}

/// Accepts bare movetext or a PGN; a request FEN wins over a `[FEN]` tag.
fn pipeline_input(position: GamePosition) -> Result<PipelineInput> {
    let extracted = extract_moves(&position.moves)?;
    let fen = if position.fen.trim().is_empty() {
        extracted.fen.unwrap_or_default()
    } else {
        position.fen
    };
    Ok(PipelineInput::new(fen, extracted.movetext, position.side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;
    use std::sync::Arc;

    const VALID: &str = r#"{"verdict": "valid"}"#;

    fn position(game_id: &str, moves: &str) -> GamePosition {
        GamePosition {
            game_id: game_id.to_string(),
            fen: String::new(),
            moves: moves.to_string(),
            side: Side::White,
        }
    }

    #[test]
    fn test_request_uses_camel_case_game_id() {
        let request: BatchRequest = serde_json::from_str(
            r#"{"positions": [{"gameId": "abc", "fen": "", "moves": "1. e4", "side": "white"}]}"#,
        )
        .unwrap();
        assert_eq!(request.positions[0].game_id, "abc");
    }

    #[test]
    fn test_pgn_fen_tag_fills_missing_fen() {
        let pgn = "[Event \"Study\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n\n1. e4 *";
        let input = pipeline_input(position("g", pgn)).unwrap();
        assert_eq!(input.fen, "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(input.moves, "e4");

        let mut explicit = position("g", pgn);
        explicit.fen = "4k3/8/8/8/8/8/3P4/4K3 w - - 0 1".to_string();
        let input = pipeline_input(explicit).unwrap();
        assert_eq!(input.fen, "4k3/8/8/8/8/8/3P4/4K3 w - - 0 1");
    }

    #[tokio::test]
    async fn test_single_returns_formatted_strategy() {
        let narrator = Arc::new(ScriptedGenerator::new(
            "narrator",
            ["Strategic Goal:\nGain space.\n- Play d4"],
        ));
        let verifier = Arc::new(ScriptedGenerator::new("verifier", [VALID]));
        let service = StrategyService::new(Services::new(narrator, verifier)).unwrap();

        let result = service
            .analyze_single(position("ui-analysis", "1. e4 e5"))
            .await
            .unwrap();
        assert_eq!(
            result.summary,
            "**Strategic Goal:**\nGain space.\n\n**Roadmap of Specific Ideas:**\n- Play d4"
        );
    }

    #[tokio::test]
    async fn test_batch_aggregates_every_game() {
        let narrator = Arc::new(ScriptedGenerator::new(
            "narrator",
            [
                "Strategic Goal\nOpen the f-file.\n- Play f4",
                "Strategic Goal\nOpen the f-file.\n- Play f4",
                "Overall plan: attack on the kingside.",
            ],
        ));
        let verifier = Arc::new(ScriptedGenerator::new("verifier", [VALID, VALID]));
        let service = StrategyService::new(Services::new(narrator.clone(), verifier)).unwrap();

        let result = service
            .analyze_batch(vec![position("g1", "1. e4"), position("g2", "1. d4")])
            .await
            .unwrap();

        assert_eq!(result.aggregated_summary, "Overall plan: attack on the kingside.");
        let ids: Vec<_> = result.per_game_summaries.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2"]);
        assert!(result.per_game_summaries[0].summary.contains("- Play f4"));
        assert_eq!(narrator.call_count(), 3);
        assert!(narrator.prompts()[2].user.contains("Open the f-file."));
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let narrator = Arc::new(ScriptedGenerator::new("narrator", Vec::<String>::new()));
        let verifier = Arc::new(ScriptedGenerator::new("verifier", Vec::<String>::new()));
        let service = StrategyService::new(Services::new(narrator, verifier)).unwrap();
        assert!(matches!(
            service.analyze_batch(Vec::new()).await,
            Err(Error::Validation(_))
        ));
    }
}
