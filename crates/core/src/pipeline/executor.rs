//! Runs the strategy graph layer by layer

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, info};

use super::graph::{strategy_layers, Node};
use super::stage::{
    require, FactSheet, FenValidator, IdeaSynthesizer, MoveSimulator, PositionFeatureExtractor,
    ReviewStage, Stage, StrategyFormatter, StructureExtractor,
};
use super::state::{NodeOutput, PipelineInput, PipelineOutput, PipelineState};
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::llm::{OpenAiClient, TextGenerator};

/// Remote collaborators shared by every run.
#[derive(Clone)]
pub struct Services {
    pub narrator: Arc<dyn TextGenerator>,
    pub verifier: Arc<dyn TextGenerator>,
}

impl Services {
    pub fn new(narrator: Arc<dyn TextGenerator>, verifier: Arc<dyn TextGenerator>) -> Self {
        Self { narrator, verifier }
    }

    pub fn from_config(config: LlmConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(OpenAiClient::new(config.narrator)?),
            Arc::new(OpenAiClient::new(config.verifier)?),
        ))
    }
}

/// One node with its inputs already read out of the state, so it can run
/// on its own task.
enum NodeTask {
    ValidateFen(Option<String>),
    Simulate(Option<String>, String),
    ExtractStructure(Vec<crate::analysis::MoveRecord>),
    ExtractFeatures(Option<String>),
    Join,
    Synthesize(IdeaSynthesizer, FactSheet),
    Review(ReviewStage, FactSheet, String),
    Format(String),
}

impl NodeTask {
    async fn execute(self) -> Result<NodeOutput> {
        match self {
            NodeTask::ValidateFen(fen) => FenValidator.run(fen).await.map(NodeOutput::BoardSummary),
            NodeTask::Simulate(fen, moves) => MoveSimulator
                .run((fen, moves))
                .await
                .map(NodeOutput::MoveRecords),
            NodeTask::ExtractStructure(records) => StructureExtractor
                .run(records)
                .await
                .map(NodeOutput::StructureInsights),
            NodeTask::ExtractFeatures(fen) => PositionFeatureExtractor
                .run(fen)
                .await
                .map(NodeOutput::PositionFeatures),
            NodeTask::Join => Ok(NodeOutput::Joined),
            NodeTask::Synthesize(stage, facts) => stage.run(facts).await.map(NodeOutput::Draft),
            NodeTask::Review(stage, facts, draft) => {
                stage.run((facts, draft)).await.map(NodeOutput::Review)
            }
            NodeTask::Format(narrative) => StrategyFormatter
                .run(narrative)
                .await
                .map(NodeOutput::Formatted),
        }
    }
}

pub struct StrategyPipeline {
    services: Services,
    layers: Vec<Vec<Node>>,
}

impl StrategyPipeline {
    pub fn new(services: Services) -> Result<Self> {
        Ok(Self {
            services,
            layers: strategy_layers()?,
        })
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn run(&self, input: PipelineInput) -> Result<PipelineOutput> {
        self.run_state(input).await?.into_output()
    }

    /// Runs every node and returns the merged state.
    pub async fn run_state(&self, input: PipelineInput) -> Result<PipelineState> {
        let mut state = PipelineState::new(input);
        info!(side = %state.side, has_fen = state.fen().is_some(), "strategy pipeline started");

        for layer in &self.layers {
            match layer.as_slice() {
                [node] => {
                    let output = self.run_node(*node, &state).await?;
                    state.merge(*node, output);
                }
                nodes => {
                    for (node, output) in self.run_branches(nodes, &state).await? {
                        state.merge(node, output);
                    }
                }
            }
        }

        info!(nodes = state.completed().len(), "strategy pipeline finished");
        Ok(state)
    }

    async fn run_node(&self, node: Node, state: &PipelineState) -> Result<NodeOutput> {
        info!(node = %node, "stage started");
        let result = match self.prepare(node, state) {
            Ok(task) => task.execute().await,
            Err(e) => Err(e),
        };
        log_outcome(node, &result);
        result
    }

    /// Fans a layer out onto separate tasks and waits for all of them.
    async fn run_branches(
        &self,
        nodes: &[Node],
        state: &PipelineState,
    ) -> Result<Vec<(Node, NodeOutput)>> {
        let mut handles = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let task = self.prepare(node, state).inspect_err(|e| {
                error!(node = %node, error = %e, "stage failed");
            })?;
            info!(node = %node, "stage started");
            handles.push(tokio::spawn(async move {
                let result = task.execute().await;
                log_outcome(node, &result);
                result
            }));
        }

        let results = try_join_all(handles).await?;
        let outputs = nodes
            .iter()
            .copied()
            .zip(results)
            .map(|(node, result)| result.map(|output| (node, output)))
            .collect::<Result<Vec<_>>>()?;

        check_disjoint_writes(&outputs)?;
        Ok(outputs)
    }

    fn prepare(&self, node: Node, state: &PipelineState) -> Result<NodeTask> {
        let fen = state.fen().map(str::to_string);

        let task = match node {
            Node::FenValidator => NodeTask::ValidateFen(fen),
            Node::MoveSimulator => NodeTask::Simulate(fen, state.moves.clone()),
            Node::StructureExtractor => NodeTask::ExtractStructure(require(
                state.move_records.clone(),
                "Missing move records for structure extraction",
            )?),
            Node::PositionFeatureExtractor => NodeTask::ExtractFeatures(fen),
            Node::Join => {
                for branch in node.dependencies() {
                    if !state.has_completed(*branch) {
                        return Err(Error::Pipeline(format!(
                            "join reached before '{}' completed",
                            branch
                        )));
                    }
                }
                NodeTask::Join
            }
            Node::IdeaSynthesizer => NodeTask::Synthesize(
                IdeaSynthesizer::new(self.services.narrator.clone()),
                fact_sheet(state)?,
            ),
            Node::Verifier => NodeTask::Review(
                ReviewStage::new(
                    self.services.narrator.clone(),
                    self.services.verifier.clone(),
                ),
                fact_sheet(state)?,
                require(state.draft_narrative.clone(), "Missing synthesized strategy")?,
            ),
            Node::StrategyFormatter => NodeTask::Format(
                require(state.final_narrative(), "Missing final narrative")?.to_string(),
            ),
        };
        Ok(task)
    }
}

fn fact_sheet(state: &PipelineState) -> Result<FactSheet> {
    Ok(FactSheet {
        fen: state.fen.clone(),
        moves: state.moves.clone(),
        side: state.side,
        features: state.position_features.clone(),
        insights: require(
            state.structure_insights.clone(),
            "Missing one or more of: structure insights, side",
        )?,
    })
}

/// Nodes sharing a layer must write disjoint fields.
fn check_disjoint_writes(outputs: &[(Node, NodeOutput)]) -> Result<()> {
    let mut written = Vec::new();
    for (node, output) in outputs {
        for field in output.writes() {
            if written.contains(field) {
                return Err(Error::Pipeline(format!(
                    "branch '{}' writes {:?}, already written in the same layer",
                    node, field
                )));
            }
            written.push(*field);
        }
    }
    Ok(())
}

fn log_outcome(node: Node, result: &Result<NodeOutput>) {
    match result {
        Ok(output) => debug!(node = %node, writes = ?output.writes(), "stage finished"),
        Err(e) => error!(node = %node, error = %e, "stage failed"),
    }
}
