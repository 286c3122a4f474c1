//! Fixed DAG of pipeline nodes

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    FenValidator,
    MoveSimulator,
    StructureExtractor,
    PositionFeatureExtractor,
    Join,
    IdeaSynthesizer,
    Verifier,
    StrategyFormatter,
}

impl Node {
    pub const ALL: [Node; 8] = [
        Node::FenValidator,
        Node::MoveSimulator,
        Node::StructureExtractor,
        Node::PositionFeatureExtractor,
        Node::Join,
        Node::IdeaSynthesizer,
        Node::Verifier,
        Node::StrategyFormatter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Node::FenValidator => "fen_validator",
            Node::MoveSimulator => "move_simulator",
            Node::StructureExtractor => "structure_extractor",
            Node::PositionFeatureExtractor => "position_feature_extractor",
            Node::Join => "join",
            Node::IdeaSynthesizer => "idea_synthesizer",
            Node::Verifier => "verifier",
            Node::StrategyFormatter => "strategy_formatter",
        }
    }

    /// Incoming edges.
    pub fn dependencies(&self) -> &'static [Node] {
        match self {
            Node::FenValidator => &[],
            Node::MoveSimulator => &[Node::FenValidator],
            Node::StructureExtractor => &[Node::MoveSimulator],
            Node::PositionFeatureExtractor => &[Node::MoveSimulator],
            Node::Join => &[Node::StructureExtractor, Node::PositionFeatureExtractor],
            Node::IdeaSynthesizer => &[Node::Join],
            Node::Verifier => &[Node::IdeaSynthesizer],
            Node::StrategyFormatter => &[Node::Verifier],
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Groups `nodes` into layers: every node's dependencies sit in earlier
/// layers, and nodes sharing a layer are independent of each other.
pub fn layers_of(nodes: &[Node]) -> Result<Vec<Vec<Node>>> {
    let mut indegree: BTreeMap<Node, usize> = nodes
        .iter()
        .map(|node| (*node, node.dependencies().len()))
        .collect();

    for node in nodes {
        if let Some(missing) = node.dependencies().iter().find(|d| !indegree.contains_key(d)) {
            return Err(Error::Pipeline(format!(
                "node '{}' depends on '{}', which is not in the graph",
                node, missing
            )));
        }
    }

    let mut layers = Vec::new();
    let mut ready: Vec<Node> = indegree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(node, _)| *node)
        .collect();

    let mut placed = 0;
    while !ready.is_empty() {
        placed += ready.len();
        for node in &ready {
            indegree.remove(node);
        }

        let mut next = Vec::new();
        for (node, deg) in indegree.iter_mut() {
            let satisfied = node.dependencies().iter().filter(|d| ready.contains(d)).count();
            *deg -= satisfied;
            if *deg == 0 && satisfied > 0 {
                next.push(*node);
            }
        }

        layers.push(std::mem::replace(&mut ready, next));
    }

    if placed != nodes.len() {
        return Err(Error::Pipeline("pipeline graph contains a cycle".to_string()));
    }

    Ok(layers)
}

/// Execution layers of the strategy pipeline.
pub fn strategy_layers() -> Result<Vec<Vec<Node>>> {
    layers_of(&Node::ALL)
}
