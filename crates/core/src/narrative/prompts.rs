//! Prompt text for the narrative collaborators

use crate::analysis::{PositionFeatures, Side, StructureInsight};

/// Facts every narrative prompt is grounded on.
#[derive(Debug, Clone, Copy)]
pub struct PlanFacts<'a> {
    pub fen: &'a str,
    pub moves: &'a str,
    pub side: Side,
    pub features: Option<&'a PositionFeatures>,
    pub insights: &'a [StructureInsight],
}

impl PlanFacts<'_> {
    fn features_json(&self) -> String {
        match self.features {
            Some(features) => to_pretty_json(features),
            None => "{}".to_string(),
        }
    }

    fn insights_json(&self) -> String {
        to_pretty_json(&self.insights)
    }
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn synthesis(facts: &PlanFacts<'_>) -> (String, String) {
    let system = format!(
        "You are a chess strategist. Use the structural and positional insights \
         provided to build a strategic plan for {} in the game below.",
        facts.side
    );
    let user = format!(
        "FEN of the starting position: {fen}\n\
         POSITION FEATURES of that position:\n{features}\n\n\
         Moves played from that position: {moves}\n\
         STRUCTURE INSIGHTS for each move:\n{insights}\n\n\
         Work through the game move by move, using the insights above.\n\
         Produce:\n\
         - A heading \"Strategic Goal\" followed by a short summary of the strategic goal for {side}\n\
         - A bullet-point roadmap of specific strategic ideas such as pawn breaks, \
         piece placements, open files, and targets or weaknesses to attack or defend\n\
         - Every bullet must be concrete and actionable\n\
         - No conclusions or closing remarks such as 'In summary' or 'Overall'.",
        fen = facts.fen,
        features = facts.features_json(),
        moves = facts.moves,
        insights = facts.insights_json(),
        side = facts.side,
    );
    (system, user)
}

pub fn verification(facts: &PlanFacts<'_>, draft: &str) -> (String, String) {
    let system = "You are a strict chess expert acting as a verifier. Decide whether a \
                  strategy is consistent with the position it describes."
        .to_string();
    let user = format!(
        "FEN: {fen}\n\
         Side to plan for: {side}\n\
         Position Features:\n{features}\n\
         Structure Insights:\n{insights}\n\
         Moves:\n{moves}\n\n\
         Strategy to verify:\n{draft}\n\n\
         Look for hallucinated pieces, squares or moves and for contradictions with the facts.\n\
         Answer with JSON only:\n\
         {{\"verdict\": \"valid\" | \"needs_correction\", \"issues\": [\"...\"]}}",
        fen = facts.fen,
        side = facts.side,
        features = facts.features_json(),
        insights = facts.insights_json(),
        moves = facts.moves,
        draft = draft,
    );
    (system, user)
}

pub fn correction(draft: &str, issues: &[String]) -> (String, String) {
    let system =
        "You are a chess strategist. Rewrite the plan so that the listed issues are fixed."
            .to_string();
    let user = format!(
        "Original Strategy:\n{draft}\n\n\
         Issues:\n{issues}\n\n\
         Correct the strategy so it agrees with the FEN and the structure insights.\n\
         Reply ONLY with the corrected strategy: the \"Strategic Goal\" heading with its \
         summary, then the bullet points.",
        draft = draft,
        issues = issues.join("\n"),
    );
    (system, user)
}

pub fn aggregation(summaries: &[String]) -> (String, String) {
    let system =
        "You are a chess analyst who extracts the plans that recur across many games.".to_string();
    let user = format!(
        "Below are strategy summaries from several games. Synthesize a tactical roadmap \
         that captures the most common, actionable ideas they share.\n\n\
         Summaries:\n{}\n\n\
         Output:\n\
         - A high-level goal of two or three lines\n\
         - 4 to 6 bullet points on recurring patterns: key maneuvers, typical threats, \
         pawn breaks, open-file play and piece coordination\n\
         - Do not copy sentences from the input; consolidate and abstract over them.",
        summaries.join("\n")
    );
    (system, user)
}
