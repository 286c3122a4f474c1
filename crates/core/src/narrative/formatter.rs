//! Formatter: goal statement plus bullet roadmap

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const GOAL_NOT_FOUND: &str = "(Strategic goal not found)";

const BULLET_MARKERS: [char; 2] = ['-', '•'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedStrategy {
    pub goal: String,
    pub roadmap: Vec<String>,
}

impl fmt::Display for FormattedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**Strategic Goal:**\n{}\n\n**Roadmap of Specific Ideas:**",
            self.goal
        )?;
        for point in &self.roadmap {
            write!(f, "\n{}", point)?;
        }
        Ok(())
    }
}

/// Extracts the goal and roadmap from a final narrative.
///
/// The goal is the first non-blank line after the first line mentioning
/// "strategic goal" (any case); the roadmap is every line starting with a
/// bullet marker, in order.
pub fn format(narrative: &str) -> Result<FormattedStrategy> {
    let text = narrative.trim();
    if text.is_empty() {
        return Err(Error::validation("Missing final narrative"));
    }

    let lines: Vec<&str> = text.lines().collect();

    let goal = lines
        .iter()
        .position(|line| line.to_lowercase().contains("strategic goal"))
        .and_then(|heading| {
            lines[heading + 1..]
                .iter()
                .map(|line| line.trim())
                .find(|line| !line.is_empty())
        })
        .map(String::from)
        .unwrap_or_else(|| GOAL_NOT_FOUND.to_string());

    let roadmap = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.starts_with(BULLET_MARKERS))
        .map(String::from)
        .collect();

    Ok(FormattedStrategy { goal, roadmap })
}
