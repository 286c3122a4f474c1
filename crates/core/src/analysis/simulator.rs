//! Move simulator: replays movetext from a starting position

use shakmaty::{Chess, Color, Position};
use tracing::debug;

use super::types::MoveRecord;
use crate::error::{Error, Result};
use crate::parser::tokenize;
use crate::rules;

/// Replays `movetext` from `fen` (or the initial position when `fen` is
/// absent or blank) and records every ply in order.
///
/// Stops at the first token the rules engine rejects; nothing is skipped.
pub fn simulate(fen: Option<&str>, movetext: &str) -> Result<Vec<MoveRecord>> {
    if movetext.trim().is_empty() {
        return Err(Error::validation("'moves' must be provided"));
    }

    let mut position = match fen.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => rules::parse_fen(f)?,
        None => Chess::default(),
    };

    let starting_move_number = position.fullmoves().get();
    let offset = match position.turn() {
        Color::White => 0,
        Color::Black => 1,
    };

    let tokens = tokenize(movetext);
    let mut records = Vec::with_capacity(tokens.len());

    for (ply, token) in tokens.into_iter().enumerate() {
        let resolved = rules::resolve(&position, &token)?;
        let halfmove = ply as u32 + offset;

        records.push(MoveRecord {
            ply,
            move_number: halfmove / 2 + starting_move_number,
            player: position.turn().into(),
            san: token,
            uci: resolved.uci,
            from: resolved.from,
            to: resolved.to,
            captured: resolved.captured_piece.is_some(),
            captured_piece: resolved.captured_piece,
        });

        position = resolved.next;
    }

    debug!(plies = records.len(), "move simulation complete");
    Ok(records)
}
