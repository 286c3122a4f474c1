//! Structure extractor: per-move tags and capture narration

use shakmaty::{Role, Square};

use super::types::{role_from_symbol, role_name, MoveRecord, MoveTag, StructureInsight};
use crate::error::{Error, Result};

const CENTRAL_FILES: &[char] = &['c', 'd', 'e', 'f'];
const FLANK_FILES: &[char] = &['a', 'b', 'g', 'h'];

/// Derives one insight per record, in order. Each move is looked at on its
/// own; no board is replayed.
pub fn extract(records: &[MoveRecord]) -> Result<Vec<StructureInsight>> {
    if records.is_empty() {
        return Err(Error::validation("Missing move records for structure extraction"));
    }

    Ok(records.iter().map(insight_for).collect())
}

pub fn insight_for(record: &MoveRecord) -> StructureInsight {
    let role = mover_role(&record.san);
    let mut insights = Vec::new();

    if role == Role::Pawn && record.from.rank() != record.to.rank() {
        insights.push(MoveTag::PawnPush);
        if record.from.file() != record.to.file() {
            insights.push(MoveTag::PawnDiagonalPush);
        }
    }

    let description = format!(
        "{} moved from {} to {}",
        capitalize(role_name(role)),
        record.from,
        record.to
    );
    if is_central(record.to) {
        insights.push(MoveTag::CentralFileMovement(description));
    } else if is_flank(record.to) {
        insights.push(MoveTag::FlankFileMovement(description));
    }

    if matches!(role, Role::Rook | Role::Queen) {
        insights.push(MoveTag::FileActivation(role));
    }

    let mut capture_narration = None;
    if record.captured {
        if is_flank(record.to) {
            insights.push(MoveTag::FlankCapture);
        } else if is_central(record.to) {
            insights.push(MoveTag::CentralCapture);
        }
        capture_narration = Some(narrate_capture(record));
    }

    StructureInsight {
        move_number: record.move_number,
        player: record.player,
        san: record.san.clone(),
        uci: record.uci.clone(),
        insights,
        capture_narration,
    }
}

/// "<Attacker> on <src> captures <captured> on <dst>."
fn narrate_capture(record: &MoveRecord) -> String {
    let attacker = match record.san.chars().next() {
        Some(c) if c.is_lowercase() => "pawn",
        Some(c) => role_from_symbol(c).map(role_name).unwrap_or("unknown piece"),
        None => "unknown piece",
    };
    let captured = record
        .captured_piece
        .and_then(role_from_symbol)
        .map(role_name)
        .unwrap_or("unknown piece");

    format!(
        "{} on {} captures {} on {}.",
        capitalize(attacker),
        record.from,
        captured,
        record.to
    )
}

/// Piece inferred from notation: a leading piece letter, `O` or `0` for
/// castling, otherwise a pawn.
fn mover_role(san: &str) -> Role {
    match san.chars().next() {
        Some('O' | '0') => Role::King,
        Some(c) if c.is_ascii_uppercase() => role_from_symbol(c).unwrap_or(Role::Pawn),
        _ => Role::Pawn,
    }
}

fn is_central(square: Square) -> bool {
    CENTRAL_FILES.contains(&square.file().char())
}

fn is_flank(square: Square) -> bool {
    FLANK_FILES.contains(&square.file().char())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
