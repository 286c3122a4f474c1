//! Chess rules collaborator
//!
//! Thin layer over shakmaty: FEN parsing, SAN resolution against a board and
//! board summaries. Legality itself is shakmaty's business.

use std::collections::BTreeMap;

use serde::Serialize;
use shakmaty::{
    fen::Fen, san::SanPlus, CastlingMode, Chess, EnPassantMode, File, Move, Piece, Position, Square,
};

use crate::analysis::Side;
use crate::error::{Error, Result};

/// Snapshot of a board as reported to the narrative stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub side_to_move: Side,
    pub piece_map: BTreeMap<String, char>,
    pub is_check: bool,
    pub halfmove_clock: u32,
}

/// A move token resolved against a concrete board.
#[derive(Debug, Clone)]
pub struct ResolvedMove {
    pub uci: String,
    pub from: Square,
    pub to: Square,
    /// Symbol of the captured piece, uppercase for white.
    pub captured_piece: Option<char>,
    pub next: Chess,
}

/// Parses a FEN into a playable position.
pub fn parse_fen(fen: &str) -> Result<Chess> {
    let invalid = |reason: String| Error::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

pub fn to_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Resolves one SAN token on `position`.
///
/// Any unparseable or illegal token yields [`Error::IllegalMove`] carrying the
/// token and the FEN of the board it was tried on. Castling may be spelled
/// with zeros (`0-0`, `0-0-0`).
pub fn resolve(position: &Chess, token: &str) -> Result<ResolvedMove> {
    let illegal = || Error::IllegalMove {
        token: token.to_string(),
        fen: to_fen(position),
    };

    let san: SanPlus = normalize_castling(token).parse().map_err(|_| illegal())?;
    let mv = san.san.to_move(position).map_err(|_| illegal())?;
    let (from, to) = move_squares(&mv).ok_or_else(illegal)?;

    let mover = position.turn();
    let captured_piece = mv.capture().map(|role| {
        Piece {
            color: !mover,
            role,
        }
        .char()
    });

    let uci = move_to_uci(&mv);
    let next = position.clone().play(mv).map_err(|_| illegal())?;

    Ok(ResolvedMove {
        uci,
        from,
        to,
        captured_piece,
        next,
    })
}

fn normalize_castling(token: &str) -> String {
    if let Some(rest) = token.strip_prefix("0-0-0") {
        format!("O-O-O{}", rest)
    } else if let Some(rest) = token.strip_prefix("0-0") {
        format!("O-O{}", rest)
    } else {
        token.to_string()
    }
}

pub fn board_summary(position: &Chess) -> BoardSummary {
    let board = position.board();
    let piece_map = board
        .occupied()
        .into_iter()
        .filter_map(|sq| board.piece_at(sq).map(|p| (sq.to_string(), p.char())))
        .collect();

    BoardSummary {
        side_to_move: position.turn().into(),
        piece_map,
        is_check: position.is_check(),
        halfmove_clock: position.halfmoves(),
    }
}

/// Source and destination as a player sees them; castling lands the king on
/// the c- or g-file.
fn move_squares(mv: &Move) -> Option<(Square, Square)> {
    match mv {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } => Some((*from, *to)),
        Move::Castle { king, rook } => Some((*king, castled_king_square(*king, *rook))),
        Move::Put { .. } => None,
    }
}

fn castled_king_square(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() {
        File::G
    } else {
        File::C
    };
    Square::from_coords(file, king.rank())
}

fn move_to_uci(mv: &Move) -> String {
    match mv {
        Move::Normal {
            from,
            to,
            promotion,
            ..
        } => {
            let promo = promotion.map(|r| r.char().to_string()).unwrap_or_default();
            format!("{}{}{}", from, to, promo)
        }
        Move::EnPassant { from, to } => format!("{}{}", from, to),
        Move::Castle { king, rook } => format!("{}{}", king, castled_king_square(*king, *rook)),
        Move::Put { .. } => String::new(),
    }
}
