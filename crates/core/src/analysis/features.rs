//! Position feature extractor: static features of one board

use shakmaty::{Bitboard, Board, Chess, Color, File, Piece, Position, Role, Square};
use std::collections::BTreeSet;
use tracing::debug;

use super::types::{CenterControl, KingSafety, PositionFeatures};
use crate::error::Result;
use crate::rules;

const CENTER: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// Extracts features from `fen`. An absent or blank FEN is a no-op.
pub fn extract(fen: Option<&str>) -> Result<Option<PositionFeatures>> {
    let Some(fen) = fen.map(str::trim).filter(|f| !f.is_empty()) else {
        debug!("no FEN supplied; skipping position features");
        return Ok(None);
    };

    let position = rules::parse_fen(fen)?;
    Ok(Some(features_of(&position)))
}

pub fn features_of(position: &Chess) -> PositionFeatures {
    let board = position.board();

    let (white_open, white_semi) = file_status(board, Color::White);
    let (black_open, black_semi) = file_status(board, Color::Black);
    let black_open: BTreeSet<char> = black_open.into_iter().collect();
    let open_files = white_open
        .into_iter()
        .filter(|f| black_open.contains(f))
        .collect();

    PositionFeatures {
        white_king_safety: king_safety(board, Color::White),
        black_king_safety: king_safety(board, Color::Black),
        center_control: center_control(board),
        white_has_bishop_pair: has_bishop_pair(board, Color::White),
        black_has_bishop_pair: has_bishop_pair(board, Color::Black),
        open_files,
        white_semi_open_files: white_semi,
        black_semi_open_files: black_semi,
    }
}

/// Counts own pawns on the three squares directly in front of the king.
pub fn pawn_shield(board: &Board, king: Square, color: Color) -> u32 {
    let forward = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    let Some(rank) = king.rank().offset(forward) else {
        return 0;
    };
    let own_pawn = Piece {
        color,
        role: Role::Pawn,
    };

    (-1..=1)
        .filter_map(|df| king.file().offset(df))
        .filter(|&file| board.piece_at(Square::from_coords(file, rank)) == Some(own_pawn))
        .count() as u32
}

fn king_safety(board: &Board, color: Color) -> KingSafety {
    let Some(king) = board.king_of(color) else {
        return KingSafety::Exposed;
    };
    let castled = matches!(king.file(), File::C | File::G);
    KingSafety::classify(castled, pawn_shield(board, king, color))
}

fn center_control(board: &Board) -> CenterControl {
    let mut control = CenterControl::default();
    for square in CENTER {
        if attacked_by(board, square, Color::White) {
            control.white.push(square.to_string());
        }
        if attacked_by(board, square, Color::Black) {
            control.black.push(square.to_string());
        }
    }
    control
}

fn attacked_by(board: &Board, square: Square, color: Color) -> bool {
    !board
        .attacks_to(square, color, board.occupied())
        .is_empty()
}

fn has_bishop_pair(board: &Board, color: Color) -> bool {
    (board.bishops() & board.by_color(color)).count() == 2
}

/// Open and semi-open files from `color`'s point of view, a to h.
fn file_status(board: &Board, color: Color) -> (Vec<char>, Vec<char>) {
    let mut open = Vec::new();
    let mut semi_open = Vec::new();

    for file in File::ALL {
        let on_file = board.pawns() & Bitboard::from_file(file);
        let own = !(on_file & board.by_color(color)).is_empty();
        let opponent = !(on_file & board.by_color(!color)).is_empty();

        match (own, opponent) {
            (false, false) => open.push(file.char()),
            (false, true) => semi_open.push(file.char()),
            _ => {}
        }
    }

    (open, semi_open)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(fen: &str) -> PositionFeatures {
        extract(Some(fen)).unwrap().unwrap()
    }

    #[test]
    fn test_absent_fen_is_noop() {
        assert!(extract(None).unwrap().is_none());
        assert!(extract(Some("  ")).unwrap().is_none());
    }

    #[test]
    fn test_starting_position() {
        let f = features_of(&Chess::default());
        assert_eq!(f.white_king_safety, KingSafety::Uncastled);
        assert_eq!(f.black_king_safety, KingSafety::Uncastled);
        assert!(f.white_has_bishop_pair);
        assert!(f.black_has_bishop_pair);
        assert!(f.open_files.is_empty());
        assert!(f.white_semi_open_files.is_empty());
        assert!(f.center_control.white.is_empty());
        assert!(f.center_control.black.is_empty());
    }

    #[test]
    fn test_castled_king_shields() {
        let f = features("r4rk1/ppp2ppp/8/8/8/8/PPP2P1P/R4RK1 w - - 0 1");
        assert_eq!(f.black_king_safety, KingSafety::CastledWithShield);
        assert_eq!(f.white_king_safety, KingSafety::CastledPartialShield);

        let exposed = features("r4rk1/ppp5/8/8/8/8/PPP5/R4RK1 w - - 0 1");
        assert_eq!(exposed.white_king_safety, KingSafety::Exposed);
        assert_eq!(exposed.black_king_safety, KingSafety::Exposed);
    }

    #[test]
    fn test_king_on_d_file_is_uncastled() {
        let f = features("3k4/2ppp3/8/8/8/8/2PPP3/3K4 w - - 0 1");
        assert_eq!(f.white_king_safety, KingSafety::Uncastled);
        assert_eq!(f.black_king_safety, KingSafety::Uncastled);
    }

    #[test]
    fn test_pawn_shield_on_edge_file() {
        let pos = rules::parse_fen("7k/6pp/8/8/8/8/6PP/7K w - - 0 1").unwrap();
        assert_eq!(pawn_shield(pos.board(), Square::H1, Color::White), 2);
        assert_eq!(pawn_shield(pos.board(), Square::H8, Color::Black), 2);
    }

    #[test]
    fn test_center_control_after_e4_e5() {
        let f = features("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        assert_eq!(f.center_control.white, vec!["d5".to_string()]);
        assert_eq!(f.center_control.black, vec!["d4".to_string()]);
    }

    #[test]
    fn test_file_status() {
        let f = features("4k3/pp3ppp/8/8/8/8/PPP2PP1/4K3 w - - 0 1");
        assert_eq!(f.open_files, vec!['d', 'e']);
        assert_eq!(f.white_semi_open_files, vec!['h']);
        assert_eq!(f.black_semi_open_files, vec!['c']);
        for file in &f.open_files {
            assert!(!f.white_semi_open_files.contains(file));
            assert!(!f.black_semi_open_files.contains(file));
        }
    }

    #[test]
    fn test_bishop_pair_needs_exactly_two() {
        let f = features("2b1kb2/8/8/8/8/8/8/2B1K3 w - - 0 1");
        assert!(!f.white_has_bishop_pair);
        assert!(f.black_has_bishop_pair);
    }

    #[test]
    fn test_invalid_fen_propagates() {
        assert!(extract(Some("8/8/8 w")).is_err());
    }
}
