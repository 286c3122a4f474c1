//! Movetext and PGN parsing

pub mod movetext;
pub mod pgn;

pub use movetext::tokenize;
pub use pgn::{extract_moves, parse_pgn_file, parse_pgn_string, ExtractedMoves, PgnGame};
