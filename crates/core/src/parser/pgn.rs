//! PGN ingestion for strategy requests

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use std::fs;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::Path;

use crate::error::{Error, Result};

/// Mainline of one game, as written in the PGN.
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    /// Value of the `[FEN]` tag for games not starting from the initial position.
    pub fen: Option<String>,
    pub moves: Vec<String>,
}

impl PgnGame {
    /// Mainline joined back into plain movetext.
    pub fn movetext(&self) -> String {
        self.moves.join(" ")
    }
}

#[derive(Default)]
struct GameTags {
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    fen: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    moves: Vec<String>,
}

struct GameCollector;

impl Visitor for GameCollector {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = PgnGame;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();

        match name_str.as_ref() {
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            "FEN" => tags.fen = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            moves: Vec::new(),
        })
    }

    // Legality is checked later by the move simulator, from the right board.
    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        movetext.moves.push(san.to_string());
        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        PgnGame {
            white: movetext.tags.white,
            black: movetext.tags.black,
            result: movetext.tags.result,
            fen: movetext.tags.fen,
            moves: movetext.moves,
        }
    }
}

pub fn parse_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<PgnGame>> {
    let contents = fs::read_to_string(path)?;
    parse_pgn_string(&contents)
}

pub fn parse_pgn_string(pgn: &str) -> Result<Vec<PgnGame>> {
    let mut collector = GameCollector;
    let mut games = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut collector) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => break,
            Err(e) => return Err(Error::Pgn(e.to_string())),
        }
    }

    if games.is_empty() {
        Err(Error::Pgn("No games found in PGN".to_string()))
    } else {
        Ok(games)
    }
}

/// Movetext and optional starting FEN extracted from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMoves {
    pub movetext: String,
    pub fen: Option<String>,
}

/// Accepts either bare movetext or a full PGN with a tag section.
///
/// Bare movetext is passed through trimmed; a PGN contributes the mainline of
/// its first game and its `[FEN]` tag, if any.
pub fn extract_moves(input: &str) -> Result<ExtractedMoves> {
    let trimmed = input.trim();
    if !trimmed.starts_with('[') {
        return Ok(ExtractedMoves {
            movetext: trimmed.to_string(),
            fen: None,
        });
    }

    let mut games = parse_pgn_string(trimmed)?;
    let game = games.swap_remove(0);
    Ok(ExtractedMoves {
        movetext: game.movetext(),
        fen: game.fen,
    })
}
