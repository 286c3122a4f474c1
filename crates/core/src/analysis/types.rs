//! Types produced by the deterministic analysis stages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use shakmaty::{Color, Role, Square};

use crate::error::Error;

/// The side a plan is written for, or the mover of a ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    /// Capitalized label used in move records ("White" / "Black").
    pub fn label(&self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            other => Err(Error::validation(format!(
                "side must be 'white' or 'black', got '{}'",
                other
            ))),
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// One resolved ply of the input move sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveRecord {
    pub ply: usize,
    pub move_number: u32,
    #[serde(serialize_with = "serialize_label")]
    pub player: Side,
    pub san: String,
    pub uci: String,
    #[serde(serialize_with = "serialize_display")]
    pub from: Square,
    #[serde(serialize_with = "serialize_display")]
    pub to: Square,
    pub captured: bool,
    pub captured_piece: Option<char>,
}

/// Structural observation about a single move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTag {
    PawnPush,
    PawnDiagonalPush,
    CentralFileMovement(String),
    FlankFileMovement(String),
    FileActivation(Role),
    FlankCapture,
    CentralCapture,
}

impl fmt::Display for MoveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveTag::PawnPush => f.write_str("pawn_push"),
            MoveTag::PawnDiagonalPush => f.write_str("pawn_diagonal_push"),
            MoveTag::CentralFileMovement(desc) => write!(f, "central_file movement - {}", desc),
            MoveTag::FlankFileMovement(desc) => write!(f, "flank_file movement - {}", desc),
            MoveTag::FileActivation(role) => write!(f, "{}_file_activation", role_name(*role)),
            MoveTag::FlankCapture => f.write_str("flank_capture"),
            MoveTag::CentralCapture => f.write_str("central_capture"),
        }
    }
}

impl Serialize for MoveTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Tags and narration derived from one [`MoveRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureInsight {
    pub move_number: u32,
    #[serde(serialize_with = "serialize_label")]
    pub player: Side,
    pub san: String,
    pub uci: String,
    pub insights: Vec<MoveTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_narration: Option<String>,
}

impl StructureInsight {
    pub fn has_tag(&self, rendered: &str) -> bool {
        self.insights.iter().any(|t| t.to_string() == rendered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KingSafety {
    CastledWithShield,
    CastledPartialShield,
    Uncastled,
    Exposed,
}

impl KingSafety {
    /// Castled means the king stands on the c- or g-file.
    pub fn classify(castled: bool, pawn_shield: u32) -> Self {
        match (castled, pawn_shield) {
            (true, 3..) => KingSafety::CastledWithShield,
            (true, 1..=2) => KingSafety::CastledPartialShield,
            (false, _) => KingSafety::Uncastled,
            (true, 0) => KingSafety::Exposed,
        }
    }
}

/// Central squares each color attacks at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterControl {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

/// Static features of a single position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionFeatures {
    pub white_king_safety: KingSafety,
    pub black_king_safety: KingSafety,
    pub center_control: CenterControl,
    pub white_has_bishop_pair: bool,
    pub black_has_bishop_pair: bool,
    pub open_files: Vec<char>,
    pub white_semi_open_files: Vec<char>,
    pub black_semi_open_files: Vec<char>,
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// Maps a piece letter of either case to its role.
pub fn role_from_symbol(symbol: char) -> Option<Role> {
    match symbol.to_ascii_lowercase() {
        'p' => Some(Role::Pawn),
        'n' => Some(Role::Knight),
        'b' => Some(Role::Bishop),
        'r' => Some(Role::Rook),
        'q' => Some(Role::Queen),
        'k' => Some(Role::King),
        _ => None,
    }
}

/// Movers are written as "White" / "Black".
fn serialize_label<S: Serializer>(side: &Side, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(side.label())
}

pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_safety_classification() {
        assert_eq!(KingSafety::classify(true, 3), KingSafety::CastledWithShield);
        assert_eq!(KingSafety::classify(true, 2), KingSafety::CastledPartialShield);
        assert_eq!(KingSafety::classify(true, 1), KingSafety::CastledPartialShield);
        assert_eq!(KingSafety::classify(true, 0), KingSafety::Exposed);
        for pawns in 0..=3 {
            assert_eq!(KingSafety::classify(false, pawns), KingSafety::Uncastled);
        }
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("White".parse::<Side>().unwrap(), Side::White);
        assert_eq!(" black ".parse::<Side>().unwrap(), Side::Black);
        assert!("red".parse::<Side>().is_err());
        assert_eq!(Side::Black.label(), "Black");
    }

    #[test]
    fn test_tag_rendering() {
        let tag = MoveTag::CentralFileMovement("Knight moved from g1 to f3".to_string());
        assert_eq!(tag.to_string(), "central_file movement - Knight moved from g1 to f3");
        assert_eq!(MoveTag::FileActivation(Role::Rook).to_string(), "rook_file_activation");
        assert_eq!(
            serde_json::to_string(&MoveTag::PawnPush).unwrap(),
            "\"pawn_push\""
        );
    }

    #[test]
    fn test_features_serialize_with_snake_case_safety() {
        let json = serde_json::to_value(KingSafety::CastledPartialShield).unwrap();
        assert_eq!(json, "castled_partial_shield");
    }
}
