//! Movetext tokenization

use regex::Regex;
use std::sync::LazyLock;

static MOVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.(\.\.)?").expect("valid move number pattern"));

static RESULT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1-0|0-1|1/2-1/2|\*").expect("valid result pattern"));

/// Splits raw movetext into move tokens.
///
/// Move-number labels (`12.`, `12...`) and game results (`1-0`, `0-1`,
/// `1/2-1/2`, `*`) are removed before splitting on whitespace.
pub fn tokenize(movetext: &str) -> Vec<String> {
    let without_numbers = MOVE_NUMBER.replace_all(movetext, "");
    let cleaned = RESULT_TOKEN.replace_all(&without_numbers, "");
    cleaned.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_move_numbers() {
        assert_eq!(tokenize("1. e4 e5 2. Nf3"), vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_strips_black_ellipsis() {
        assert_eq!(tokenize("21... bxc6 22. Ne2"), vec!["bxc6", "Ne2"]);
    }

    #[test]
    fn test_strips_results() {
        assert_eq!(tokenize("1. d4 d5 1/2-1/2"), vec!["d4", "d5"]);
        assert_eq!(tokenize("1. e4 1-0"), vec!["e4"]);
        assert_eq!(tokenize("e4 c5 *"), vec!["e4", "c5"]);
        assert_eq!(tokenize("1. f3 e5 2. g4 Qh4# 0-1"), vec!["f3", "e5", "g4", "Qh4#"]);
    }

    #[test]
    fn test_numbers_glued_to_moves() {
        assert_eq!(tokenize("1.e4 e5 2.Nf3"), vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("  ").is_empty());
        assert!(tokenize("1-0").is_empty());
    }
}
