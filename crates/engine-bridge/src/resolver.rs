//! Turns the engine's result line into one of the position's legal moves.

use crate::position::LegalMove;
use crate::EngineError;
use std::fmt;

/// Character engines and some GUIs use to mark captures in long algebraic text.
const CAPTURE_INDICATOR: char = 'x';

/// Move text as the engine wrote it, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveText {
    /// Origin square, e.g. `"e7"`.
    pub origin: String,
    /// Destination square, e.g. `"e8"`.
    pub destination: String,
    /// Promotion piece letter, if any.
    pub promotion: Option<char>,
}

impl MoveText {
    fn matches<M: LegalMove>(&self, mv: &M) -> bool {
        mv.origin_square() == self.origin
            && mv.destination_square() == self.destination
            && mv.promotion_piece() == self.promotion
    }
}

impl fmt::Display for MoveText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo)?;
        }
        Ok(())
    }
}

/// Extracts the move text following the `bestmove` token of a result line.
///
/// Format: `"bestmove e2e4 ponder e7e5"`. Capture indicators are dropped,
/// and the remaining text must be four characters (origin + destination)
/// or five (plus promotion piece).
pub fn parse_move_text(raw: &str) -> Result<MoveText, EngineError> {
    let collapsed = raw.replace(['\r', '\n'], " ");
    let mut tokens = collapsed.split_whitespace();

    if !tokens.any(|token| token == uci::BESTMOVE) {
        return Err(EngineError::Parse(format!(
            "no '{}' token in {:?}",
            uci::BESTMOVE,
            raw
        )));
    }
    let text = tokens.next().ok_or_else(|| {
        EngineError::Parse(format!("no move after '{}' in {:?}", uci::BESTMOVE, raw))
    })?;

    if !text.is_ascii() {
        return Err(EngineError::Parse(format!(
            "move text {:?} is not ASCII",
            text
        )));
    }

    let chars: Vec<char> = text.chars().filter(|&c| c != CAPTURE_INDICATOR).collect();
    if chars.len() != 4 && chars.len() != 5 {
        return Err(EngineError::Parse(format!(
            "move text {:?} must be 4 or 5 characters",
            text
        )));
    }

    Ok(MoveText {
        origin: chars[0..2].iter().collect(),
        destination: chars[2..4].iter().collect(),
        promotion: chars.get(4).copied(),
    })
}

/// Finds the legal move the engine's result line names.
///
/// The first move in iteration order with the same origin, destination and
/// promotion wins. An answer that matches nothing is reported as
/// [`EngineError::NoMatch`]; no other move is ever substituted.
pub fn resolve<M, I>(legal_moves: I, raw: &str) -> Result<M, EngineError>
where
    M: LegalMove,
    I: IntoIterator<Item = M>,
{
    let text = parse_move_text(raw)?;
    legal_moves
        .into_iter()
        .find(|mv| text.matches(mv))
        .ok_or_else(|| EngineError::NoMatch(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestMove {
        from: &'static str,
        to: &'static str,
        promo: Option<char>,
        tag: u8,
    }

    impl LegalMove for TestMove {
        fn origin_square(&self) -> String {
            self.from.to_string()
        }

        fn destination_square(&self) -> String {
            self.to.to_string()
        }

        fn promotion_piece(&self) -> Option<char> {
            self.promo
        }
    }

    fn mv(from: &'static str, to: &'static str) -> TestMove {
        TestMove {
            from,
            to,
            promo: None,
            tag: 0,
        }
    }

    fn promo(from: &'static str, to: &'static str, piece: char) -> TestMove {
        TestMove {
            from,
            to,
            promo: Some(piece),
            tag: 0,
        }
    }

    fn opening_moves() -> Vec<TestMove> {
        vec![mv("d2", "d4"), mv("e2", "e3"), mv("e2", "e4"), mv("g1", "f3")]
    }

    #[test]
    fn resolves_plain_move() {
        let resolved = resolve(opening_moves(), "bestmove e2e4").unwrap();
        assert_eq!(resolved, mv("e2", "e4"));
    }

    #[test]
    fn resolves_with_ponder_and_newline() {
        let resolved = resolve(opening_moves(), "bestmove g1f3 ponder g8f6\n").unwrap();
        assert_eq!(resolved, mv("g1", "f3"));
    }

    #[test]
    fn marker_need_not_be_first_token() {
        let resolved = resolve(opening_moves(), "info string done\nbestmove d2d4").unwrap();
        assert_eq!(resolved, mv("d2", "d4"));
    }

    #[test]
    fn resolves_promotion() {
        let legal = vec![
            promo("e7", "e8", 'n'),
            promo("e7", "e8", 'q'),
            mv("a2", "a1"),
        ];
        let resolved = resolve(legal, "bestmove e7e8q").unwrap();
        assert_eq!(resolved, promo("e7", "e8", 'q'));
    }

    #[test]
    fn promotion_missing_from_legal_set_is_no_match() {
        let legal = vec![promo("e7", "e8", 'n'), mv("e7", "e8")];
        match resolve(legal, "bestmove e7e8q") {
            Err(EngineError::NoMatch(text)) => assert_eq!(text, "e7e8q"),
            other => panic!("Expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn plain_text_does_not_match_promotion() {
        let legal = vec![promo("e7", "e8", 'q')];
        assert!(matches!(
            resolve(legal, "bestmove e7e8"),
            Err(EngineError::NoMatch(_))
        ));
    }

    #[test]
    fn capture_indicator_is_ignored() {
        let with_capture = resolve(opening_moves(), "bestmove e2xe4").unwrap();
        let without = resolve(opening_moves(), "bestmove e2e4").unwrap();
        assert_eq!(with_capture, without);
    }

    #[test]
    fn first_match_wins() {
        let first = TestMove { tag: 1, ..mv("e2", "e4") };
        let second = TestMove { tag: 2, ..mv("e2", "e4") };
        let resolved = resolve(vec![mv("d2", "d4"), first, second], "bestmove e2e4").unwrap();
        assert_eq!(resolved.tag, 1);
    }

    #[test]
    fn wrong_length_is_parse_error() {
        for line in ["bestmove e2e", "bestmove e7e8qq", "bestmove (none)"] {
            assert!(
                matches!(resolve(opening_moves(), line), Err(EngineError::Parse(_))),
                "{} should not parse",
                line
            );
        }
    }

    #[test]
    fn missing_marker_is_parse_error() {
        assert!(matches!(
            resolve(opening_moves(), "info depth 12 pv e2e4"),
            Err(EngineError::Parse(_))
        ));
        assert!(matches!(
            resolve(opening_moves(), ""),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn marker_as_last_token_is_parse_error() {
        assert!(matches!(
            resolve(opening_moves(), "bestmove"),
            Err(EngineError::Parse(_))
        ));
        assert!(matches!(
            resolve(opening_moves(), "bestmove \r\n"),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn non_ascii_text_is_parse_error() {
        assert!(matches!(
            resolve(opening_moves(), "bestmove é2é4"),
            Err(EngineError::Parse(_))
        ));
        assert!(matches!(
            parse_move_text("bestmove e2ë4"),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn move_text_display() {
        let text = parse_move_text("bestmove a7xa8r").unwrap();
        assert_eq!(text.promotion, Some('r'));
        assert_eq!(text.to_string(), "a7a8r");
    }

    const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

    fn square() -> impl Strategy<Value = String> {
        (0usize..8, 1u8..=8).prop_map(|(f, r)| format!("{}{}", FILES[f], r))
    }

    proptest! {
        #[test]
        fn any_square_pair_parses(from in square(), to in square()) {
            let text = parse_move_text(&format!("bestmove {}{}", from, to)).unwrap();
            prop_assert_eq!(text.origin, from);
            prop_assert_eq!(text.destination, to);
            prop_assert_eq!(text.promotion, None);
        }

        #[test]
        fn capture_indicators_anywhere_are_ignored(
            from in square(),
            to in square(),
            at in 0usize..5,
        ) {
            let plain = format!("{}{}", from, to);
            let mut marked = plain.clone();
            marked.insert(at, 'x');
            prop_assert_eq!(
                parse_move_text(&format!("bestmove {}", marked)).unwrap(),
                parse_move_text(&format!("bestmove {}", plain)).unwrap()
            );
        }

        #[test]
        fn other_lengths_never_parse(text in "[a-h1-8qrbn]{0,3}|[a-h1-8qrbn]{6,10}") {
            let result = resolve(opening_moves(), &format!("bestmove {}", text));
            prop_assert!(matches!(result, Err(EngineError::Parse(_))));
        }
    }
}
