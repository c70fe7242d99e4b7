//! The rules collaborator seam.
//!
//! The bridge never generates moves itself. It needs a position that can be
//! written as FEN for the `position fen` command and the list of legal moves
//! to validate the engine's answer against. [`shakmaty::Chess`] implements
//! both traits out of the box.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move};

/// A legal move as the rules collaborator describes it.
pub trait LegalMove {
    /// Origin square in algebraic notation, e.g. `"e2"`.
    fn origin_square(&self) -> String;

    /// Destination square in algebraic notation, e.g. `"e4"`.
    fn destination_square(&self) -> String;

    /// Lowercase promotion piece letter, `None` when the move does not promote.
    fn promotion_piece(&self) -> Option<char>;

    /// Long algebraic text, e.g. `"e7e8q"`.
    fn uci_text(&self) -> String {
        let mut text = self.origin_square();
        text.push_str(&self.destination_square());
        if let Some(promo) = self.promotion_piece() {
            text.push(promo);
        }
        text
    }
}

/// A position the engine can be asked about.
pub trait RulesPosition {
    type Move: LegalMove;

    /// FEN string for the `position fen` command.
    fn engine_fen(&self) -> String;

    /// Every legal move in the position, in the collaborator's order.
    fn candidate_moves(&self) -> Vec<Self::Move>;
}

impl LegalMove for Move {
    fn origin_square(&self) -> String {
        match self.to_uci(CastlingMode::Standard) {
            UciMove::Normal { from, .. } => from.to_string(),
            _ => String::new(),
        }
    }

    fn destination_square(&self) -> String {
        // Castling must read as the king's two-square step, not king-takes-rook.
        match self.to_uci(CastlingMode::Standard) {
            UciMove::Normal { to, .. } | UciMove::Put { to, .. } => to.to_string(),
            _ => String::new(),
        }
    }

    fn promotion_piece(&self) -> Option<char> {
        self.promotion().map(|role| role.char())
    }
}

impl RulesPosition for Chess {
    type Move = Move;

    fn engine_fen(&self) -> String {
        Fen::from_position(self.clone(), EnPassantMode::Legal).to_string()
    }

    fn candidate_moves(&self) -> Vec<Move> {
        shakmaty::Position::legal_moves(self).into_iter().collect()
    }
}
