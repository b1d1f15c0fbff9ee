//! Draw detection logic for tic-tac-toe.

use super::super::Board;
use tracing::instrument;

/// True once every cell carries a mark.
///
/// Only a draw when [`check_winner`](super::check_winner) found no line.
#[instrument(skip(board), ret(level = "trace"))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|square| square.occupant().is_some())
}

#[cfg(test)]
mod tests {
    use super::super::super::{Outcome, Square};
    use super::*;
    use crate::Identity;

    fn board_of(layout: &str) -> Board {
        let mut squares: [Square; 9] = Default::default();
        for (loc, c) in layout.chars().enumerate() {
            if c != '.' {
                squares[loc] = Square::Occupied(Identity::from(c.to_string()));
            }
        }
        Board::from_squares(squares)
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        assert!(!is_full(&board_of("....x....")));
    }

    #[test]
    fn test_draw_detection() {
        // x o x / o x x / o x o
        let board = board_of("xoxoxxoxo");
        assert!(is_full(&board));
        assert_eq!(board.outcome(), Outcome::Draw);
    }

    #[test]
    fn test_not_draw_if_winner() {
        // Full board whose last mark completes a line.
        let board = board_of("xoxoxooxx");
        assert!(is_full(&board));
        assert_eq!(board.outcome(), Outcome::Won(Identity::from("x")));
    }
}
