//! Win detection logic for tic-tac-toe.

use super::super::{Board, Square};
use crate::Identity;
use tracing::instrument;

/// Winning lines, scanned in this order.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // Rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // Columns
    [0, 4, 8], [2, 4, 6],             // Diagonals
];

/// Checks if there is a winner on the board.
///
/// Returns the occupant of the first line (in [`LINES`] order) whose three
/// cells hold the same player, `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<&Identity> {
    let squares = board.squares();
    LINES.iter().find_map(move |&[a, b, c]| match &squares[a] {
        Square::Occupied(player) if squares[b] == squares[a] && squares[c] == squares[a] => {
            Some(player)
        }
        _ => None,
    })
}
