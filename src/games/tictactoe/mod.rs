//! Tic-tac-toe state machine: board, turn alternation, win/draw detection.

mod rules;
mod types;

pub use rules::{Game, LINES, check_winner, is_full};
pub use types::{Board, CELLS, Outcome, Square};
