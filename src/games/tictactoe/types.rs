//! Core domain types for tic-tac-toe.

use super::rules::{check_winner, is_full};
use crate::Identity;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell marked by a player.
    Occupied(Identity),
}

impl Square {
    /// Returns the occupant, if any.
    pub fn occupant(&self) -> Option<&Identity> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; CELLS],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit squares.
    pub fn from_squares(squares: [Square; CELLS]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given location (0-8).
    pub fn get(&self, location: usize) -> Option<&Square> {
        self.squares.get(location)
    }

    /// Checks if a location is on the board and empty.
    pub fn is_empty(&self, location: usize) -> bool {
        matches!(self.get(location), Some(Square::Empty))
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; CELLS] {
        &self.squares
    }

    /// Locations that can still be played.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELLS).filter(|&loc| self.is_empty(loc)).collect()
    }

    /// Computes the outcome from the marks on the board.
    #[instrument(skip(self))]
    pub fn outcome(&self) -> Outcome {
        if let Some(winner) = check_winner(self) {
            Outcome::Won(winner.clone())
        } else if is_full(self) {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    /// Marks a location. Callers validate first.
    pub(super) fn place(&mut self, location: usize, player: Identity) {
        self.squares[location] = Square::Occupied(player);
    }

    /// Formats the board as a human-readable string.
    ///
    /// Occupied cells show the first character of the occupant's token.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match &self.squares[pos] {
                    Square::Empty => (pos + 1).to_string(),
                    Square::Occupied(player) => player
                        .as_str()
                        .chars()
                        .next()
                        .map(String::from)
                        .unwrap_or_else(|| "?".to_string()),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

/// Result of a game, derived from the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Game is ongoing.
    InProgress,
    /// A player completed a line.
    Won(Identity),
    /// Board is full with no line.
    Draw,
}

impl Outcome {
    /// Returns true once the game has a result.
    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<&Identity> {
        match self {
            Outcome::Won(player) => Some(player),
            _ => None,
        }
    }
}
