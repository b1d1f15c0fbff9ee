//! Request-local error kinds for lobby actions.

use crate::Identity;
use strum::IntoStaticStr;

/// Error returned when an action is rejected.
///
/// Every variant aborts only the offending action and leaves shared
/// state untouched. The variant name doubles as the wire `error` kind.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, IntoStaticStr)]
pub enum GameError {
    /// An argument was structurally valid but semantically rejected.
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),

    /// A game id or identity does not exist.
    #[display("Not found: {}", _0)]
    NotFound(String),

    /// The game already has a result.
    #[display("Game is already over")]
    GameOver,

    /// The acting player is not the one whose turn it is.
    #[display("It's not {}'s turn", _0)]
    OutOfTurn(Identity),

    /// The location is outside `0..9`.
    #[display("Location {} is out of range (must be 0-8)", _0)]
    OutOfRange(usize),

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(usize),
}

impl GameError {
    /// Returns the error kind name sent to clients.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl std::error::Error for GameError {}
