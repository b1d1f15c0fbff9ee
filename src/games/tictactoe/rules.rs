//! Game logic and rules for tic-tac-toe.

mod draw;
mod win;

pub use draw::is_full;
pub use win::{LINES, check_winner};

use super::types::{Board, CELLS, Outcome};
use crate::{GameError, Identity};
use derive_getters::Getters;
use tracing::{debug, instrument, warn};

/// One match between two players.
///
/// The game's id is its position in the [`GameRegistry`](crate::GameRegistry)
/// and is assigned when the game is appended there.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Game {
    /// First player; moves first.
    player1: Identity,
    /// Second player.
    player2: Identity,
    /// Player expected to move next.
    turn: Identity,
    /// Current marks.
    board: Board,
}

impl Game {
    /// Creates a new game between two distinct players.
    #[instrument]
    pub fn new(player1: Identity, player2: Identity) -> Result<Self, GameError> {
        if player1 == player2 {
            warn!(player = %player1, "Rejected self-play game");
            return Err(GameError::InvalidArgument(
                "cannot start a game against yourself".to_string(),
            ));
        }
        Ok(Self {
            turn: player1.clone(),
            player1,
            player2,
            board: Board::new(),
        })
    }

    /// Derives the game result from the board.
    pub fn result(&self) -> Outcome {
        self.board.outcome()
    }

    /// Checks whether the identity is one of the two players.
    pub fn has_player(&self, player: &Identity) -> bool {
        &self.player1 == player || &self.player2 == player
    }

    /// Places `player`'s mark at `location` (0-8).
    ///
    /// Checks run in a fixed order: game over, turn, range, occupancy.
    /// Nothing changes unless every check passes.
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn make_move(&mut self, player: &Identity, location: usize) -> Result<(), GameError> {
        if self.result().is_over() {
            return Err(GameError::GameOver);
        }

        if player != &self.turn {
            return Err(GameError::OutOfTurn(player.clone()));
        }

        if location >= CELLS {
            return Err(GameError::OutOfRange(location));
        }

        if !self.board.is_empty(location) {
            return Err(GameError::CellOccupied(location));
        }

        self.board.place(location, player.clone());
        self.turn = self.other_player(player).clone();

        debug!(board = %self.board.display(), result = ?self.result(), "Move applied");
        Ok(())
    }

    fn other_player(&self, player: &Identity) -> &Identity {
        if player == &self.player1 {
            &self.player2
        } else {
            &self.player1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> (Identity, Identity) {
        (Identity::from("p1"), Identity::from("p2"))
    }

    #[test]
    fn test_new_game_starts_with_player1() {
        let (p1, p2) = players();
        let game = Game::new(p1.clone(), p2).unwrap();
        assert_eq!(game.turn(), &p1);
        assert_eq!(game.result(), Outcome::InProgress);
        assert_eq!(game.board().empty_cells().len(), 9);
    }

    #[test]
    fn test_turn_flips_after_move() {
        let (p1, p2) = players();
        let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
        game.make_move(&p1, 4).unwrap();
        assert_eq!(game.turn(), &p2);
        game.make_move(&p2, 0).unwrap();
        assert_eq!(game.turn(), &p1);
    }

    #[test]
    fn test_game_over_checked_before_turn() {
        let (p1, p2) = players();
        let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
        for (player, loc) in [(&p1, 0), (&p2, 3), (&p1, 1), (&p2, 4), (&p1, 2)] {
            game.make_move(player, loc).unwrap();
        }
        // p1 won; p1 is also out of turn, and 9 is out of range.
        assert_eq!(game.make_move(&p1, 9), Err(GameError::GameOver));
    }

    #[test]
    fn test_turn_checked_before_range() {
        let (p1, p2) = players();
        let mut game = Game::new(p1, p2.clone()).unwrap();
        assert_eq!(
            game.make_move(&p2, 42),
            Err(GameError::OutOfTurn(p2.clone()))
        );
    }

    #[test]
    fn test_non_player_is_out_of_turn() {
        let (p1, p2) = players();
        let mut game = Game::new(p1, p2).unwrap();
        let stranger = Identity::from("stranger");
        assert!(!game.has_player(&stranger));
        assert_eq!(
            game.make_move(&stranger, 0),
            Err(GameError::OutOfTurn(stranger.clone()))
        );
    }
}
