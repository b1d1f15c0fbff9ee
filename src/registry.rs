//! Append-only registry of every game created in this process.

use crate::games::tictactoe::Game;
use crate::GameError;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument};

/// Position of a game in the registry.
///
/// Ids are handed out in creation order and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct GameId(usize);

impl GameId {
    /// Returns the registry index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered collection of games indexed by creation order.
///
/// Appends serialize on the outer lock. Each game has its own mutex, so
/// moves on different games never contend with each other.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: RwLock<Vec<Arc<Mutex<Game>>>>,
}

impl GameRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a game and returns its id.
    #[instrument(skip(self, game), fields(player1 = %game.player1(), player2 = %game.player2()))]
    pub fn append(&self, game: Game) -> GameId {
        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        let id = GameId(games.len());
        games.push(Arc::new(Mutex::new(game)));
        info!(game_id = %id, total = games.len(), "Game registered");
        id
    }

    /// Returns a point-in-time copy of one game.
    #[instrument(skip(self))]
    pub fn get(&self, id: GameId) -> Result<Game, GameError> {
        let slot = self.slot(id)?;
        let game = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(game.clone())
    }

    /// Runs `f` against the stored game while holding that game's lock.
    ///
    /// The game is mutated in place; later reads see the change.
    #[instrument(skip(self, f))]
    pub fn with_game_mut<R>(
        &self,
        id: GameId,
        f: impl FnOnce(&mut Game) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        let slot = self.slot(id)?;
        let mut game = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut game)
    }

    /// Returns every game in creation order.
    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<(GameId, Game)> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        let snapshot: Vec<_> = games
            .iter()
            .enumerate()
            .map(|(idx, slot)| {
                let game = slot.lock().unwrap_or_else(PoisonError::into_inner);
                (GameId(idx), game.clone())
            })
            .collect();
        debug!(count = snapshot.len(), "Listed games");
        snapshot
    }

    /// Number of games ever created.
    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no game has been created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: GameId) -> Result<Arc<Mutex<Game>>, GameError> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        games
            .get(id.index())
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("game {}", id)))
    }
}
