//! Shared lobby state and the action handlers that mutate it.

use crate::games::tictactoe::Game;
use crate::hub::{BroadcastHub, ListenerHandle};
use crate::protocol::{
    Action, GameCreated, GameView, GamesUpdate, InitialState, Payload, UsersUpdate, encode,
};
use crate::{GameError, GameId, GameRegistry, Identity, UserDirectory, UserEntry};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, instrument, warn};

/// Owned store for every game, user and listener in the process.
///
/// Mutations go through the registry and directory locks. Snapshot-and-publish
/// runs under `publish_order`, so the sequence of snapshots seen by any
/// listener never goes backwards in time.
#[derive(Debug, Default)]
pub struct Lobby {
    games: GameRegistry,
    users: UserDirectory,
    hub: BroadcastHub<Payload>,
    publish_order: Mutex<()>,
}

impl Lobby {
    /// Creates an empty lobby.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating lobby");
        Self::default()
    }

    /// Game registry.
    pub fn games(&self) -> &GameRegistry {
        &self.games
    }

    /// User directory.
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Broadcast hub.
    pub fn hub(&self) -> &BroadcastHub<Payload> {
        &self.hub
    }

    /// Records first contact with an identity.
    ///
    /// Broadcasts the user list only when the identity is new.
    #[instrument(skip(self))]
    pub fn touch_user(&self, identity: &Identity) -> bool {
        let is_new = self.users.upsert(identity);
        if is_new {
            self.publish_users();
        }
        is_new
    }

    /// Registers a listener for `identity`.
    ///
    /// The first queued message is the combined initial state; broadcasts
    /// follow in publish order.
    #[instrument(skip(self))]
    pub fn connect(&self, identity: &Identity) -> ListenerHandle<Payload> {
        self.touch_user(identity);

        let _order = self.publish_order.lock().unwrap_or_else(PoisonError::into_inner);
        let listener = self.hub.register();
        let initial = InitialState {
            user_id: identity.clone(),
            games: self.game_views(),
            users: self.users.snapshot(),
        };
        match encode(&initial) {
            Ok(payload) => listener.send_direct(payload),
            Err(e) => error!(error = %e, "Failed to encode initial state"),
        }
        info!(listener_id = %listener.id(), user = %identity, "Listener connected");
        listener
    }

    /// Starts a game between `actor` (moving first) and `opponent`.
    #[instrument(skip(self))]
    pub fn create_game(&self, actor: &Identity, opponent: &Identity) -> Result<GameId, GameError> {
        let game = Game::new(actor.clone(), opponent.clone())?;
        if !self.users.contains(opponent) {
            warn!(opponent = %opponent, "Game requested against unknown user");
            return Err(GameError::NotFound(format!("user {}", opponent)));
        }
        let id = self.games.append(game);
        info!(game_id = %id, player1 = %actor, player2 = %opponent, "Game created");
        self.publish_games();
        Ok(id)
    }

    /// Applies `actor`'s move to a game.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        actor: &Identity,
        game_id: GameId,
        location: usize,
    ) -> Result<(), GameError> {
        self.games
            .with_game_mut(game_id, |game| game.make_move(actor, location))
            .inspect_err(|e| warn!(error = %e, "Move rejected"))?;
        info!(game_id = %game_id, player = %actor, location, "Move accepted");
        self.publish_games();
        Ok(())
    }

    /// Sets `actor`'s display name.
    #[instrument(skip(self))]
    pub fn rename(&self, actor: &Identity, name: &str) -> Result<(), GameError> {
        self.users.rename(actor, name)?;
        self.publish_users();
        Ok(())
    }

    /// Dispatches a client action.
    ///
    /// Returns a reply for the requester when the action produces one.
    #[instrument(skip(self))]
    pub fn apply(
        &self,
        actor: &Identity,
        action: Action,
    ) -> Result<Option<GameCreated>, GameError> {
        match action {
            Action::CreateGame { opponent } => self
                .create_game(actor, &opponent)
                .map(|game_id| Some(GameCreated { game_id })),
            Action::Move { game_id, location } => {
                self.submit_move(actor, game_id, location).map(|()| None)
            }
            Action::SetName { name } => self.rename(actor, &name).map(|()| None),
        }
    }

    /// Every game in wire form, creation order.
    pub fn game_views(&self) -> Vec<GameView> {
        self.games
            .list()
            .iter()
            .map(|(id, game)| GameView::new(*id, game))
            .collect()
    }

    /// One game in wire form.
    pub fn game_view(&self, id: GameId) -> Result<GameView, GameError> {
        self.games.get(id).map(|game| GameView::new(id, &game))
    }

    /// Every known user.
    pub fn user_entries(&self) -> Vec<UserEntry> {
        self.users.snapshot()
    }

    fn publish_games(&self) {
        let _order = self.publish_order.lock().unwrap_or_else(PoisonError::into_inner);
        self.publish(&GamesUpdate {
            games: self.game_views(),
        });
    }

    fn publish_users(&self) {
        let _order = self.publish_order.lock().unwrap_or_else(PoisonError::into_inner);
        self.publish(&UsersUpdate {
            users: self.users.snapshot(),
        });
    }

    fn publish<T: Serialize>(&self, message: &T) {
        match encode(message) {
            Ok(payload) => {
                let delivered = self.hub.publish(payload);
                debug!(delivered, "Snapshot broadcast");
            }
            Err(e) => error!(error = %e, "Failed to encode broadcast"),
        }
    }
}
