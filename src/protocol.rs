//! JSON shapes exchanged with clients.
//!
//! Outbound payloads are encoded once per publish and shared between
//! listeners as [`Payload`].

use crate::games::tictactoe::{Game, Outcome};
use crate::{GameError, GameId, Identity, UserEntry};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Encoded message as queued for a listener.
pub type Payload = Arc<str>;

/// Encodes a message for delivery.
pub fn encode<T: Serialize>(message: &T) -> Result<Payload, serde_json::Error> {
    serde_json::to_string(message).map(Payload::from)
}

/// Wire form of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Registry position.
    pub id: GameId,
    /// First player.
    pub player1: Identity,
    /// Second player.
    pub player2: Identity,
    /// Player to move next.
    pub turn: Identity,
    /// `null` while in progress, the winner's id, or `"draw"`.
    #[serde(serialize_with = "serialize_outcome")]
    pub result: Outcome,
    /// Nine cells in row-major order, `null` when empty.
    pub board: Vec<Option<Identity>>,
}

impl GameView {
    /// Builds the wire form of a stored game.
    pub fn new(id: GameId, game: &Game) -> Self {
        Self {
            id,
            player1: game.player1().clone(),
            player2: game.player2().clone(),
            turn: game.turn().clone(),
            result: game.result(),
            board: game
                .board()
                .squares()
                .iter()
                .map(|square| square.occupant().cloned())
                .collect(),
        }
    }
}

// The "draw" sentinel exists only on the wire.
fn serialize_outcome<S: Serializer>(outcome: &Outcome, serializer: S) -> Result<S::Ok, S::Error> {
    match outcome {
        Outcome::InProgress => serializer.serialize_none(),
        Outcome::Won(player) => serializer.serialize_str(player.as_str()),
        Outcome::Draw => serializer.serialize_str("draw"),
    }
}

/// Broadcast after any game changes.
#[derive(Debug, Clone, Serialize)]
pub struct GamesUpdate {
    /// Every game in creation order.
    pub games: Vec<GameView>,
}

/// Broadcast after the user list changes.
#[derive(Debug, Clone, Serialize)]
pub struct UsersUpdate {
    /// Every known user.
    pub users: Vec<UserEntry>,
}

/// First message on a new listener.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialState {
    /// Identity of the connecting client.
    pub user_id: Identity,
    /// Every game in creation order.
    pub games: Vec<GameView>,
    /// Every known user.
    pub users: Vec<UserEntry>,
}

/// Reply to a successful game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreated {
    /// Id of the new game.
    pub game_id: GameId,
}

/// Rejection sent only to the requesting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    /// Error kind name.
    pub error: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl From<&GameError> for ErrorReply {
    fn from(err: &GameError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Body of `POST /api/games`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Identity to play against.
    pub opponent: Identity,
}

/// Body of `POST /api/games/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Cell to mark (0-8).
    pub location: usize,
}

/// Body of `POST /api/username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNameRequest {
    /// New display name; may be empty.
    pub name: String,
}

/// Action sent by a client over its WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Start a game against `opponent`.
    CreateGame {
        /// Identity to play against.
        opponent: Identity,
    },
    /// Mark a cell in a game.
    Move {
        /// Target game.
        #[serde(rename = "gameId")]
        game_id: GameId,
        /// Cell to mark (0-8).
        location: usize,
    },
    /// Change the sender's display name.
    SetName {
        /// New display name; may be empty.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_game_view_shape() {
        let (p1, p2) = (Identity::from("p1"), Identity::from("p2"));
        let mut game = Game::new(p1.clone(), p2).unwrap();
        game.make_move(&p1, 4).unwrap();
        let value = serde_json::to_value(GameView::new(GameId::from(3), &game)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "player1": "p1",
                "player2": "p2",
                "turn": "p2",
                "result": null,
                "board": [null, null, null, null, "p1", null, null, null, null],
            })
        );
    }

    #[test]
    fn test_draw_result_is_tagged_string() {
        let (a, b) = (Identity::from("a"), Identity::from("b"));
        let mut game = Game::new(a.clone(), b.clone()).unwrap();
        // a b a / a b b / b a a
        #[rustfmt::skip]
        let moves = [
            (&a, 0), (&b, 1), (&a, 2),
            (&b, 4), (&a, 3), (&b, 5),
            (&a, 7), (&b, 6), (&a, 8),
        ];
        for (player, loc) in moves {
            game.make_move(player, loc).unwrap();
        }
        let value = serde_json::to_value(GameView::new(GameId::from(0), &game)).unwrap();
        assert_eq!(value["result"], json!("draw"));
    }

    #[test]
    fn test_action_parsing() {
        let action: Action =
            serde_json::from_str(r#"{"action":"move","gameId":2,"location":7}"#).unwrap();
        assert_eq!(
            action,
            Action::Move {
                game_id: GameId::from(2),
                location: 7,
            }
        );
        let action: Action = serde_json::from_str(r#"{"action":"set_name","name":""}"#).unwrap();
        assert_eq!(action, Action::SetName { name: String::new() });
    }

    #[test]
    fn test_error_reply_from_game_error() {
        let reply = ErrorReply::from(&GameError::OutOfRange(12));
        assert_eq!(reply.error, "OutOfRange");
        assert!(reply.message.contains("12"));
    }
}
