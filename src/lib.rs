//! Strictly Lobby - live multiplayer tic-tac-toe
//!
//! Players create matches against each other and every connected browser
//! sees each change as it happens.
//!
//! # Architecture
//!
//! - **Games**: pure tic-tac-toe state machine (move validation, turns, results)
//! - **Registry**: append-only list of every game, indexed by creation order
//! - **Users**: identity to display-name directory
//! - **Hub**: per-connection queues with snapshot fan-out
//! - **Lobby**: owned store tying the above together and publishing snapshots
//! - **Server**: axum routes and the `/listen` WebSocket
//!
//! # Example
//!
//! ```
//! use strictly_lobby::{Identity, Lobby};
//!
//! let lobby = Lobby::new();
//! let (alice, bob) = (Identity::from("alice"), Identity::from("bob"));
//! lobby.touch_user(&alice);
//! lobby.touch_user(&bob);
//!
//! let mut listener = lobby.connect(&alice);
//! let game = lobby.create_game(&alice, &bob).unwrap();
//! lobby.submit_move(&alice, game, 4).unwrap();
//!
//! // Initial state, then one broadcast per accepted action.
//! assert!(listener.try_recv().is_some());
//! assert!(listener.try_recv().is_some());
//! assert!(listener.try_recv().is_some());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod identity;
mod lobby;
mod registry;
mod session;
mod users;

// Public modules
pub mod games;
pub mod hub;
pub mod protocol;
pub mod server;

// Crate-level exports - Configuration
pub use config::{ConfigError, SESSION_SECRET_MIN_LEN, ServerConfig};

// Crate-level exports - Errors and identity
pub use error::GameError;
pub use identity::Identity;

// Crate-level exports - Shared state
pub use hub::{BroadcastHub, DirectSender, ListenerHandle, ListenerId};
pub use lobby::Lobby;
pub use registry::{GameId, GameRegistry};
pub use session::{DEFAULT_COOKIE_NAME, SessionGateway};
pub use users::{UserDirectory, UserEntry};

// Crate-level exports - Server
pub use server::{AppState, router, serve};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{Board, Game, Outcome, Square};
