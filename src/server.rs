//! HTTP and WebSocket adapter over the [`Lobby`].

use crate::hub::DirectSender;
use crate::protocol::{
    Action, CreateGameRequest, ErrorReply, GameCreated, GameView, MoveRequest, Payload,
    SetNameRequest, encode,
};
use crate::{GameError, GameId, Identity, Lobby, ServerConfig, SessionGateway, UserEntry};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRef, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    lobby: Arc<Lobby>,
    gateway: SessionGateway,
}

impl AppState {
    /// Bundles a lobby with the gateway that identifies its clients.
    pub fn new(lobby: Arc<Lobby>, gateway: SessionGateway) -> Self {
        Self { lobby, gateway }
    }

    /// The shared lobby.
    pub fn lobby(&self) -> &Arc<Lobby> {
        &self.lobby
    }

    /// Resolves the caller and records first contact.
    fn identify(&self, jar: SignedCookieJar) -> (SignedCookieJar, Identity) {
        let (jar, identity) = self.gateway.resolve(jar);
        self.lobby.touch_user(&identity);
        (jar, identity)
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.key().clone()
    }
}

/// A rejected request, rendered as an [`ErrorReply`].
#[derive(Debug, derive_more::Display, derive_more::From)]
pub struct ApiError(GameError);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(GameError::InvalidArgument(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(GameError::InvalidArgument(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::InvalidArgument(_) | GameError::OutOfRange(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::GameOver | GameError::OutOfTurn(_) | GameError::CellOccupied(_) => {
                StatusCode::CONFLICT
            }
        };
        (status, Json(ErrorReply::from(&self.0))).into_response()
    }
}

type ApiResult<T> = (SignedCookieJar, Result<Json<T>, ApiError>);

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/listen", get(listen))
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/{id}", get(get_game).post(submit_move))
        .route("/api/users", get(list_users))
        .route("/api/username", post(set_username))
        .layer(ServiceBuilder::new().map_request(|req: Request| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

/// Binds the configured address and serves the lobby until the process exits.
#[instrument(skip(config), fields(addr = %config.bind_addr()))]
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let gateway = SessionGateway::new(config.cookie_name().clone(), config.session_key()?);
    let state = AppState::new(Arc::new(Lobby::new()), gateway);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "Lobby ready");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_games(State(state): State<AppState>) -> Json<Vec<GameView>> {
    Json(state.lobby.game_views())
}

async fn get_game(
    State(state): State<AppState>,
    id: Result<Path<usize>, PathRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.lobby.game_view(GameId::from(id))?))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<UserEntry>> {
    Json(state.lobby.user_entries())
}

async fn create_game(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> ApiResult<GameCreated> {
    let (jar, actor) = state.identify(jar);
    let result = payload.map_err(ApiError::from).and_then(|Json(req)| {
        let game_id = state.lobby.create_game(&actor, &req.opponent)?;
        Ok(Json(GameCreated { game_id }))
    });
    (jar, result)
}

async fn submit_move(
    State(state): State<AppState>,
    id: Result<Path<usize>, PathRejection>,
    jar: SignedCookieJar,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<GameView> {
    let (jar, actor) = state.identify(jar);
    let result = id.map_err(ApiError::from).and_then(|Path(id)| {
        let game_id = GameId::from(id);
        let Json(req) = payload?;
        state.lobby.submit_move(&actor, game_id, req.location)?;
        Ok(Json(state.lobby.game_view(game_id)?))
    });
    (jar, result)
}

async fn set_username(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<SetNameRequest>, JsonRejection>,
) -> ApiResult<UserEntry> {
    let (jar, actor) = state.identify(jar);
    let result = payload.map_err(ApiError::from).and_then(|Json(req)| {
        state.lobby.rename(&actor, &req.name)?;
        Ok(Json(UserEntry::new(actor.clone(), req.name)))
    });
    (jar, result)
}

async fn listen(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let (jar, identity) = state.gateway.resolve(jar);
    let lobby = Arc::clone(&state.lobby);
    (
        jar,
        ws.on_upgrade(move |socket| handle_socket(socket, lobby, identity)),
    )
}

/// Runs one listening connection until either direction ends.
///
/// The outbound half owns the listener handle, so it is released as soon
/// as that half finishes or is aborted.
#[instrument(skip(socket, lobby, identity), fields(user = %identity))]
async fn handle_socket(socket: WebSocket, lobby: Arc<Lobby>, identity: Identity) {
    let mut listener = lobby.connect(&identity);
    let listener_id = listener.id();
    let replies = listener.direct_sender();
    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = listener.recv().await {
            if let Err(e) = sink.send(Message::Text(payload.to_string().into())).await {
                debug!(error = %e, "Client stopped accepting messages");
                break;
            }
        }
    });

    let inbound_lobby = Arc::clone(&lobby);
    let actor = identity.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    handle_frame(&inbound_lobby, &actor, &replies, text.as_str())
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket receive failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
    }

    info!(listener_id = %listener_id, "Connection closed");
}

/// Applies one inbound action and queues any reply for the sender only.
fn handle_frame(lobby: &Lobby, actor: &Identity, replies: &DirectSender<Payload>, text: &str) {
    let outcome = serde_json::from_str::<Action>(text)
        .map_err(|e| GameError::InvalidArgument(format!("malformed action: {}", e)))
        .and_then(|action| lobby.apply(actor, action));

    let reply = match outcome {
        Ok(Some(created)) => encode(&created),
        Ok(None) => return,
        Err(err) => {
            warn!(error = %err, "Action rejected");
            encode(&ErrorReply::from(&err))
        }
    };

    match reply {
        Ok(payload) => replies.send(payload),
        Err(e) => error!(error = %e, "Failed to encode reply"),
    }
}
