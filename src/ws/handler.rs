//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{ArenaHandle, Frame, PlayerId};
use crate::ws::protocol::ClientMsg;

/// Frames buffered per session before the arena starts dropping them
const OUTBOUND_CAPACITY: usize = 256;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.arena))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, arena: ArenaHandle) {
    let (ws_sink, ws_stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel::<Frame>(OUTBOUND_CAPACITY);

    let player_id = match arena.join(outbound_tx).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Failed to join arena");
            return;
        }
    };

    info!(player_id = %player_id, "Client connected");

    run_session(&player_id, &arena, ws_sink, ws_stream, outbound_rx).await;

    // Cleanup on disconnect
    if let Err(e) = arena.leave(player_id.clone()).await {
        debug!(player_id = %player_id, error = %e, "Arena gone during leave");
    }

    info!(player_id = %player_id, "Client disconnected");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: &PlayerId,
    arena: &ArenaHandle,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::Receiver<Frame>,
) {
    // Spawn writer task: delayed arena frames -> WebSocket
    let writer_player_id = player_id.clone();
    let writer_handle = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(frame.to_string())).await {
                debug!(player_id = %writer_player_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> arena
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match ClientMsg::parse(&text) {
                Ok(msg) => {
                    if arena.submit(player_id.clone(), msg).await.is_err() {
                        debug!(player_id = %player_id, "Arena closed");
                        break;
                    }
                }
                Err(e) => {
                    warn!(player_id = %player_id, error = %e, "Dropping invalid client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                debug!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                debug!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}
