use crate::AppState;
use crate::roster::RegistryError;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ConnectionId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {connection_id}");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.register(connection_id, tx);

    // The endpoint learns its server-assigned handle and the STUN/TURN set
    // before any presence traffic.
    state.signaling.send_to(
        connection_id,
        &ServerMessage::IceConfig {
            ice_servers: state.signaling.ice_servers(),
        },
    );
    state
        .signaling
        .send_to(connection_id, &ServerMessage::Welcome { id: connection_id });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            if dispatch(&state, connection_id, client_msg).await.is_none() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid client message from {connection_id}: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Unregister first so relays toward this endpoint drop immediately,
    // then cascade the leave to the roster.
    state.signaling.unregister(&connection_id);
    state.roster.leave(connection_id).await;
    info!("WebSocket disconnected: {connection_id}");
}

/// Route one inbound frame. `None` ends the connection.
async fn dispatch(state: &AppState, id: ConnectionId, msg: ClientMessage) -> Option<()> {
    match msg {
        ClientMessage::ValidateName { name } => {
            let is_valid = state.roster.validate_name(name).await;
            state
                .signaling
                .send_to(id, &ServerMessage::NameValidation { is_valid });
        }

        ClientMessage::Join {
            name,
            audio_enabled,
        } => match state.roster.join(id, name, audio_enabled).await {
            Ok(roster) => {
                state
                    .signaling
                    .send_to(id, &ServerMessage::Joined { roster });
            }
            Err(err @ RegistryError::NameTaken(_)) => {
                state.signaling.send_to(
                    id,
                    &ServerMessage::JoinError {
                        message: err.to_string(),
                    },
                );
            }
            Err(RegistryError::Closed) => return None,
        },

        ClientMessage::AudioToggle { audio_enabled } => {
            state.roster.set_audio(id, audio_enabled).await;
        }

        msg @ (ClientMessage::Offer { .. }
        | ClientMessage::Answer { .. }
        | ClientMessage::IceCandidate { .. }) => {
            state.signaling.relay(id, msg);
        }

        ClientMessage::Leave => return None,
    }

    Some(())
}
