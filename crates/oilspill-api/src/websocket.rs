use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tracing::{info, warn};
use uuid::Uuid;

use crate::SimulationRegistry;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<Uuid>,
    State(registry): State<SimulationRegistry>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, id, registry))
}

async fn handle_socket(mut socket: WebSocket, id: Uuid, registry: SimulationRegistry) {
    let Some(handle) = registry.get(id).await else {
        let _ = socket
            .send(Message::Text(format!(r#"{{"type":"error","message":"simulation {id} not found"}}"#)))
            .await;
        return;
    };

    let mut rx = handle.subscribe();
    info!(simulation_id = %id, "websocket client connected");

    loop {
        tokio::select! {
            update = rx.recv() => {
                match update {
                    Ok(tick) => {
                        let json = match serde_json::to_string(&tick) {
                            Ok(s) => s,
                            Err(e) => {
                                warn!(simulation_id = %id, error = %e, "failed to serialize tick update");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(simulation_id = %id, missed = n, "websocket client lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    info!(simulation_id = %id, "websocket client disconnected");
}

pub fn create_router() -> Router<SimulationRegistry> {
    Router::new().route("/simulations/{id}", get(ws_handler))
}
