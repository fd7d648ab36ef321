//! Per-connection pumps.
//!
//! A session registers its client with the hub first, then runs two
//! independent halves: the read pump only watches for the peer going away,
//! the write pump drains the outbound queue into the socket. The session
//! ends as soon as either half does.

use std::fmt::Display;

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::{Client, ClientId};
use crate::hub::HubHandle;
use crate::message::NotificationEvent;

/// Serve one upgraded WebSocket until either side closes.
pub async fn serve(
    socket: WebSocket,
    hub: HubHandle,
    user_id: Uuid,
    app_type: Option<String>,
    buffer: usize,
) {
    let (client, queue) = Client::new(user_id, app_type, buffer);
    let client_id = hub.register(client);
    info!(client_id = %client_id, user_id = %user_id, "WebSocket connection established");

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_pump(sink, client_id, queue, hub.clone()));

    // Whichever half finishes first ends the session. Once the write pump
    // has sent its close frame the read half is dropped with it, which hangs
    // up on a peer that never answers the close.
    let finished_writer = tokio::select! {
        _ = read_pump(stream, client_id, hub.clone()) => None,
        written = &mut writer => Some(written),
    };
    let written = match finished_writer {
        Some(written) => {
            hub.unregister(client_id);
            written
        }
        None => writer.await,
    };
    if let Err(e) = written {
        error!(client_id = %client_id, error = %e, "Write pump panicked");
    }
    info!(client_id = %client_id, user_id = %user_id, "WebSocket connection closed");
}

/// Wait for the peer to close or the connection to fail, then unregister.
///
/// Inbound application data is ignored.
pub async fn read_pump<R, E>(mut stream: R, client_id: ClientId, hub: HubHandle)
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }
    hub.unregister(client_id);
}

/// Write each queued event as one JSON text frame.
///
/// Ends with a close frame once the hub closes the queue. A failed write
/// unregisters the client.
pub async fn write_pump<S>(
    mut sink: S,
    client_id: ClientId,
    mut queue: mpsc::Receiver<NotificationEvent>,
    hub: HubHandle,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(event) = queue.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                error!(client_id = %client_id, error = %e, "Failed to serialize event");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(text.into())).await {
            warn!(client_id = %client_id, error = %e, "WebSocket write failed");
            hub.unregister(client_id);
            return;
        }
    }

    let _ = sink.send(Message::Close(None)).await;
    let _ = sink.close().await;
}
