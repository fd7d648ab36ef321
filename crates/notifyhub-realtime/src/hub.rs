//! Fan-out hub for live notification events.
//!
//! A single task owns the set of connected clients. Everything else talks
//! to it through a [`HubHandle`], whose operations enqueue a command and
//! return immediately.

use std::collections::HashMap;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::client::{Client, ClientId};
use crate::message::NotificationEvent;

/// Commands processed by the hub loop.
#[derive(Debug)]
enum HubCommand {
    Register(Client),
    Unregister(ClientId),
    Broadcast(NotificationEvent),
    ClientCount(oneshot::Sender<usize>),
}

/// Cloneable, non-blocking interface to the hub loop.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Add a client to the live set. Returns its id.
    pub fn register(&self, client: Client) -> ClientId {
        let id = client.id;
        self.submit(HubCommand::Register(client));
        id
    }

    /// Remove a client and close its queue. Unknown ids are ignored.
    pub fn unregister(&self, client_id: ClientId) {
        self.submit(HubCommand::Unregister(client_id));
    }

    /// Deliver an event to every matching client.
    pub fn broadcast(&self, event: NotificationEvent) {
        self.submit(HubCommand::Broadcast(event));
    }

    /// Number of live clients. Zero once the hub has stopped.
    pub async fn client_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        self.submit(HubCommand::ClientCount(tx));
        rx.await.unwrap_or(0)
    }

    fn submit(&self, command: HubCommand) {
        if self.commands.send(command).is_err() {
            debug!("Hub is not running, command dropped");
        }
    }
}

/// The hub control loop and the clients it owns.
#[derive(Debug)]
pub struct Hub {
    clients: HashMap<ClientId, Client>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
}

impl Hub {
    /// Create a hub and its handle.
    pub fn new() -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                clients: HashMap::new(),
                commands: rx,
            },
            HubHandle { commands: tx },
        )
    }

    /// Process commands until shutdown is signalled or every handle is gone.
    /// All clients are dropped on exit, closing their queues.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        info!("Notification hub started");
        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Notification hub received shutdown signal");
                        break;
                    }
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
            }
        }

        let remaining = self.clients.len();
        self.clients.clear();
        info!(closed_clients = remaining, "Notification hub stopped");
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(client) => {
                debug!(
                    client_id = %client.id,
                    user_id = %client.user_id,
                    app_type = ?client.app_type,
                    "Client registered"
                );
                self.clients.insert(client.id, client);
            }
            HubCommand::Unregister(client_id) => {
                if self.clients.remove(&client_id).is_some() {
                    debug!(client_id = %client_id, "Client unregistered");
                }
            }
            HubCommand::Broadcast(event) => self.broadcast(event),
            HubCommand::ClientCount(reply) => {
                let _ = reply.send(self.clients.len());
            }
        }
    }

    fn broadcast(&mut self, event: NotificationEvent) {
        let mut evicted = Vec::new();
        let mut delivered = 0usize;

        for client in self.clients.values().filter(|c| c.matches(&event)) {
            match client.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        client_id = %client.id,
                        user_id = %client.user_id,
                        "Client queue full, evicting"
                    );
                    evicted.push(client.id);
                }
                Err(TrySendError::Closed(_)) => evicted.push(client.id),
            }
        }

        for client_id in evicted {
            self.clients.remove(&client_id);
        }

        debug!(
            notification_id = %event.id,
            user_id = %event.user_id,
            application = %event.application,
            delivered,
            "Notification broadcast"
        );
    }
}
