//! A connected WebSocket endpoint as tracked by the hub.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::message::NotificationEvent;

/// Unique client identifier.
pub type ClientId = Uuid;

/// One connected session.
///
/// The hub owns the `Client` and with it the only sender of the outbound
/// queue; dropping the `Client` closes the queue and ends the write pump.
#[derive(Debug)]
pub struct Client {
    /// Unique client ID.
    pub id: ClientId,
    /// User the session belongs to.
    pub user_id: Uuid,
    /// Application the session is scoped to, if any.
    pub app_type: Option<String>,
    /// Sender side of the bounded outbound queue.
    sender: mpsc::Sender<NotificationEvent>,
}

impl Client {
    /// Create a client and the receiving end of its outbound queue.
    pub fn new(
        user_id: Uuid,
        app_type: Option<String>,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            Self {
                id: Uuid::new_v4(),
                user_id,
                app_type: app_type.filter(|a| !a.is_empty()),
                sender,
            },
            receiver,
        )
    }

    /// Whether this client should receive `event`.
    ///
    /// The user must match. An event without an application reaches every
    /// session of the user; otherwise the session's app type must match.
    pub fn matches(&self, event: &NotificationEvent) -> bool {
        self.user_id == event.user_id
            && (event.application.is_empty()
                || self.app_type.as_deref() == Some(event.application.as_str()))
    }

    /// Enqueue without waiting.
    pub(crate) fn try_send(
        &self,
        event: NotificationEvent,
    ) -> Result<(), mpsc::error::TrySendError<NotificationEvent>> {
        self.sender.try_send(event)
    }
}
