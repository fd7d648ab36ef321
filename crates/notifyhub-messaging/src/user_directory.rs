//! User lookups answered by the SSO service over the broker.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use notifyhub_core::error::{AppError, ErrorKind};
use notifyhub_core::result::AppResult;
use notifyhub_core::traits::UserLookup;
use notifyhub_core::types::UserSummary;

use crate::envelope::{BrokerRequest, Envelope, UserIdPayload};
use crate::rpc::RpcClient;

/// [`UserLookup`] over request/reply to the user service queue.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    rpc: RpcClient,
    queue: String,
}

impl UserDirectory {
    /// Create a directory that asks `queue`.
    pub fn new(rpc: RpcClient, queue: impl Into<String>) -> Self {
        Self {
            rpc,
            queue: queue.into(),
        }
    }

    async fn call(&self, request: BrokerRequest) -> AppResult<Envelope> {
        let operation = request.message_type();
        let reply = self.rpc.send(&self.queue, request).await?;
        match reply.error_message() {
            Some(message) if !message.is_empty() => Err(AppError::external_service(format!(
                "[{operation}] {message}"
            ))),
            _ => Ok(reply),
        }
    }
}

#[async_trait]
impl UserLookup for UserDirectory {
    async fn find_user_by_id(&self, user_id: Uuid) -> AppResult<UserSummary> {
        let reply = self
            .call(BrokerRequest::FindUserById(UserIdPayload { user_id }))
            .await?;
        reply.decode_data::<UserSummary>().map_err(|e| {
            AppError::new(
                ErrorKind::Serialization,
                format!("Undecodable find_user_by_id reply: {}", e.message),
            )
        })
    }

    async fn get_user_me(&self, user_id: Uuid) -> AppResult<Map<String, Value>> {
        let reply = self
            .call(BrokerRequest::GetUserMe(UserIdPayload { user_id }))
            .await?;
        Ok(reply.message_data)
    }
}
