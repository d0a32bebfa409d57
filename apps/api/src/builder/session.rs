//! Session persistence: conversations under `session:<id>`, finalized records
//! under `portfolio:<id>` for the portfolio view. Actions on one session are
//! serialized by a lock under `lock:session:<id>`.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::builder::conversation::Conversation;
use crate::errors::AppError;
use crate::kv::{KeyValueStore, StoreError};
use crate::models::record::ResumeRecord;

const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const PORTFOLIO_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

fn session_key(id: Uuid) -> String {
    format!("session:{id}")
}

fn portfolio_key(id: Uuid) -> String {
    format!("portfolio:{id}")
}

fn lock_key(id: Uuid) -> String {
    format!("lock:session:{id}")
}

/// Exclusive hold on one session for the length of a load-mutate-save action.
/// The lock expires after its TTL if the holder never releases it.
pub struct SessionLock<'a> {
    store: &'a dyn KeyValueStore,
    key: String,
    token: String,
}

impl<'a> SessionLock<'a> {
    /// Fails with `Conflict` while another action holds the session.
    pub async fn acquire(store: &'a dyn KeyValueStore, id: Uuid, ttl: Duration) -> Result<Self, AppError> {
        let key = lock_key(id);
        let token = Uuid::new_v4().to_string();
        if !store.set_if_absent(&key, token.clone(), ttl).await? {
            return Err(AppError::Conflict(format!(
                "Session {id} is busy with another request; try again shortly"
            )));
        }
        Ok(Self { store, key, token })
    }

    pub async fn release(self) {
        if let Err(e) = self.store.remove_if_equal(&self.key, &self.token).await {
            warn!("Could not release {}: {e}", self.key);
        }
    }
}

pub async fn load_conversation(store: &dyn KeyValueStore, id: Uuid) -> Result<Conversation, AppError> {
    load(store, &session_key(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// Saves the conversation and, once it holds a finalized record, hands the record
/// to the portfolio view.
pub async fn save_conversation(store: &dyn KeyValueStore, conversation: &Conversation) -> Result<(), AppError> {
    save(store, &session_key(conversation.id), conversation, SESSION_TTL).await?;
    if let Some(record) = &conversation.record {
        save(store, &portfolio_key(conversation.id), record, PORTFOLIO_TTL).await?;
    }
    Ok(())
}

pub async fn load_portfolio(store: &dyn KeyValueStore, id: Uuid) -> Result<ResumeRecord, AppError> {
    load(store, &portfolio_key(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {id} not found")))
}

async fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

async fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(StoreError::Encode)?;
    store.set(key, raw, ttl).await
}
