//! The sync boundary: a trait describing the REST backend collaborator and
//! its wire-level record shapes.
//!
//! The core crates never touch networking; they consume already-fetched data
//! handed through this contract. Higher layers (the session, tests) depend on
//! the [`SyncGateway`] abstraction, not on a concrete transport.

mod rest;

pub use rest::RestGateway;

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bobmap_core::models::{
    Archetype, Category, FollowEdge, NotificationDraft, NotificationKind, TasteVector,
    UserProfile,
};
use bobmap_shared::errors::AppResult;

/// User record as the backend serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireUser {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub taste: BTreeMap<Category, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<Archetype>,
    pub created_at: DateTime<Utc>,
}

impl WireUser {
    /// Convert to the core profile, validating taste bounds on the way in.
    pub fn into_profile(self) -> AppResult<UserProfile> {
        Ok(UserProfile {
            id: self.id,
            username: self.username,
            taste: TasteVector::from_pairs(self.taste)?,
            primary_type: self.primary_type,
            created_at: self.created_at,
        })
    }
}

/// Notification record as the backend serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNotification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub actor_id: Uuid,
    pub target_user_id: Uuid,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl WireNotification {
    /// Convert to a feed draft, preserving the server timestamp and read
    /// state. The feed assigns its own local id; the wire id travels in the
    /// payload context only if the caller puts it there.
    pub fn into_draft(self) -> NotificationDraft {
        NotificationDraft {
            kind: self.kind,
            actor_id: self.actor_id,
            target_user_id: self.target_user_id,
            payload: self.payload,
            created_at: Some(self.created_at),
            read_at: self.read_at,
        }
    }
}

/// Contract with the BobMap REST backend.
///
/// All methods return `Send` futures so implementations work in
/// multi-threaded async runtimes.
pub trait SyncGateway: Send + Sync {
    fn fetch_user(&self, id: Uuid) -> impl Future<Output = AppResult<WireUser>> + Send;

    fn fetch_follow_edges(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AppResult<Vec<FollowEdge>>> + Send;

    fn persist_follow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> impl Future<Output = AppResult<()>> + Send;

    fn persist_unfollow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> impl Future<Output = AppResult<()>> + Send;

    fn fetch_notifications(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AppResult<Vec<WireNotification>>> + Send;
}
