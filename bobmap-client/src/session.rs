//! One acting user's client session: core state plus gateway sync.
//!
//! Mutations apply to the in-memory graph synchronously (optimistic, in call
//! order), then persist through the gateway. A rejected persist is
//! compensated through the inverse graph operation and reported in the
//! returned [`SyncOutcome`]; the feed log is append-only and keeps its
//! history either way.

use std::collections::BTreeSet;

use uuid::Uuid;

use bobmap_core::feed::{FeedFilter, NotificationFeed};
use bobmap_core::graph::SocialGraphStore;
use bobmap_core::matching::MatchCache;
use bobmap_core::models::{NotificationDraft, NotificationEvent, NotificationKind, RankedMatch};
use bobmap_core::profile::{evaluate, Answer, ProfileScore};
use bobmap_shared::errors::{AppError, AppResult, ErrorCode};

use crate::gateway::SyncGateway;

/// What happened to an optimistic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The local mutation changed state (false for idempotent no-ops).
    pub applied: bool,
    /// The backend acknowledged the mutation.
    pub synced: bool,
    /// The local mutation was compensated after a backend rejection.
    pub reverted: bool,
    /// Rejection message, when the backend refused.
    pub rejection: Option<String>,
}

impl SyncOutcome {
    fn noop() -> Self {
        Self { applied: false, synced: false, reverted: false, rejection: None }
    }

    fn synced() -> Self {
        Self { applied: true, synced: true, reverted: false, rejection: None }
    }

    fn reverted(err: &AppError) -> Self {
        Self {
            applied: true,
            synced: false,
            reverted: true,
            rejection: Some(err.to_string()),
        }
    }
}

pub struct Session<G: SyncGateway> {
    gateway: G,
    acting_user: Uuid,
    graph: SocialGraphStore,
    feed: NotificationFeed,
    matches: MatchCache,
}

impl<G: SyncGateway> Session<G> {
    pub fn new(gateway: G, acting_user: Uuid) -> Self {
        Self {
            gateway,
            acting_user,
            graph: SocialGraphStore::new(),
            feed: NotificationFeed::new(),
            matches: MatchCache::new(),
        }
    }

    pub fn acting_user(&self) -> Uuid {
        self.acting_user
    }

    pub fn graph(&self) -> &SocialGraphStore {
        &self.graph
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    /// Load the acting user, the peers their edges reference, the edges
    /// themselves, and the notification backlog into core state.
    pub async fn hydrate(&mut self) -> AppResult<()> {
        let me = self.gateway.fetch_user(self.acting_user).await?.into_profile()?;
        self.graph.upsert_user(me);

        let edges = self.gateway.fetch_follow_edges(self.acting_user).await?;
        let mut peer_ids = BTreeSet::new();
        for edge in &edges {
            peer_ids.insert(edge.follower_id);
            peer_ids.insert(edge.followee_id);
        }
        peer_ids.remove(&self.acting_user);
        for id in peer_ids {
            let peer = self.gateway.fetch_user(id).await?.into_profile()?;
            self.graph.upsert_user(peer);
        }
        for edge in edges {
            self.graph.restore_edge(edge)?;
        }

        let backlog = self.gateway.fetch_notifications(self.acting_user).await?;
        let restored = backlog.len();
        for wire in backlog {
            // One tick per restored event: a backlog legitimately containing
            // identical entries must not trip the double-submission guard.
            self.feed.next_tick();
            self.feed.append(wire.into_draft())?;
        }
        self.feed.next_tick();

        tracing::info!(
            user_id = %self.acting_user,
            users = self.graph.user_count(),
            notifications = restored,
            "session hydrated"
        );
        Ok(())
    }

    /// Fetch a single peer (e.g. a browsed profile) into the graph.
    pub async fn fetch_peer(&mut self, id: Uuid) -> AppResult<()> {
        let peer = self.gateway.fetch_user(id).await?.into_profile()?;
        self.graph.upsert_user(peer);
        Ok(())
    }

    /// Optimistically follow `target` and persist the edge.
    pub async fn follow(&mut self, target: Uuid) -> AppResult<SyncOutcome> {
        if self.graph.follow(self.acting_user, target)?.is_none() {
            // Already following; nothing to persist.
            return Ok(SyncOutcome::noop());
        }

        let draft = NotificationDraft::new(NotificationKind::Follow, self.acting_user, target);
        match self.feed.append(draft) {
            Ok(_) => {}
            Err(err) if err.is_code(ErrorCode::DuplicateEvent) => {
                tracing::debug!(target = %target, "follow event suppressed by duplicate guard");
            }
            Err(err) => return Err(err),
        }

        match self.gateway.persist_follow(self.acting_user, target).await {
            Ok(()) => Ok(SyncOutcome::synced()),
            Err(err) => {
                tracing::warn!(error = %err, target = %target, "follow rejected upstream, compensating");
                self.graph.unfollow(self.acting_user, target)?;
                Ok(SyncOutcome::reverted(&err))
            }
        }
    }

    /// Optimistically unfollow `target` and persist the removal.
    pub async fn unfollow(&mut self, target: Uuid) -> AppResult<SyncOutcome> {
        let prior = self.graph.edge(self.acting_user, target).cloned();
        if !self.graph.unfollow(self.acting_user, target)? {
            return Ok(SyncOutcome::noop());
        }

        match self.gateway.persist_unfollow(self.acting_user, target).await {
            Ok(()) => Ok(SyncOutcome::synced()),
            Err(err) => {
                tracing::warn!(error = %err, target = %target, "unfollow rejected upstream, compensating");
                if let Some(edge) = prior {
                    self.graph.restore_edge(edge)?;
                }
                Ok(SyncOutcome::reverted(&err))
            }
        }
    }

    /// Score the questionnaire and store the result on the acting user.
    pub fn apply_questionnaire(&mut self, answers: &[Answer]) -> AppResult<ProfileScore> {
        let score = evaluate(answers)?;
        self.graph.apply_profile(self.acting_user, &score)?;
        Ok(score)
    }

    /// Rank candidate users against the acting user through the match cache.
    pub fn matches_for(&mut self, candidate_ids: &[Uuid]) -> AppResult<Vec<RankedMatch>> {
        let target = self
            .graph
            .user(self.acting_user)
            .cloned()
            .ok_or_else(|| unknown_user(self.acting_user))?;
        let mut candidates = Vec::with_capacity(candidate_ids.len());
        for id in candidate_ids {
            let profile = self.graph.user(*id).cloned().ok_or_else(|| unknown_user(*id))?;
            candidates.push(profile);
        }
        Ok(self.matches.rank(&target, &candidates))
    }

    /// Record a computed match as a feed event for the acting user.
    pub fn record_match(&mut self, peer: Uuid, percentage: u8) -> AppResult<u64> {
        let draft = NotificationDraft::new(NotificationKind::Match, peer, self.acting_user)
            .with_payload(serde_json::json!({ "percentage": percentage }));
        self.feed.append(draft)
    }

    // --- Feed passthroughs ---

    /// Advance the feed's duplicate-guard window; call once per UI turn.
    pub fn next_tick(&mut self) {
        self.feed.next_tick();
    }

    pub fn notifications(&self, filter: FeedFilter) -> impl Iterator<Item = &NotificationEvent> + '_ {
        self.feed.list(filter)
    }

    pub fn mark_notification_read(&mut self, id: u64) -> bool {
        self.feed.mark_as_read(id)
    }

    pub fn mark_all_read(&mut self) -> usize {
        self.feed.mark_all_as_read(self.acting_user)
    }

    pub fn unread_count(&self) -> usize {
        self.feed.unread_count(self.acting_user)
    }
}

fn unknown_user(id: Uuid) -> AppError {
    AppError::new(ErrorCode::UnknownUser, format!("user not in store: {id}"))
}
