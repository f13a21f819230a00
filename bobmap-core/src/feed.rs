//! Append-only notification feed with read-state tracking.
//!
//! Events get monotonically increasing local ids and non-decreasing
//! timestamps. A per-tick guard rejects exact duplicate submissions within
//! one construction tick; the same content in a later tick is a distinct
//! entry.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use uuid::Uuid;

use bobmap_shared::errors::{AppError, AppResult, ErrorCode};
use bobmap_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{NotificationDraft, NotificationEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    UnreadOnly,
}

#[derive(Debug, Default)]
pub struct NotificationFeed {
    events: Vec<NotificationEvent>,
    next_id: u64,
    tick: u64,
    seen_this_tick: HashSet<u64>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
            tick: 0,
            seen_this_tick: HashSet::new(),
        }
    }

    /// Append an event, assigning the next id and (when the draft carries
    /// none) a timestamp. Timestamps never go backwards: a draft older than
    /// the newest entry is clamped to it.
    ///
    /// An exact duplicate `(kind, actor, target, payload)` within the current
    /// tick fails with `DuplicateEvent`; this is the double-submission guard.
    pub fn append(&mut self, draft: NotificationDraft) -> AppResult<u64> {
        let fingerprint = fingerprint(&draft);
        if !self.seen_this_tick.insert(fingerprint) {
            return Err(AppError::new(
                ErrorCode::DuplicateEvent,
                "identical event already appended this tick",
            ));
        }

        let mut created_at = draft.created_at.unwrap_or_else(Utc::now);
        if let Some(last) = self.events.last() {
            created_at = created_at.max(last.created_at);
        }

        let id = self.next_id;
        self.next_id += 1;
        let kind = draft.kind;
        self.events.push(NotificationEvent {
            id,
            kind,
            actor_id: draft.actor_id,
            target_user_id: draft.target_user_id,
            payload: draft.payload,
            created_at,
            read_at: draft.read_at,
        });
        tracing::debug!(event_id = id, kind = ?kind, "event appended");
        Ok(id)
    }

    /// Advance the duplicate-guard window. The host calls this once per UI
    /// turn.
    pub fn next_tick(&mut self) {
        self.tick += 1;
        self.seen_this_tick.clear();
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn get(&self, id: u64) -> Option<&NotificationEvent> {
        self.index_of(id).map(|i| &self.events[i])
    }

    /// Set `read_at` once. Unknown ids and already-read events are a `false`
    /// no-op.
    pub fn mark_as_read(&mut self, id: u64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let event = &mut self.events[index];
        if event.read_at.is_some() {
            return false;
        }
        event.read_at = Some(Utc::now());
        true
    }

    /// Mark every unread event targeted at `user_id`; returns how many
    /// flipped. Calling it again immediately returns 0.
    pub fn mark_all_as_read(&mut self, user_id: Uuid) -> usize {
        let now = Utc::now();
        let mut updated = 0;
        for event in &mut self.events {
            if event.target_user_id == user_id && event.read_at.is_none() {
                event.read_at = Some(now);
                updated += 1;
            }
        }
        updated
    }

    pub fn unread_count(&self, user_id: Uuid) -> usize {
        self.events
            .iter()
            .filter(|e| e.target_user_id == user_id && !e.is_read())
            .count()
    }

    /// Newest-first iteration over the feed. Restartable: each call walks a
    /// stable snapshot from the top.
    pub fn list(&self, filter: FeedFilter) -> impl Iterator<Item = &NotificationEvent> + '_ {
        self.events
            .iter()
            .rev()
            .filter(move |e| match filter {
                FeedFilter::All => true,
                FeedFilter::UnreadOnly => !e.is_read(),
            })
    }

    /// Newest-first page of events targeted at `user_id`.
    pub fn page(&self, user_id: Uuid, params: &PaginationParams) -> Paginated<NotificationEvent> {
        let total = self
            .events
            .iter()
            .filter(|e| e.target_user_id == user_id)
            .count() as u64;
        let items: Vec<NotificationEvent> = self
            .events
            .iter()
            .rev()
            .filter(|e| e.target_user_id == user_id)
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .cloned()
            .collect();
        Paginated::new(items, total, params)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.events.binary_search_by_key(&id, |e| e.id).ok()
    }
}

fn fingerprint(draft: &NotificationDraft) -> u64 {
    let mut hasher = DefaultHasher::new();
    draft.kind.hash(&mut hasher);
    draft.actor_id.hash(&mut hasher);
    draft.target_user_id.hash(&mut hasher);
    // serde_json maps are sorted, so equal payloads hash equally.
    draft.payload.to_string().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use chrono::{Duration, Utc};

    fn draft(actor: Uuid, target: Uuid) -> NotificationDraft {
        NotificationDraft::new(NotificationKind::Like, actor, target)
    }

    #[test]
    fn ids_and_timestamps_are_monotonic() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());

        let a = feed
            .append(draft(actor, target).with_payload(serde_json::json!({"n": 1})))
            .unwrap();
        let b = feed
            .append(draft(actor, target).with_payload(serde_json::json!({"n": 2})))
            .unwrap();
        assert!(b > a);

        let first = feed.get(a).unwrap().created_at;
        let second = feed.get(b).unwrap().created_at;
        assert!(second >= first);
    }

    #[test]
    fn stale_draft_timestamp_is_clamped() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());

        let now = Utc::now();
        feed.append(draft(actor, target).with_created_at(now)).unwrap();
        feed.next_tick();
        let id = feed
            .append(draft(actor, target).with_created_at(now - Duration::hours(1)))
            .unwrap();
        assert_eq!(feed.get(id).unwrap().created_at, now);
    }

    #[test]
    fn same_tick_duplicate_is_rejected() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());

        feed.append(draft(actor, target)).unwrap();
        let err = feed.append(draft(actor, target)).unwrap_err();
        assert!(err.is_code(ErrorCode::DuplicateEvent));
        assert_eq!(feed.len(), 1);

        // Same content in a later tick is a distinct entry.
        feed.next_tick();
        feed.append(draft(actor, target)).unwrap();
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn different_payloads_coexist_in_one_tick() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());

        feed.append(draft(actor, target).with_payload(serde_json::json!({"r": 1})))
            .unwrap();
        feed.append(draft(actor, target).with_payload(serde_json::json!({"r": 2})))
            .unwrap();
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn mark_as_read_is_idempotent() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());
        let id = feed.append(draft(actor, target)).unwrap();

        assert!(feed.mark_as_read(id));
        assert!(!feed.mark_as_read(id));
        assert!(!feed.mark_as_read(9999));
        assert!(feed.get(id).unwrap().is_read());
    }

    #[test]
    fn mark_all_as_read_flips_only_targets_events() {
        let mut feed = NotificationFeed::new();
        let actor = Uuid::new_v4();
        let (me, other) = (Uuid::new_v4(), Uuid::new_v4());

        feed.append(draft(actor, me)).unwrap();
        feed.next_tick();
        feed.append(draft(actor, me)).unwrap();
        feed.append(draft(actor, other)).unwrap();

        assert_eq!(feed.unread_count(me), 2);
        assert_eq!(feed.mark_all_as_read(me), 2);
        assert_eq!(feed.unread_count(me), 0);
        assert_eq!(feed.unread_count(other), 1);
        // Second pass is a no-op.
        assert_eq!(feed.mark_all_as_read(me), 0);
    }

    #[test]
    fn list_is_newest_first_and_restartable() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());
        for n in 0..3 {
            feed.append(draft(actor, target).with_payload(serde_json::json!({"n": n})))
                .unwrap();
        }

        let ids: Vec<u64> = feed.list(FeedFilter::All).map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        // A second iteration sees the same snapshot.
        let again: Vec<u64> = feed.list(FeedFilter::All).map(|e| e.id).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn unread_filter_hides_read_events() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());
        let first = feed
            .append(draft(actor, target).with_payload(serde_json::json!({"n": 1})))
            .unwrap();
        feed.append(draft(actor, target).with_payload(serde_json::json!({"n": 2})))
            .unwrap();

        feed.mark_as_read(first);
        let unread: Vec<u64> = feed.list(FeedFilter::UnreadOnly).map(|e| e.id).collect();
        assert_eq!(unread, vec![2]);
    }

    #[test]
    fn page_is_newest_first() {
        let mut feed = NotificationFeed::new();
        let actor = Uuid::new_v4();
        let me = Uuid::new_v4();
        for n in 0..5 {
            feed.append(draft(actor, me).with_payload(serde_json::json!({"n": n})))
                .unwrap();
        }

        let params = PaginationParams { page: 1, per_page: 2 };
        let page = feed.page(me, &params);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<u64> = page.items.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 4]);

        let params = PaginationParams { page: 3, per_page: 2 };
        let last = feed.page(me, &params);
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, 1);
    }

    #[test]
    fn restored_events_keep_read_state() {
        let mut feed = NotificationFeed::new();
        let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());
        let read_at = Utc::now();
        let id = feed
            .append(draft(actor, target).already_read(read_at))
            .unwrap();
        assert!(feed.get(id).unwrap().is_read());
        assert_eq!(feed.unread_count(target), 0);
    }
}
