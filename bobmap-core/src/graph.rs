//! In-memory social graph: users plus directed follow edges.
//!
//! Counts are always derived from the edge set; there are no independently
//! maintained counters. An edge is either present or absent; there is no
//! pending state.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use bobmap_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{FollowEdge, UserProfile};
use crate::profile::ProfileScore;

#[derive(Debug, Default)]
pub struct SocialGraphStore {
    users: HashMap<Uuid, UserProfile>,
    edges: HashMap<(Uuid, Uuid), FollowEdge>,
    following: HashMap<Uuid, HashSet<Uuid>>,
    followers: HashMap<Uuid, HashSet<Uuid>>,
}

impl SocialGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Users ---

    /// Insert or replace a user record.
    ///
    /// On replacement the taste vector version keeps increasing past the old
    /// record's, so cached match scores for the user are invalidated.
    pub fn upsert_user(&mut self, profile: UserProfile) {
        let mut profile = profile;
        if let Some(existing) = self.users.get(&profile.id) {
            let mut taste = existing.taste.clone();
            taste.assign(&profile.taste);
            profile.taste = taste;
        }
        self.users.insert(profile.id, profile);
    }

    pub fn user(&self, id: Uuid) -> Option<&UserProfile> {
        self.users.get(&id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Store a questionnaire result on a user: taste vector and primary type.
    pub fn apply_profile(&mut self, user_id: Uuid, score: &ProfileScore) -> AppResult<()> {
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| unknown_user(user_id))?;
        user.taste.assign(&score.taste);
        user.primary_type = Some(score.primary);
        tracing::debug!(user_id = %user_id, primary = ?score.primary, "profile applied");
        Ok(())
    }

    // --- Follow edges ---

    /// Insert a follow edge from `actor` to `target`.
    ///
    /// Returns `Some(edge)` on first insertion, `None` if the edge already
    /// exists (idempotent no-op). Fails on self-follows and unknown users.
    pub fn follow(&mut self, actor: Uuid, target: Uuid) -> AppResult<Option<FollowEdge>> {
        if actor == target {
            return Err(AppError::new(
                ErrorCode::SelfFollow,
                "cannot follow yourself",
            ));
        }
        self.check_user(actor)?;
        self.check_user(target)?;

        if self.edges.contains_key(&(actor, target)) {
            return Ok(None);
        }

        let edge = FollowEdge {
            follower_id: actor,
            followee_id: target,
            created_at: Utc::now(),
        };
        self.insert_edge(edge.clone());
        tracing::debug!(actor = %actor, target = %target, "follow edge inserted");
        Ok(Some(edge))
    }

    /// Remove the follow edge from `actor` to `target`.
    ///
    /// Removing an absent edge is a no-op returning `false`.
    pub fn unfollow(&mut self, actor: Uuid, target: Uuid) -> AppResult<bool> {
        self.check_user(actor)?;
        self.check_user(target)?;

        if self.edges.remove(&(actor, target)).is_none() {
            return Ok(false);
        }
        if let Some(set) = self.following.get_mut(&actor) {
            set.remove(&target);
        }
        if let Some(set) = self.followers.get_mut(&target) {
            set.remove(&actor);
        }
        tracing::debug!(actor = %actor, target = %target, "follow edge removed");
        Ok(true)
    }

    /// Re-insert an edge fetched from the backend, preserving its timestamp.
    /// Idempotent; used during hydration.
    pub fn restore_edge(&mut self, edge: FollowEdge) -> AppResult<bool> {
        if edge.follower_id == edge.followee_id {
            return Err(AppError::new(
                ErrorCode::SelfFollow,
                "edge loops back to its follower",
            ));
        }
        self.check_user(edge.follower_id)?;
        self.check_user(edge.followee_id)?;

        if self.edges.contains_key(&(edge.follower_id, edge.followee_id)) {
            return Ok(false);
        }
        self.insert_edge(edge);
        Ok(true)
    }

    pub fn is_following(&self, actor: Uuid, target: Uuid) -> bool {
        self.edges.contains_key(&(actor, target))
    }

    /// Both directions present.
    pub fn is_mutual(&self, a: Uuid, b: Uuid) -> bool {
        self.is_following(a, b) && self.is_following(b, a)
    }

    pub fn edge(&self, actor: Uuid, target: Uuid) -> Option<&FollowEdge> {
        self.edges.get(&(actor, target))
    }

    pub fn follower_count(&self, user_id: Uuid) -> usize {
        self.followers.get(&user_id).map_or(0, HashSet::len)
    }

    pub fn following_count(&self, user_id: Uuid) -> usize {
        self.following.get(&user_id).map_or(0, HashSet::len)
    }

    /// Users following `user_id`, most recent edge first.
    pub fn followers(&self, user_id: Uuid) -> Vec<&UserProfile> {
        let Some(ids) = self.followers.get(&user_id) else {
            return Vec::new();
        };
        self.sorted_profiles(ids.iter().map(|f| (*f, (*f, user_id))))
    }

    /// Users `user_id` follows, most recent edge first.
    pub fn following(&self, user_id: Uuid) -> Vec<&UserProfile> {
        let Some(ids) = self.following.get(&user_id) else {
            return Vec::new();
        };
        self.sorted_profiles(ids.iter().map(|f| (*f, (user_id, *f))))
    }

    fn sorted_profiles<'a>(
        &'a self,
        ids: impl Iterator<Item = (Uuid, (Uuid, Uuid))>,
    ) -> Vec<&'a UserProfile> {
        let mut entries: Vec<(&FollowEdge, &UserProfile)> = ids
            .filter_map(|(peer, key)| {
                let edge = self.edges.get(&key)?;
                let profile = self.users.get(&peer)?;
                Some((edge, profile))
            })
            .collect();
        // Most recent first; equal timestamps fall back to id for stability.
        entries.sort_by(|a, b| {
            b.0.created_at
                .cmp(&a.0.created_at)
                .then(a.1.id.cmp(&b.1.id))
        });
        entries.into_iter().map(|(_, p)| p).collect()
    }

    fn insert_edge(&mut self, edge: FollowEdge) {
        self.following
            .entry(edge.follower_id)
            .or_default()
            .insert(edge.followee_id);
        self.followers
            .entry(edge.followee_id)
            .or_default()
            .insert(edge.follower_id);
        self.edges
            .insert((edge.follower_id, edge.followee_id), edge);
    }

    fn check_user(&self, id: Uuid) -> AppResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(unknown_user(id))
        }
    }
}

fn unknown_user(id: Uuid) -> AppError {
    AppError::with_details(
        ErrorCode::UnknownUser,
        format!("user not in store: {id}"),
        serde_json::json!({ "user_id": id }),
    )
}
