use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bobmap_shared::errors::{AppError, AppResult, ErrorCode};

/// Upper bound for a single taste affinity.
pub const MAX_AFFINITY: u8 = 5;

// --- Taste vector ---

/// Fixed set of taste categories every profile is scored over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Spicy,
    Sweet,
    Savory,
    Healthy,
    Exotic,
    Comfort,
    Trendy,
    Budget,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Spicy,
        Category::Sweet,
        Category::Savory,
        Category::Healthy,
        Category::Exotic,
        Category::Comfort,
        Category::Trendy,
        Category::Budget,
    ];
}

/// Dense per-category affinity map, each entry in `0..=MAX_AFFINITY`.
///
/// Carries a version counter bumped on every mutation; the match cache keys
/// cached percentages on the pair's versions, so a stale entry can never be
/// served after either vector changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasteVector {
    affinities: BTreeMap<Category, u8>,
    #[serde(default)]
    version: u64,
}

impl TasteVector {
    /// All-zero vector over the full category set.
    pub fn new() -> Self {
        Self {
            affinities: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            version: 0,
        }
    }

    /// Build from explicit pairs; unlisted categories default to zero.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Category, u8)>) -> AppResult<Self> {
        let mut vector = Self::new();
        for (category, value) in pairs {
            vector.check_bounds(category, value)?;
            vector.affinities.insert(category, value);
        }
        Ok(vector)
    }

    pub fn get(&self, category: Category) -> u8 {
        self.affinities.get(&category).copied().unwrap_or(0)
    }

    pub fn set(&mut self, category: Category, value: u8) -> AppResult<()> {
        self.check_bounds(category, value)?;
        self.affinities.insert(category, value);
        self.version += 1;
        Ok(())
    }

    /// Add to a category, saturating at [`MAX_AFFINITY`].
    pub fn saturating_add(&mut self, category: Category, delta: u8) {
        let entry = self.affinities.entry(category).or_insert(0);
        *entry = (*entry).saturating_add(delta).min(MAX_AFFINITY);
        self.version += 1;
    }

    /// Replace this vector's affinities with `other`'s, keeping the version
    /// strictly increasing so cached match scores are invalidated.
    pub fn assign(&mut self, other: &TasteVector) {
        self.affinities = other.affinities.clone();
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_default(&self) -> bool {
        self.affinities.values().all(|v| *v == 0)
    }

    fn check_bounds(&self, category: Category, value: u8) -> AppResult<()> {
        if value > MAX_AFFINITY {
            return Err(AppError::with_details(
                ErrorCode::TasteOutOfRange,
                format!("affinity {value} for {category:?} exceeds {MAX_AFFINITY}"),
                serde_json::json!({ "category": category, "value": value }),
            ));
        }
        Ok(())
    }
}

impl Default for TasteVector {
    fn default() -> Self {
        Self::new()
    }
}

// --- Archetypes ---

/// Taste personas assigned by the questionnaire.
///
/// Declaration order is the fixed priority order used to break score ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Adventurer,
    Trendsetter,
    ComfortSeeker,
    HealthNut,
    Gourmet,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Adventurer,
        Archetype::Trendsetter,
        Archetype::ComfortSeeker,
        Archetype::HealthNut,
        Archetype::Gourmet,
    ];
}

// --- Users ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub taste: TasteVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<Archetype>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            taste: TasteVector::new(),
            primary_type: None,
            created_at: Utc::now(),
        }
    }
}

// --- Follow edges ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// --- Match results ---

/// Derived projection of two taste vectors; never source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatch {
    pub user_id: Uuid,
    pub username: String,
    pub percentage: u8,
    pub computed_at: DateTime<Utc>,
}

// --- Notifications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Follow,
    Match,
    BuddyRequest,
    RestaurantShare,
    Review,
    Message,
}

/// One entry in the notification feed. Append-only; `read_at` is the only
/// mutable field and is set at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: u64,
    pub kind: NotificationKind,
    pub actor_id: Uuid,
    pub target_user_id: Uuid,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationEvent {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// Event content handed to [`crate::feed::NotificationFeed::append`]; the
/// feed assigns the id and, when absent, the timestamp.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub actor_id: Uuid,
    pub target_user_id: Uuid,
    pub payload: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationDraft {
    pub fn new(kind: NotificationKind, actor_id: Uuid, target_user_id: Uuid) -> Self {
        Self {
            kind,
            actor_id,
            target_user_id,
            payload: serde_json::Value::Null,
            created_at: None,
            read_at: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn already_read(mut self, read_at: DateTime<Utc>) -> Self {
        self.read_at = Some(read_at);
        self
    }
}
