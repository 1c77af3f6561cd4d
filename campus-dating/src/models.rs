use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{dating_matches, dating_profiles, dating_swipes};

// --- DatingProfile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = dating_profiles, primary_key(user_id))]
pub struct DatingProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i32,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub photo_url: Option<String>,
    pub institution: Option<String>,
    pub course: Option<String>,
    pub looking_for: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of a user's profile, used for both insert and update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = dating_profiles, primary_key(user_id), treat_none_as_null = true)]
pub struct NewDatingProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i32,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub photo_url: Option<String>,
    pub institution: Option<String>,
    pub course: Option<String>,
    pub looking_for: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// --- SwipeDecision ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = dating_swipes)]
pub struct SwipeDecision {
    pub id: Uuid,
    pub swiper_id: Uuid,
    pub swiped_id: Uuid,
    pub is_like: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = dating_swipes)]
pub struct NewSwipe {
    pub swiper_id: Uuid,
    pub swiped_id: Uuid,
    pub is_like: bool,
}

impl SwipeDecision {
    pub fn decision(&self) -> &'static str {
        if self.is_like { "like" } else { "pass" }
    }
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = dating_matches)]
pub struct Match {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The other side of the match, from `user_id`'s point of view.
    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.user1_id == user_id { self.user2_id } else { self.user1_id }
    }
}

/// An unordered pair of distinct users, stored lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = dating_matches)]
pub struct MatchPair {
    user1_id: Uuid,
    user2_id: Uuid,
}

impl MatchPair {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        let (user1_id, user2_id) = if a < b { (a, b) } else { (b, a) };
        Self { user1_id, user2_id }
    }

    pub fn low(&self) -> Uuid {
        self.user1_id
    }

    pub fn high(&self) -> Uuid {
        self.user2_id
    }
}
