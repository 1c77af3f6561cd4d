use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use campus_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{DatingProfile, NewDatingProfile};
use crate::store::DatingStore;

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
    #[validate(range(min = 18, max = 120))]
    pub age: i32,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub interests: Vec<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(max = 120))]
    pub institution: Option<String>,
    #[validate(length(max = 120))]
    pub course: Option<String>,
    #[validate(length(max = 40))]
    pub looking_for: Option<String>,
}

impl UpsertProfileRequest {
    /// Trims free text. Blank optional fields become absent, so they are
    /// never checked against the url or length rules.
    fn normalized(self) -> Self {
        Self {
            display_name: self.display_name.trim().to_string(),
            age: self.age,
            bio: non_blank(self.bio),
            interests: normalize_interests(self.interests),
            photo_url: non_blank(self.photo_url),
            institution: non_blank(self.institution),
            course: non_blank(self.course),
            looking_for: non_blank(self.looking_for),
        }
    }
}

/// Creates or replaces the caller's dating profile.
pub fn upsert_profile(
    store: &dyn DatingStore,
    user_id: Uuid,
    req: UpsertProfileRequest,
) -> AppResult<DatingProfile> {
    let req = req.normalized();
    req.validate()?;

    let profile = NewDatingProfile {
        user_id,
        display_name: req.display_name,
        age: req.age,
        bio: req.bio,
        interests: req.interests,
        photo_url: req.photo_url,
        institution: req.institution,
        course: req.course,
        looking_for: req.looking_for,
        updated_at: Utc::now(),
    };

    let stored = store.upsert_profile(profile)?;

    tracing::info!(user_id = %user_id, "dating profile saved");
    Ok(stored)
}

pub fn get_profile(store: &dyn DatingStore, user_id: Uuid) -> AppResult<DatingProfile> {
    store
        .get_profile(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "dating profile not found"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping first-seen order.
fn normalize_interests(interests: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    interests
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .filter(|i| seen.insert(i.to_lowercase()))
        .collect()
}
