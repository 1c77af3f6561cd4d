use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use campus_shared::AppResult;

use crate::models::{DatingProfile, Match, MatchPair, NewDatingProfile, NewSwipe, SwipeDecision};

use super::DatingStore;

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, DatingProfile>,
    swipes: HashMap<(Uuid, Uuid), SwipeDecision>,
    matches: HashMap<MatchPair, Match>,
}

/// In-process store with the same per-pair uniqueness as the Postgres schema.
/// Every method takes the lock once, so each call is atomic on its own.
#[derive(Default)]
pub struct MemoryDatingStore {
    tables: Mutex<Tables>,
}

impl MemoryDatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DatingStore for MemoryDatingStore {
    fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn upsert_profile(&self, profile: NewDatingProfile) -> AppResult<DatingProfile> {
        let mut tables = self.lock();
        let created_at = tables
            .profiles
            .get(&profile.user_id)
            .map(|p| p.created_at)
            .unwrap_or(profile.updated_at);

        let stored = DatingProfile {
            user_id: profile.user_id,
            display_name: profile.display_name,
            age: profile.age,
            bio: profile.bio,
            interests: profile.interests,
            photo_url: profile.photo_url,
            institution: profile.institution,
            course: profile.course,
            looking_for: profile.looking_for,
            created_at,
            updated_at: profile.updated_at,
        };
        tables.profiles.insert(stored.user_id, stored.clone());
        Ok(stored)
    }

    fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DatingProfile>> {
        Ok(self.lock().profiles.get(&user_id).cloned())
    }

    fn profiles_by_ids(&self, user_ids: &[Uuid]) -> AppResult<Vec<DatingProfile>> {
        let tables = self.lock();
        Ok(user_ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }

    fn insert_swipe(&self, swipe: NewSwipe) -> AppResult<Option<SwipeDecision>> {
        let mut tables = self.lock();
        let key = (swipe.swiper_id, swipe.swiped_id);
        if tables.swipes.contains_key(&key) {
            return Ok(None);
        }

        let stored = SwipeDecision {
            id: Uuid::new_v4(),
            swiper_id: swipe.swiper_id,
            swiped_id: swipe.swiped_id,
            is_like: swipe.is_like,
            created_at: Utc::now(),
        };
        tables.swipes.insert(key, stored.clone());
        Ok(Some(stored))
    }

    fn find_swipe(&self, swiper_id: Uuid, swiped_id: Uuid) -> AppResult<Option<SwipeDecision>> {
        Ok(self.lock().swipes.get(&(swiper_id, swiped_id)).cloned())
    }

    fn count_swipes(&self, swiper_id: Uuid) -> AppResult<u64> {
        Ok(self
            .lock()
            .swipes
            .keys()
            .filter(|(swiper, _)| *swiper == swiper_id)
            .count() as u64)
    }

    fn candidate_profiles(&self, swiper_id: Uuid, limit: i64) -> AppResult<Vec<DatingProfile>> {
        let tables = self.lock();
        let mut candidates: Vec<DatingProfile> = tables
            .profiles
            .values()
            .filter(|p| p.user_id != swiper_id)
            .filter(|p| !tables.swipes.contains_key(&(swiper_id, p.user_id)))
            .cloned()
            .collect();

        candidates.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        candidates.truncate(limit.max(0) as usize);
        Ok(candidates)
    }

    fn insert_match_if_absent(&self, pair: MatchPair) -> AppResult<(Match, bool)> {
        let mut tables = self.lock();
        if let Some(existing) = tables.matches.get(&pair) {
            return Ok((existing.clone(), false));
        }

        let created = Match {
            id: Uuid::new_v4(),
            user1_id: pair.low(),
            user2_id: pair.high(),
            created_at: Utc::now(),
        };
        tables.matches.insert(pair, created.clone());
        Ok((created, true))
    }

    fn find_match(&self, pair: MatchPair) -> AppResult<Option<Match>> {
        Ok(self.lock().matches.get(&pair).cloned())
    }

    fn matches_for(&self, user_id: Uuid) -> AppResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .lock()
            .matches
            .values()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}
