use diesel::dsl::not;
use diesel::prelude::*;
use uuid::Uuid;

use campus_shared::clients::db::{checkout, DbPool};
use campus_shared::AppResult;

use crate::models::{DatingProfile, Match, MatchPair, NewDatingProfile, NewSwipe, SwipeDecision};
use crate::schema::{dating_matches, dating_profiles, dating_swipes};

use super::DatingStore;

pub struct PgDatingStore {
    pool: DbPool,
}

impl PgDatingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DatingStore for PgDatingStore {
    fn ping(&self) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    fn upsert_profile(&self, profile: NewDatingProfile) -> AppResult<DatingProfile> {
        let mut conn = checkout(&self.pool)?;

        let stored = diesel::insert_into(dating_profiles::table)
            .values(&profile)
            .on_conflict(dating_profiles::user_id)
            .do_update()
            .set(&profile)
            .get_result::<DatingProfile>(&mut conn)?;

        Ok(stored)
    }

    fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DatingProfile>> {
        let mut conn = checkout(&self.pool)?;

        let profile = dating_profiles::table
            .find(user_id)
            .first::<DatingProfile>(&mut conn)
            .optional()?;

        Ok(profile)
    }

    fn profiles_by_ids(&self, user_ids: &[Uuid]) -> AppResult<Vec<DatingProfile>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = checkout(&self.pool)?;

        let profiles = dating_profiles::table
            .filter(dating_profiles::user_id.eq_any(user_ids))
            .load::<DatingProfile>(&mut conn)?;

        Ok(profiles)
    }

    fn insert_swipe(&self, swipe: NewSwipe) -> AppResult<Option<SwipeDecision>> {
        let mut conn = checkout(&self.pool)?;

        // DO NOTHING returns no row on conflict, which `optional` turns into None.
        let inserted = diesel::insert_into(dating_swipes::table)
            .values(&swipe)
            .on_conflict((dating_swipes::swiper_id, dating_swipes::swiped_id))
            .do_nothing()
            .get_result::<SwipeDecision>(&mut conn)
            .optional()?;

        Ok(inserted)
    }

    fn find_swipe(&self, swiper_id: Uuid, swiped_id: Uuid) -> AppResult<Option<SwipeDecision>> {
        let mut conn = checkout(&self.pool)?;

        let swipe = dating_swipes::table
            .filter(dating_swipes::swiper_id.eq(swiper_id))
            .filter(dating_swipes::swiped_id.eq(swiped_id))
            .first::<SwipeDecision>(&mut conn)
            .optional()?;

        Ok(swipe)
    }

    fn count_swipes(&self, swiper_id: Uuid) -> AppResult<u64> {
        let mut conn = checkout(&self.pool)?;

        let count: i64 = dating_swipes::table
            .filter(dating_swipes::swiper_id.eq(swiper_id))
            .count()
            .get_result(&mut conn)?;

        Ok(count.max(0) as u64)
    }

    fn candidate_profiles(&self, swiper_id: Uuid, limit: i64) -> AppResult<Vec<DatingProfile>> {
        let mut conn = checkout(&self.pool)?;

        let already_swiped = dating_swipes::table
            .filter(dating_swipes::swiper_id.eq(swiper_id))
            .select(dating_swipes::swiped_id);

        let candidates = dating_profiles::table
            .filter(dating_profiles::user_id.ne(swiper_id))
            .filter(not(dating_profiles::user_id.eq_any(already_swiped)))
            .order((dating_profiles::created_at.asc(), dating_profiles::user_id.asc()))
            .limit(limit)
            .load::<DatingProfile>(&mut conn)?;

        Ok(candidates)
    }

    fn insert_match_if_absent(&self, pair: MatchPair) -> AppResult<(Match, bool)> {
        let mut conn = checkout(&self.pool)?;

        let inserted = diesel::insert_into(dating_matches::table)
            .values(&pair)
            .on_conflict((dating_matches::user1_id, dating_matches::user2_id))
            .do_nothing()
            .get_result::<Match>(&mut conn)
            .optional()?;

        if let Some(created) = inserted {
            return Ok((created, true));
        }

        let existing = dating_matches::table
            .filter(dating_matches::user1_id.eq(pair.low()))
            .filter(dating_matches::user2_id.eq(pair.high()))
            .first::<Match>(&mut conn)?;

        Ok((existing, false))
    }

    fn find_match(&self, pair: MatchPair) -> AppResult<Option<Match>> {
        let mut conn = checkout(&self.pool)?;

        let found = dating_matches::table
            .filter(dating_matches::user1_id.eq(pair.low()))
            .filter(dating_matches::user2_id.eq(pair.high()))
            .first::<Match>(&mut conn)
            .optional()?;

        Ok(found)
    }

    fn matches_for(&self, user_id: Uuid) -> AppResult<Vec<Match>> {
        let mut conn = checkout(&self.pool)?;

        let matches = dating_matches::table
            .filter(
                dating_matches::user1_id.eq(user_id)
                    .or(dating_matches::user2_id.eq(user_id)),
            )
            .order(dating_matches::created_at.desc())
            .load::<Match>(&mut conn)?;

        Ok(matches)
    }
}
