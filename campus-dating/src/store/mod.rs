//! Persistence port for the dating tables.
//!
//! [`PgDatingStore`] is the production implementation; [`MemoryDatingStore`]
//! keeps the same uniqueness rules in process for tests and local runs.

mod memory;
mod pg;

pub use memory::MemoryDatingStore;
pub use pg::PgDatingStore;

use campus_shared::AppResult;
use uuid::Uuid;

use crate::models::{DatingProfile, Match, MatchPair, NewDatingProfile, NewSwipe, SwipeDecision};

pub trait DatingStore: Send + Sync {
    /// Cheap round-trip used by the health check.
    fn ping(&self) -> AppResult<()>;

    fn upsert_profile(&self, profile: NewDatingProfile) -> AppResult<DatingProfile>;

    fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DatingProfile>>;

    fn profiles_by_ids(&self, user_ids: &[Uuid]) -> AppResult<Vec<DatingProfile>>;

    /// Stores the decision unless the pair already has one.
    /// Returns `None` when a decision already existed.
    fn insert_swipe(&self, swipe: NewSwipe) -> AppResult<Option<SwipeDecision>>;

    fn find_swipe(&self, swiper_id: Uuid, swiped_id: Uuid) -> AppResult<Option<SwipeDecision>>;

    fn count_swipes(&self, swiper_id: Uuid) -> AppResult<u64>;

    /// Profiles other than `swiper_id` that `swiper_id` has not decided on,
    /// oldest first, at most `limit`.
    fn candidate_profiles(&self, swiper_id: Uuid, limit: i64) -> AppResult<Vec<DatingProfile>>;

    /// Inserts the match unless the pair already has one.
    /// Returns the stored row and whether this call created it.
    fn insert_match_if_absent(&self, pair: MatchPair) -> AppResult<(Match, bool)>;

    fn find_match(&self, pair: MatchPair) -> AppResult<Option<Match>>;

    /// Matches involving `user_id`, newest first.
    fn matches_for(&self, user_id: Uuid) -> AppResult<Vec<Match>>;
}
