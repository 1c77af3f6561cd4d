use uuid::Uuid;

use campus_shared::errors::AppResult;

use crate::models::DatingProfile;
use crate::store::DatingStore;

pub const MAX_FEED_SIZE: i64 = 50;

/// Clamps a requested page size, falling back to `default_size`.
pub fn feed_limit(requested: Option<i64>, default_size: i64) -> i64 {
    requested.unwrap_or(default_size).clamp(1, MAX_FEED_SIZE)
}

/// Next page of profiles `swiper_id` has not decided on yet.
///
/// No cursor: the page only moves as the swiper records decisions.
pub fn candidate_feed(
    store: &dyn DatingStore,
    swiper_id: Uuid,
    limit: i64,
) -> AppResult<Vec<DatingProfile>> {
    let feed = store.candidate_profiles(swiper_id, limit)?;
    tracing::debug!(swiper_id = %swiper_id, size = feed.len(), "candidate feed built");
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_shared::clients::events::NoopSink;

    use crate::services::swipe_service::record_swipe;
    use crate::store::MemoryDatingStore;
    use crate::test_support::seed_profile;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(feed_limit(None, 20), 20);
        assert_eq!(feed_limit(Some(0), 20), 1);
        assert_eq!(feed_limit(Some(500), 20), MAX_FEED_SIZE);
    }

    #[tokio::test]
    async fn feed_excludes_self_and_swiped_profiles() {
        let store = MemoryDatingStore::new();
        let me = seed_profile(&store, "me");
        let liked = seed_profile(&store, "liked");
        let passed = seed_profile(&store, "passed");
        let fresh = seed_profile(&store, "fresh");

        record_swipe(&store, &NoopSink, me, liked, true).await.unwrap();
        record_swipe(&store, &NoopSink, me, passed, false).await.unwrap();

        let feed = candidate_feed(&store, me, 20).unwrap();
        let ids: Vec<Uuid> = feed.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![fresh]);
    }

    #[tokio::test]
    async fn swipes_by_others_do_not_shrink_my_feed() {
        let store = MemoryDatingStore::new();
        let me = seed_profile(&store, "me");
        let other = seed_profile(&store, "other");
        let target = seed_profile(&store, "target");

        record_swipe(&store, &NoopSink, other, target, true).await.unwrap();
        record_swipe(&store, &NoopSink, target, me, false).await.unwrap();

        let ids: Vec<Uuid> = candidate_feed(&store, me, 20)
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        assert!(ids.contains(&other));
        assert!(ids.contains(&target));
        assert!(!ids.contains(&me));
    }

    #[test]
    fn feed_is_bounded_and_stable() {
        let store = MemoryDatingStore::new();
        let me = seed_profile(&store, "me");
        for i in 0..30 {
            seed_profile(&store, &format!("candidate-{i}"));
        }

        let first = candidate_feed(&store, me, 20).unwrap();
        let second = candidate_feed(&store, me, 20).unwrap();
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
    }
}
