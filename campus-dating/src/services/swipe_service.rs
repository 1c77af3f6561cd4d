use metrics::counter;
use serde::Serialize;
use uuid::Uuid;

use campus_shared::clients::events::EventSink;
use campus_shared::errors::{AppError, AppResult, ErrorCode};

use crate::events::publisher;
use crate::models::{DatingProfile, Match, MatchPair, NewSwipe, SwipeDecision};
use crate::store::DatingStore;

#[derive(Debug, Serialize)]
pub struct SwipeOutcome {
    pub swipe: SwipeDecision,
    #[serde(rename = "match")]
    pub matched: Option<Match>,
}

#[derive(Debug, Serialize)]
pub struct MatchView {
    pub match_id: Uuid,
    pub partner_id: Uuid,
    pub matched_at: chrono::DateTime<chrono::Utc>,
    pub partner: Option<DatingProfile>,
}

/// Records `swiper_id`'s decision about `swiped_id`, then runs match
/// detection when the decision is a like.
///
/// The swipe is persisted before the reverse like is looked up. Of two
/// reciprocal likes racing each other, the one that looks last therefore
/// sees both, and the unique pair constraint absorbs a double insert.
pub async fn record_swipe(
    store: &dyn DatingStore,
    events: &dyn EventSink,
    swiper_id: Uuid,
    swiped_id: Uuid,
    is_like: bool,
) -> AppResult<SwipeOutcome> {
    if swiper_id == swiped_id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "cannot swipe on yourself"));
    }

    if store.get_profile(swiper_id)?.is_none() {
        return Err(AppError::new(
            ErrorCode::ProfileRequired,
            "create a dating profile before swiping",
        ));
    }
    if store.get_profile(swiped_id)?.is_none() {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "swiped profile not found"));
    }

    let Some(swipe) = store.insert_swipe(NewSwipe { swiper_id, swiped_id, is_like })? else {
        return Err(already_swiped(store, events, swiper_id, swiped_id).await);
    };

    counter!("dating_swipes_total", "decision" => swipe.decision()).increment(1);
    tracing::info!(
        swiper_id = %swiper_id,
        swiped_id = %swiped_id,
        decision = swipe.decision(),
        "swipe recorded"
    );
    publisher::publish_swipe_recorded(events, &swipe).await;

    let matched = if swipe.is_like {
        detect_match(store, events, &swipe).await?
    } else {
        None
    };

    Ok(SwipeOutcome { swipe, matched })
}

/// Builds the `AlreadySwiped` rejection for a repeated decision.
///
/// When the stored decision is a like, match detection runs again first: a
/// failure after the like was committed would otherwise leave a mutual like
/// without its match forever.
async fn already_swiped(store: &dyn DatingStore, events: &dyn EventSink, swiper_id: Uuid, swiped_id: Uuid) -> AppError {
    let rejection = |matched: Option<&Match>| {
        let details = serde_json::json!({ "match_id": matched.map(|m| m.id) });
        AppError::with_details(ErrorCode::AlreadySwiped, "already swiped on this profile", details)
    };

    let stored = match store.find_swipe(swiper_id, swiped_id) {
        Ok(Some(stored)) if stored.is_like => stored,
        Ok(_) => return rejection(None),
        Err(e) => return e,
    };
    match detect_match(store, events, &stored).await {
        Ok(matched) => rejection(matched.as_ref()),
        Err(e) => e,
    }
}

/// Creates the match for a like when the reverse like already exists.
async fn detect_match(
    store: &dyn DatingStore,
    events: &dyn EventSink,
    like: &SwipeDecision,
) -> AppResult<Option<Match>> {
    let reverse = store.find_swipe(like.swiped_id, like.swiper_id)?;
    if !reverse.is_some_and(|r| r.is_like) {
        return Ok(None);
    }

    let (found, created) = store.insert_match_if_absent(MatchPair::new(like.swiper_id, like.swiped_id))?;

    if created {
        counter!("dating_matches_total").increment(1);
        tracing::info!(
            match_id = %found.id,
            user1_id = %found.user1_id,
            user2_id = %found.user2_id,
            "match created"
        );
        publisher::publish_match_created(events, &found).await;
    } else {
        tracing::debug!(match_id = %found.id, "match already existed for pair");
    }

    Ok(Some(found))
}

pub fn swipe_count(store: &dyn DatingStore, swiper_id: Uuid) -> AppResult<u64> {
    store.count_swipes(swiper_id)
}

pub fn is_matched(store: &dyn DatingStore, a: Uuid, b: Uuid) -> AppResult<bool> {
    if a == b {
        return Ok(false);
    }
    Ok(store.find_match(MatchPair::new(a, b))?.is_some())
}

/// The user's matches, newest first, with the partner's profile attached.
pub fn list_matches(store: &dyn DatingStore, user_id: Uuid) -> AppResult<Vec<MatchView>> {
    let matches = store.matches_for(user_id)?;
    let partner_ids: Vec<Uuid> = matches.iter().map(|m| m.partner_of(user_id)).collect();
    let mut partners: std::collections::HashMap<Uuid, DatingProfile> = store
        .profiles_by_ids(&partner_ids)?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();

    Ok(matches
        .into_iter()
        .map(|m| {
            let partner_id = m.partner_of(user_id);
            MatchView {
                match_id: m.id,
                partner_id,
                matched_at: m.created_at,
                partner: partners.remove(&partner_id),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use campus_shared::clients::events::RecordingSink;
    use campus_shared::types::event::routing_keys;

    use crate::models::NewDatingProfile;
    use crate::store::MemoryDatingStore;
    use crate::test_support::seed_profile;

    #[tokio::test]
    async fn one_way_like_does_not_match() {
        let store = MemoryDatingStore::new();
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");
        let u2 = seed_profile(&store, "u2");

        let before = swipe_count(&store, u1).unwrap();
        let outcome = record_swipe(&store, &events, u1, u2, true).await.unwrap();

        assert!(outcome.matched.is_none());
        assert_eq!(swipe_count(&store, u1).unwrap(), before + 1);
        assert!(!is_matched(&store, u1, u2).unwrap());
        assert_eq!(events.routing_keys(), vec![routing_keys::DATING_SWIPE_RECORDED]);
    }

    #[tokio::test]
    async fn reciprocal_like_creates_exactly_one_match() {
        let store = MemoryDatingStore::new();
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");
        let u2 = seed_profile(&store, "u2");

        record_swipe(&store, &events, u1, u2, true).await.unwrap();
        let outcome = record_swipe(&store, &events, u2, u1, true).await.unwrap();

        let matched = outcome.matched.expect("reciprocal like should match");
        assert_eq!(MatchPair::new(matched.user1_id, matched.user2_id), MatchPair::new(u1, u2));
        assert!(is_matched(&store, u1, u2).unwrap());
        assert!(is_matched(&store, u2, u1).unwrap());
        assert_eq!(store.matches_for(u1).unwrap().len(), 1);
        assert_eq!(store.matches_for(u2).unwrap().len(), 1);

        let created = events.events_for(routing_keys::DATING_MATCH_CREATED);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].data["match_id"], matched.id.to_string());
    }

    #[tokio::test]
    async fn pass_then_like_does_not_match() {
        let store = MemoryDatingStore::new();
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");
        let u2 = seed_profile(&store, "u2");

        record_swipe(&store, &events, u1, u2, false).await.unwrap();
        let outcome = record_swipe(&store, &events, u2, u1, true).await.unwrap();

        assert!(outcome.matched.is_none());
        assert!(store.matches_for(u1).unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_decision_for_pair_is_rejected() {
        let store = MemoryDatingStore::new();
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");
        let u2 = seed_profile(&store, "u2");

        let first = record_swipe(&store, &events, u1, u2, false).await.unwrap();
        let err = record_swipe(&store, &events, u1, u2, true).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::AlreadySwiped);
        assert_eq!(swipe_count(&store, u1).unwrap(), 1);
        // The original pass stands.
        assert_eq!(store.find_swipe(u1, u2).unwrap(), Some(first.swipe));
    }

    /// Delegates to the memory store but fails the next match insert.
    struct FlakyMatchStore {
        inner: MemoryDatingStore,
        fail_next_match: AtomicBool,
    }

    impl DatingStore for FlakyMatchStore {
        fn ping(&self) -> AppResult<()> {
            self.inner.ping()
        }
        fn upsert_profile(&self, profile: NewDatingProfile) -> AppResult<DatingProfile> {
            self.inner.upsert_profile(profile)
        }
        fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DatingProfile>> {
            self.inner.get_profile(user_id)
        }
        fn profiles_by_ids(&self, user_ids: &[Uuid]) -> AppResult<Vec<DatingProfile>> {
            self.inner.profiles_by_ids(user_ids)
        }
        fn insert_swipe(&self, swipe: NewSwipe) -> AppResult<Option<SwipeDecision>> {
            self.inner.insert_swipe(swipe)
        }
        fn find_swipe(&self, swiper_id: Uuid, swiped_id: Uuid) -> AppResult<Option<SwipeDecision>> {
            self.inner.find_swipe(swiper_id, swiped_id)
        }
        fn count_swipes(&self, swiper_id: Uuid) -> AppResult<u64> {
            self.inner.count_swipes(swiper_id)
        }
        fn candidate_profiles(&self, swiper_id: Uuid, limit: i64) -> AppResult<Vec<DatingProfile>> {
            self.inner.candidate_profiles(swiper_id, limit)
        }
        fn insert_match_if_absent(&self, pair: MatchPair) -> AppResult<(Match, bool)> {
            if self.fail_next_match.swap(false, Ordering::SeqCst) {
                return Err(AppError::internal("connection reset"));
            }
            self.inner.insert_match_if_absent(pair)
        }
        fn find_match(&self, pair: MatchPair) -> AppResult<Option<Match>> {
            self.inner.find_match(pair)
        }
        fn matches_for(&self, user_id: Uuid) -> AppResult<Vec<Match>> {
            self.inner.matches_for(user_id)
        }
    }

    #[tokio::test]
    async fn repeated_like_recovers_match_lost_to_failure() {
        let store = FlakyMatchStore { inner: MemoryDatingStore::new(), fail_next_match: AtomicBool::new(false) };
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");
        let u2 = seed_profile(&store, "u2");

        record_swipe(&store, &events, u1, u2, true).await.unwrap();
        store.fail_next_match.store(true, Ordering::SeqCst);
        let err = record_swipe(&store, &events, u2, u1, true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!is_matched(&store, u1, u2).unwrap());

        let err = record_swipe(&store, &events, u2, u1, true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadySwiped);
        assert!(is_matched(&store, u1, u2).unwrap());
        assert_eq!(events.events_for(routing_keys::DATING_MATCH_CREATED).len(), 1);

        // Further repeats find the match and create nothing new.
        record_swipe(&store, &events, u1, u2, true).await.unwrap_err();
        assert_eq!(store.matches_for(u1).unwrap().len(), 1);
        assert_eq!(events.events_for(routing_keys::DATING_MATCH_CREATED).len(), 1);
    }

    #[tokio::test]
    async fn rejects_self_swipe_and_unknown_profiles() {
        let store = MemoryDatingStore::new();
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");

        let err = record_swipe(&store, &events, u1, u1, true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CannotSwipeSelf);

        let err = record_swipe(&store, &events, u1, Uuid::new_v4(), true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProfileNotFound);

        let err = record_swipe(&store, &events, Uuid::new_v4(), u1, true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProfileRequired);

        assert_eq!(swipe_count(&store, u1).unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reciprocal_likes_match_once() {
        let store = Arc::new(MemoryDatingStore::new());
        let events = Arc::new(RecordingSink::new());

        let mut pairs = Vec::new();
        for i in 0..32 {
            let a = seed_profile(store.as_ref(), &format!("a{i}"));
            let b = seed_profile(store.as_ref(), &format!("b{i}"));
            pairs.push((a, b));
        }

        let mut handles = Vec::new();
        for &(a, b) in &pairs {
            for (swiper, swiped) in [(a, b), (b, a)] {
                let store = store.clone();
                let events = events.clone();
                handles.push(tokio::spawn(async move {
                    record_swipe(store.as_ref(), events.as_ref(), swiper, swiped, true).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for &(a, b) in &pairs {
            assert_eq!(store.matches_for(a).unwrap().len(), 1);
            assert_eq!(store.matches_for(b).unwrap().len(), 1);
        }
        assert_eq!(
            events.events_for(routing_keys::DATING_MATCH_CREATED).len(),
            pairs.len()
        );
    }

    #[tokio::test]
    async fn list_matches_attaches_partner_profile() {
        let store = MemoryDatingStore::new();
        let events = RecordingSink::new();
        let u1 = seed_profile(&store, "u1");
        let u2 = seed_profile(&store, "u2");
        let u3 = seed_profile(&store, "u3");

        record_swipe(&store, &events, u1, u2, true).await.unwrap();
        record_swipe(&store, &events, u2, u1, true).await.unwrap();
        record_swipe(&store, &events, u1, u3, true).await.unwrap();

        let views = list_matches(&store, u1).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].partner_id, u2);
        assert_eq!(views[0].partner.as_ref().map(|p| p.display_name.as_str()), Some("u2"));

        assert!(list_matches(&store, u3).unwrap().is_empty());
    }
}
