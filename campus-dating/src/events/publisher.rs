use campus_shared::clients::events::{emit, EventSink};
use campus_shared::types::event::{payloads, routing_keys};

use crate::models::{Match, SwipeDecision};

const SOURCE: &str = "campus-dating";

pub async fn publish_swipe_recorded(events: &dyn EventSink, swipe: &SwipeDecision) {
    emit(
        events,
        SOURCE,
        routing_keys::DATING_SWIPE_RECORDED,
        swipe.swiper_id,
        payloads::SwipeRecorded {
            swipe_id: swipe.id,
            swiper_id: swipe.swiper_id,
            swiped_id: swipe.swiped_id,
            is_like: swipe.is_like,
        },
    )
    .await;
}

/// Sent once per pair, by whichever swipe created the match row.
pub async fn publish_match_created(events: &dyn EventSink, created: &Match) {
    emit(
        events,
        SOURCE,
        routing_keys::DATING_MATCH_CREATED,
        created.user1_id,
        payloads::MatchCreated {
            match_id: created.id,
            user1_id: created.user1_id,
            user2_id: created.user2_id,
        },
    )
    .await;
}
