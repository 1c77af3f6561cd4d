pub mod feed_service;
pub mod profile_service;
pub mod swipe_service;
