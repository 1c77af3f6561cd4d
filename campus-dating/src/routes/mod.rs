pub mod feed;
pub mod health;
pub mod matches;
pub mod profile;
pub mod swipes;
