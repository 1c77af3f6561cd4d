pub mod health;
pub mod remote;
pub mod savings;
pub mod wallet;
