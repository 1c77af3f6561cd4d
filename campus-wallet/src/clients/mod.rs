pub mod wallet_api;
