pub mod savings_service;
