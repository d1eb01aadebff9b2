pub mod ride_service;
pub mod terminal;
