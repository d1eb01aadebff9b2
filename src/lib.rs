pub mod api;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod entities;
pub mod error;
pub mod external;
pub mod state;
