pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fare;
pub mod geo;
pub mod hub;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod routing;
pub mod settlement;
pub mod state;
pub mod storage;
pub mod users;
