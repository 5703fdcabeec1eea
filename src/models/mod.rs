pub mod driver;
pub mod event;
pub mod ride;
pub mod user;
