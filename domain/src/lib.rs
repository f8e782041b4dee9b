pub mod core;
pub mod error;
pub mod session;
pub mod slots;
pub mod timers;
pub mod ui;
pub mod user;
pub mod validation;

pub use database_adapter::db::{DbError, SlotStore};
