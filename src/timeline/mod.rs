pub mod event;
pub mod notes;
pub mod store;
