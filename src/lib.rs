pub mod api;
pub mod cli;
pub mod core;
pub mod events;
pub mod jobs;
pub mod notify;
pub mod reminders;
pub mod users;
