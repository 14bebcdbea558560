pub mod admin;
pub mod auth;
pub mod channels;
pub mod dms;
pub mod error;
pub mod messages;
pub mod notifications;
pub mod other;
pub mod search;
pub mod standups;
pub mod stats;
pub mod token;
