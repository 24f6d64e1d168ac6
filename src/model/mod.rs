pub mod auth;
pub mod candidate;
pub mod chat;
pub mod id;
pub mod poll;
pub mod reference;
pub mod results;
pub mod shop;
pub mod trend;
pub mod user;
pub mod vote;
