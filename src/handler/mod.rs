pub mod auth;
pub mod chat;
pub mod disputes;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod services;
pub mod technicians;
pub mod users;
