pub mod admin;
pub mod auth;
pub mod dto;
pub mod order;
pub mod user;
