// src/handlers/mod.rs

pub mod auth;
pub mod misc;
pub mod oauth;
pub mod recipes;
pub mod users;
