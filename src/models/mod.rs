// src/models/mod.rs

pub mod comment;
pub mod recipe;
pub mod user;
