//! Askama views for the moderation panel.

pub mod admin;
pub mod views;
