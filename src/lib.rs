//! Moderation panel for the bamboo board.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
