//! Panel state machines and the ports they drive.

pub mod board;
pub mod error;
pub mod moderation;
pub mod notice;
pub mod pagination;
pub mod panel;
pub mod session;
pub mod stream;
