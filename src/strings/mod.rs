//! # Strings Module
//!
//! Centralizes user-facing strings and the card template assets.
//! Ensures consistency in messaging and keeps the visual layout as data.

pub mod messages;
pub mod templates;
