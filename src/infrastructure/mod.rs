//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatChannel,
//! NewsSource, Compositor).

pub mod browser;
pub mod matrix;
pub mod news;
