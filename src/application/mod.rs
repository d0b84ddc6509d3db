//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot: the
//! card renderer, the report pipeline, and the trigger listener.

pub mod card;
pub mod listener;
pub mod pipeline;
