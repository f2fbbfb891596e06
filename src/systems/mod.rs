//! Mutation entry points grouped by concern
//!
//! Free functions over `&mut World`, validating completely before writing.
//! The command layer calls these; the tick scheduler drives the time-based
//! ones.

pub mod claims;
pub mod diplomacy;
pub mod power;
pub mod tick;
pub mod war;
