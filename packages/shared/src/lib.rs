//! Utilities shared between the Hanashi server binary and its library crates.

pub mod logger;
pub mod time;
