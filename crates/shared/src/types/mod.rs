//! Common types used across the application.

pub mod date_key;

pub use date_key::DateKey;
