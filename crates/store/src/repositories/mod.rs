//! Collection-level load/save operations on [`JsonStore`](crate::JsonStore).
//!
//! Loads never fail: a missing or corrupt document yields an empty (or
//! default) collection and a logged warning. Saves report their errors.

pub mod draft;
pub mod email;
pub mod prompt;
