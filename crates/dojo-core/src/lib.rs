//! Core types and trait definitions for the Dojo academy backend.
//!
//! No HTTP or database dependencies live here; the store backend and the API
//! crate both build on these types.

pub mod belt;
pub mod billing;
pub mod class;
pub mod error;
pub mod principal;
pub mod promotion;
pub mod store;
pub mod student;

pub use error::{Error, Result};
