//! Shared primitives and traits for the Lexome single-cell ecosystem.
//!
//! `lexome-core` provides the foundation the other Lexome crates build on:
//!
//! - **Error types** — [`LexomeError`] and [`Result`] for structured error handling
//! - **Traits** — Core abstractions like [`Summarizable`], [`Scored`], [`Annotated`]

pub mod error;
pub mod traits;

pub use error::{LexomeError, Result};
pub use traits::*;
