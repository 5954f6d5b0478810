//! Core logic for the ovc navigation shell
//!
//! This crate provides:
//! - The single-item selector used to disambiguate names
//! - Components, one per level of the resource tree, with their
//!   completions, validation and transitions
//! - The navigation stack and the read-evaluate shell loop
//! - Operations shared by the shell and the non-interactive commands
//! - Plain-text rendering of records

pub mod actions;
mod candidate;
pub mod components;
mod error;
mod frontend;
pub mod render;
mod selector;
mod shell;
mod stack;

pub use candidate::*;
pub use components::{Component, Transition};
pub use error::*;
pub use frontend::*;
pub use selector::*;
pub use shell::*;
pub use stack::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
