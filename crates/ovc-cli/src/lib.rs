//! ovc command-line client: the interactive shell's terminal frontend and
//! the non-interactive commands

pub mod commands;
pub mod editor;
pub mod picker;
pub mod terminal;
pub mod theme;
