//! Configuration for ovc
//!
//! Located at `~/.config/ovc/config.toml`. Holds the known environments,
//! itsyou.online client credentials with the tokens cached per environment,
//! and the defaults used when creating machines and forwards.

mod error;
mod global;

pub use error::*;
pub use global::*;
