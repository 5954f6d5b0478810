//! Non-interactive command implementations
//!
//! Every command runs against an already selected environment. Names given
//! on the command line are substring filters resolved through the selector.

pub mod cloudspace;
mod console;
pub mod forwarding;
mod shell;
pub mod vm;

use anyhow::Result;
use ovc_core::Frontend;

pub use console::zaccess;
pub use shell::shell;

/// Ask before destroying something unless `--yes` was given
fn confirmed(frontend: &mut dyn Frontend, question: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if frontend.confirm(question)? {
        return Ok(true);
    }
    frontend.show("Aborted.");
    Ok(false)
}
