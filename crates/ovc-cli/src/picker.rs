//! Pickers used to disambiguate names on a terminal

use ovc_core::{CoreError, NumberedPicker, Picker, Result};
use std::io::{StdinLock, Stdout, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Full-text picker backed by an `fzf` binary
#[derive(Debug, Clone)]
pub struct FzfPicker {
    binary: PathBuf,
}

impl FzfPicker {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl Picker for FzfPicker {
    fn pick(&mut self, prompt: &str, items: &[String]) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["--prompt", prompt])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(items.join("\n").as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            tracing::debug!("fzf exited with {}", output.status);
            return Err(CoreError::Cancelled);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// fzf when it is installed, the numbered prompt otherwise
pub enum TerminalPicker {
    Fzf(FzfPicker),
    /// Reads through the process-wide stdin buffer so lines queued behind
    /// the answer stay available to the shell prompt
    Numbered(NumberedPicker<StdinLock<'static>, Stdout>),
}

impl TerminalPicker {
    pub fn detect() -> Self {
        match which::which("fzf") {
            Ok(path) => {
                tracing::debug!("Using fzf at {}", path.display());
                Self::Fzf(FzfPicker::new(path))
            }
            Err(_) => Self::numbered(),
        }
    }

    pub fn numbered() -> Self {
        Self::Numbered(NumberedPicker::new(std::io::stdin().lock(), std::io::stdout()))
    }
}

impl Picker for TerminalPicker {
    fn pick(&mut self, prompt: &str, items: &[String]) -> Result<String> {
        match self {
            Self::Fzf(fzf) => fzf.pick(prompt, items),
            Self::Numbered(numbered) => numbered.pick(prompt, items),
        }
    }
}
