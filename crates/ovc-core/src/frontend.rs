//! The interaction seam between the shell and the terminal

use crate::{Component, Picker, Result};
use ovc_api::ConsoleSession;

/// Style tag of a breadcrumb segment; the terminal maps it to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptStyle {
    Default,
    Environment,
    Cloudspaces,
    Cloudspace,
    Machines,
    Machine,
    Forwards,
    Console,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSegment {
    pub text: String,
    pub style: PromptStyle,
}

impl PromptSegment {
    pub fn new(text: impl Into<String>, style: PromptStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Breadcrumb prompt: component labels separated by `/`, closed by ` > `
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub segments: Vec<PromptSegment>,
}

impl Prompt {
    /// The prompt without styling
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Everything a transition or the shell loop needs from the user
pub trait Frontend: Picker {
    /// Read one accepted line for `top`, with live completion and validation.
    /// `None` means end of input or interrupt.
    fn read_command(&mut self, prompt: &Prompt, top: &Component) -> std::io::Result<Option<String>>;

    /// Yes/no question, defaulting to no
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Free-text question with an optional prefilled default
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String>;

    /// Informational output
    fn show(&mut self, text: &str);

    fn error(&mut self, text: &str);

    /// Run an interactive console session, blocking until it ends
    fn run_session(&mut self, session: &ConsoleSession) -> Result<()>;
}
