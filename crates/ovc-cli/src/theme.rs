//! Colors for the shell prompt and completion hints

use crossterm::style::Color;
use ovc_core::{CandidateKind, PromptStyle};

/// Explicit color configuration handed to the terminal frontend
#[derive(Debug, Clone)]
pub struct Theme {
    pub text: Color,
    pub environment: Color,
    pub cloudspaces: Color,
    pub cloudspace: Color,
    pub machines: Color,
    pub machine: Color,
    pub forwards: Color,
    pub console: Color,
    pub action: Color,
    pub destructive: Color,
    pub menu: Color,
    pub neutral: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Grey,
            environment: Color::DarkYellow,
            cloudspaces: Color::DarkBlue,
            cloudspace: Color::DarkMagenta,
            machines: Color::DarkCyan,
            machine: Color::Grey,
            forwards: Color::DarkCyan,
            console: Color::DarkBlue,
            action: Color::Green,
            destructive: Color::Red,
            menu: Color::Blue,
            neutral: Color::Grey,
            error: Color::Red,
        }
    }
}

impl Theme {
    pub fn prompt_color(&self, style: PromptStyle) -> Color {
        match style {
            PromptStyle::Default => self.text,
            PromptStyle::Environment => self.environment,
            PromptStyle::Cloudspaces => self.cloudspaces,
            PromptStyle::Cloudspace => self.cloudspace,
            PromptStyle::Machines => self.machines,
            PromptStyle::Machine => self.machine,
            PromptStyle::Forwards => self.forwards,
            PromptStyle::Console => self.console,
        }
    }

    pub fn candidate_color(&self, kind: CandidateKind) -> Color {
        match kind {
            CandidateKind::Neutral => self.neutral,
            CandidateKind::Menu => self.menu,
            CandidateKind::Action => self.action,
            CandidateKind::Destructive => self.destructive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructive_stands_out() {
        let theme = Theme::default();
        assert_eq!(theme.candidate_color(CandidateKind::Destructive), Color::Red);
        assert_ne!(
            theme.candidate_color(CandidateKind::Action),
            theme.candidate_color(CandidateKind::Destructive)
        );
        assert_eq!(theme.prompt_color(PromptStyle::Environment), Color::DarkYellow);
    }
}
