//! Completion candidates offered at the shell prompt

/// Display category of a candidate; only affects presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// A resource name
    Neutral,
    /// Descends into a sub-menu
    Menu,
    Action,
    /// Action that destroys something
    Destructive,
}

/// One legal next input token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    pub kind: CandidateKind,
}

impl Candidate {
    pub fn new(label: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn neutral(label: impl Into<String>) -> Self {
        Self::new(label, CandidateKind::Neutral)
    }

    pub fn menu(label: impl Into<String>) -> Self {
        Self::new(label, CandidateKind::Menu)
    }

    pub fn action(label: impl Into<String>) -> Self {
        Self::new(label, CandidateKind::Action)
    }

    pub fn destructive(label: impl Into<String>) -> Self {
        Self::new(label, CandidateKind::Destructive)
    }

    /// Exact-prefix match against what has been typed so far
    pub fn matches_prefix(&self, typed: &str) -> bool {
        self.label.starts_with(typed)
    }
}

/// Labels of `candidates` in order
pub fn labels(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.label.as_str()).collect()
}
