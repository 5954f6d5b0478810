//! Components, one per level of the resource tree
//!
//! Every level offers completions for the prompt, validates a typed line
//! against them and computes the stack effect of an accepted line.
//! [`Component`] is the closed set of levels; the per-level behavior lives
//! in the variant structs and is dispatched by `match`.

mod cloudspace;
mod cloudspace_list;
mod console;
mod environment;
mod forward_list;
mod root;
mod vm;
mod vm_list;

pub use cloudspace::CloudspaceContext;
pub use cloudspace_list::CloudspaceList;
pub use console::Console;
pub use environment::EnvironmentContext;
pub use forward_list::ForwardList;
pub use root::Root;
pub use vm::{parse_createforward, ForwardRequest, VmContext};
pub use vm_list::VmList;

use crate::{Candidate, Frontend, InputError, PromptStyle, Result};
use ovc_api::CloudApi;
use ovc_config::DefaultsConfig;

/// Pops one level
pub const PARENT: &str = "..";
/// Truncates the stack back to the root
pub const ROOT: &str = "/";

/// Effect of an accepted line on the navigation stack
#[derive(Debug)]
pub enum Transition {
    Push(Component),
    Pop,
    Reset,
    /// Side effect only, or nothing at all
    Stay,
}

/// Collaborators available to a transition
pub struct Context<'a> {
    pub api: &'a mut dyn CloudApi,
    pub frontend: &'a mut dyn Frontend,
    pub defaults: &'a DefaultsConfig,
}

/// Behavior shared by every level
pub trait Level {
    /// Breadcrumb label
    fn label(&self) -> String;

    fn style(&self) -> PromptStyle;

    /// Legal next tokens, recomputed on every prompt render
    fn completions(&self) -> Vec<Candidate>;

    /// Accept exactly a completion label or a navigation token
    fn validate(&self, line: &str) -> std::result::Result<(), InputError> {
        validate_against(&self.completions(), line)
    }
}

/// Default validation: `line` must equal a label of `candidates`, or be
/// `..` or `/`
pub fn validate_against(
    candidates: &[Candidate],
    line: &str,
) -> std::result::Result<(), InputError> {
    if is_navigation(line) || candidates.iter().any(|c| c.label == line) {
        Ok(())
    } else {
        Err(InputError::InvalidAction)
    }
}

pub fn is_navigation(line: &str) -> bool {
    line == PARENT || line == ROOT
}

/// One level of the navigation tree
#[derive(Debug, Clone)]
pub enum Component {
    Root(Root),
    Environment(EnvironmentContext),
    CloudspaceList(CloudspaceList),
    Cloudspace(CloudspaceContext),
    VmList(VmList),
    Vm(VmContext),
    ForwardList(ForwardList),
    Console(Console),
}

macro_rules! each_level {
    ($component:expr, $level:ident => $body:expr) => {
        match $component {
            Component::Root($level) => $body,
            Component::Environment($level) => $body,
            Component::CloudspaceList($level) => $body,
            Component::Cloudspace($level) => $body,
            Component::VmList($level) => $body,
            Component::Vm($level) => $body,
            Component::ForwardList($level) => $body,
            Component::Console($level) => $body,
        }
    };
}

impl Component {
    pub fn label(&self) -> String {
        each_level!(self, level => level.label())
    }

    pub fn style(&self) -> PromptStyle {
        each_level!(self, level => level.style())
    }

    pub fn completions(&self) -> Vec<Candidate> {
        each_level!(self, level => level.completions())
    }

    /// Candidates whose label starts with what has been typed
    pub fn matching(&self, typed: &str) -> Vec<Candidate> {
        self.completions()
            .into_iter()
            .filter(|c| c.matches_prefix(typed))
            .collect()
    }

    pub fn validate(&self, line: &str) -> std::result::Result<(), InputError> {
        each_level!(self, level => level.validate(line))
    }

    /// Compute the stack effect of an accepted line, running any remote side
    /// effect it implies. The stack itself is left to the caller.
    pub async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        match line {
            PARENT => return Ok(Transition::Pop),
            ROOT => return Ok(Transition::Reset),
            _ => {}
        }
        tracing::debug!("{} at '{}' handles {:?}", self.kind(), self.label(), line);

        match self {
            Component::Root(level) => level.transition(line, ctx).await,
            Component::Environment(level) => level.transition(line, ctx).await,
            Component::CloudspaceList(level) => level.transition(line, ctx).await,
            Component::Cloudspace(level) => level.transition(line, ctx).await,
            Component::VmList(level) => level.transition(line, ctx).await,
            Component::Vm(level) => level.transition(line, ctx).await,
            Component::ForwardList(level) => level.transition(line, ctx).await,
            Component::Console(level) => level.transition(line, ctx).await,
        }
    }

    /// Variant name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Component::Root(_) => "root",
            Component::Environment(_) => "environment",
            Component::CloudspaceList(_) => "cloudspace list",
            Component::Cloudspace(_) => "cloudspace",
            Component::VmList(_) => "vm list",
            Component::Vm(_) => "vm",
            Component::ForwardList(_) => "forward list",
            Component::Console(_) => "console",
        }
    }
}
