use super::{CloudspaceList, Component, Console, Context, Level, Transition};
use crate::{Candidate, PromptStyle, Result};

/// An environment with an authenticated session
#[derive(Debug, Clone)]
pub struct EnvironmentContext {
    environment: String,
}

impl EnvironmentContext {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        let next = match line {
            "console" => Component::Console(Console::load(ctx.api).await?),
            "cloudspace" => Component::CloudspaceList(CloudspaceList::load(ctx.api).await?),
            _ => return Ok(Transition::Stay),
        };
        Ok(Transition::Push(next))
    }
}

impl Level for EnvironmentContext {
    /// Last dot-separated segment: `prod.be-g8-1` shows as `be-g8-1`
    fn label(&self) -> String {
        self.environment
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Environment
    }

    fn completions(&self) -> Vec<Candidate> {
        vec![Candidate::menu("console"), Candidate::menu("cloudspace")]
    }
}
