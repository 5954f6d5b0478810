use super::{Component, Context, EnvironmentContext, Level, Transition};
use crate::{Candidate, PromptStyle, Result};

/// Bottom of the stack: lists the configured environments
#[derive(Debug, Clone, Default)]
pub struct Root {
    environments: Vec<String>,
}

impl Root {
    pub fn new(environments: Vec<String>) -> Self {
        Self { environments }
    }

    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        if !self.environments.iter().any(|env| env == line) {
            return Ok(Transition::Stay);
        }
        ctx.api.select_environment(line).await?;
        Ok(Transition::Push(Component::Environment(EnvironmentContext::new(line))))
    }
}

impl Level for Root {
    fn label(&self) -> String {
        String::new()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Default
    }

    fn completions(&self) -> Vec<Candidate> {
        self.environments.iter().map(Candidate::neutral).collect()
    }
}
