use super::{CloudspaceContext, Component, Context, Level, Transition};
use crate::{actions, render, Candidate, PromptStyle, Result};
use ovc_api::{ApiError, CloudApi, Cloudspace};

/// Cloudspaces of the environment
#[derive(Debug, Clone)]
pub struct CloudspaceList {
    cloudspaces: Vec<Cloudspace>,
}

impl CloudspaceList {
    pub fn new(cloudspaces: Vec<Cloudspace>) -> Self {
        Self { cloudspaces }
    }

    pub async fn load(api: &dyn CloudApi) -> Result<Self> {
        Ok(Self::new(api.list_cloudspaces().await?))
    }

    pub fn cloudspaces(&self) -> &[Cloudspace] {
        &self.cloudspaces
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        let name = match line {
            "print" => {
                ctx.frontend.show(&render::cloudspaces_table(&self.cloudspaces));
                return Ok(Transition::Stay);
            }
            "create" => {
                let name = ctx.frontend.ask("Name: ", None)?.trim().to_string();
                actions::create_cloudspace(&*ctx.api, &mut *ctx.frontend, &name, None, None).await?;
                self.cloudspaces = ctx.api.list_cloudspaces().await?;
                name
            }
            other => other.to_string(),
        };

        match self.cloudspaces.iter().find(|cs| cs.name == name) {
            Some(cloudspace) => Ok(Transition::Push(Component::Cloudspace(
                CloudspaceContext::new(cloudspace.clone()),
            ))),
            None => Err(ApiError::NotFound(format!("cloudspace {}", name)).into()),
        }
    }
}

impl Level for CloudspaceList {
    fn label(&self) -> String {
        "cloudspace".to_string()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Cloudspaces
    }

    fn completions(&self) -> Vec<Candidate> {
        let mut candidates = vec![Candidate::action("create"), Candidate::action("print")];
        candidates.extend(self.cloudspaces.iter().map(|cs| Candidate::neutral(&cs.name)));
        candidates
    }
}
