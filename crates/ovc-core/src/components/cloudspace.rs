use super::{Component, Context, ForwardList, Level, Transition, VmList};
use crate::{Candidate, PromptStyle, Result};
use ovc_api::Cloudspace;

/// A single cloudspace
#[derive(Debug, Clone)]
pub struct CloudspaceContext {
    cloudspace: Cloudspace,
}

impl CloudspaceContext {
    pub fn new(cloudspace: Cloudspace) -> Self {
        Self { cloudspace }
    }

    pub fn cloudspace(&self) -> &Cloudspace {
        &self.cloudspace
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        match line {
            "vm" => {
                let list = VmList::load(&*ctx.api, self.cloudspace.clone()).await?;
                Ok(Transition::Push(Component::VmList(list)))
            }
            "forwards" => {
                let list = ForwardList::load(&*ctx.api, self.cloudspace.clone()).await?;
                Ok(Transition::Push(Component::ForwardList(list)))
            }
            "delete" => {
                let question = format!(
                    "Are you sure you want to delete cloudspace {}",
                    self.cloudspace.name
                );
                if !ctx.frontend.confirm(&question)? {
                    return Ok(Transition::Stay);
                }
                ctx.api.delete_cloudspace(&self.cloudspace).await?;
                tracing::info!("Deleted cloudspace {}", self.cloudspace.name);
                Ok(Transition::Pop)
            }
            _ => Ok(Transition::Stay),
        }
    }
}

impl Level for CloudspaceContext {
    fn label(&self) -> String {
        self.cloudspace.name.clone()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Cloudspace
    }

    fn completions(&self) -> Vec<Candidate> {
        vec![
            Candidate::menu("vm"),
            Candidate::menu("forwards"),
            Candidate::destructive("delete"),
        ]
    }
}
