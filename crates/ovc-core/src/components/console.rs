use super::{Context, Level, Transition};
use crate::{Candidate, PromptStyle, Result};
use ovc_api::{CloudApi, Node};

/// Nodes of the environment reachable over zero-access
#[derive(Debug, Clone)]
pub struct Console {
    nodes: Vec<Node>,
}

impl Console {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub async fn load(api: &dyn CloudApi) -> Result<Self> {
        Ok(Self::new(api.list_nodes().await?))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Opens a session and returns to the console once it ends
    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        if let Some(node) = self.nodes.iter().find(|node| node.name == line) {
            let session = ctx.api.provision_console(node).await?;
            ctx.frontend.run_session(&session)?;
        }
        Ok(Transition::Stay)
    }
}

impl Level for Console {
    fn label(&self) -> String {
        "console".to_string()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Console
    }

    fn completions(&self) -> Vec<Candidate> {
        self.nodes.iter().map(|node| Candidate::neutral(&node.name)).collect()
    }
}
