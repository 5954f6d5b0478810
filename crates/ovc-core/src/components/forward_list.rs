use super::{is_navigation, Context, Level, Transition};
use crate::{render, Candidate, InputError, PromptStyle, Result};
use ovc_api::{CloudApi, Cloudspace, Forward};

/// Port forwarding rules of a cloudspace
///
/// The cached rules are only refreshed by `print`; deleting a rule leaves
/// them as they were.
#[derive(Debug, Clone)]
pub struct ForwardList {
    cloudspace: Cloudspace,
    forwards: Vec<Forward>,
}

impl ForwardList {
    pub fn new(cloudspace: Cloudspace, forwards: Vec<Forward>) -> Self {
        Self {
            cloudspace,
            forwards,
        }
    }

    pub async fn load(api: &dyn CloudApi, cloudspace: Cloudspace) -> Result<Self> {
        let forwards = api.list_forwards(&cloudspace).await?;
        Ok(Self::new(cloudspace, forwards))
    }

    pub fn forwards(&self) -> &[Forward] {
        &self.forwards
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        if line == "print" {
            self.forwards = ctx.api.list_forwards(&self.cloudspace).await?;
            ctx.frontend.show(&render::forwards_table(&self.forwards));
            return Ok(Transition::Stay);
        }

        let port = parse_delete(line)?;
        let question = format!("Are you sure you want to delete forward {}", port);
        if ctx.frontend.confirm(&question)? {
            ctx.api.delete_forward(&self.cloudspace, port).await?;
            tracing::info!("Deleted forward {} on {}", port, self.cloudspace.name);
        }
        Ok(Transition::Stay)
    }
}

/// Public port of a `delete <publicport>` line
fn parse_delete(line: &str) -> std::result::Result<u16, InputError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("delete") {
        return Err(InputError::InvalidAction);
    }
    match (tokens.next(), tokens.next()) {
        (Some(port), None) if port.bytes().all(|b| b.is_ascii_digit()) => {
            port.parse().map_err(|_| InputError::PublicPortNotNumber)
        }
        _ => Err(InputError::PublicPortNotNumber),
    }
}

impl Level for ForwardList {
    fn label(&self) -> String {
        "forwards".to_string()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Forwards
    }

    fn completions(&self) -> Vec<Candidate> {
        vec![Candidate::action("print"), Candidate::destructive("delete")]
    }

    fn validate(&self, line: &str) -> std::result::Result<(), InputError> {
        if line == "print" || is_navigation(line) {
            return Ok(());
        }
        parse_delete(line).map(|_| ())
    }
}
