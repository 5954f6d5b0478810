use super::{validate_against, Context, Level, Transition};
use crate::{render, Candidate, CoreError, InputError, PromptStyle, Result};
use ovc_api::{Cloudspace, Vm, VmAction, VmStatus};

const CREATEFORWARD: &str = "createforward";
const CREATEFORWARD_USAGE: &str = "Invalid call, usages:\n createforward [publicport] privateport";

/// Ports of a `createforward` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Picked by the collaborator when absent
    pub public_port: Option<u16>,
    pub private_port: u16,
}

/// Parse `createforward <privateport>` or
/// `createforward <publicport> <privateport>`
pub fn parse_createforward(line: &str) -> Result<ForwardRequest> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&CREATEFORWARD) || !(2..=3).contains(&tokens.len()) {
        return Err(CoreError::Grammar(CREATEFORWARD_USAGE.to_string()));
    }

    let mut ports = Vec::with_capacity(2);
    for token in &tokens[1..] {
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::Grammar("Ports should be numbers".to_string()));
        }
        match token.parse::<u16>() {
            Ok(port) if port > 0 => ports.push(port),
            _ => {
                return Err(CoreError::Grammar(format!(
                    "Port {} is out of range (1-65535)",
                    token
                )))
            }
        }
    }

    Ok(match ports.as_slice() {
        [private] => ForwardRequest {
            public_port: None,
            private_port: *private,
        },
        [public, private] => ForwardRequest {
            public_port: Some(*public),
            private_port: *private,
        },
        _ => return Err(CoreError::Grammar(CREATEFORWARD_USAGE.to_string())),
    })
}

fn is_createforward(line: &str) -> bool {
    line.split_whitespace().next() == Some(CREATEFORWARD)
}

/// A single virtual machine; the only level whose record changes in place
#[derive(Debug, Clone)]
pub struct VmContext {
    cloudspace: Cloudspace,
    vm: Vm,
}

impl VmContext {
    pub fn new(cloudspace: Cloudspace, vm: Vm) -> Self {
        Self { cloudspace, vm }
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Power actions legal in the current status
    pub fn status_actions(&self) -> &'static [VmAction] {
        match &self.vm.status {
            VmStatus::Running => &[VmAction::Stop, VmAction::Reboot, VmAction::Pause],
            VmStatus::Halted => &[VmAction::Start],
            VmStatus::Paused => &[VmAction::Resume, VmAction::Stop],
            VmStatus::Unknown(_) => &[],
        }
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        if is_createforward(line) {
            let request = match parse_createforward(line) {
                Ok(request) => request,
                Err(CoreError::Grammar(usage)) => {
                    ctx.frontend.show(&usage);
                    return Ok(Transition::Stay);
                }
                Err(e) => return Err(e),
            };
            let forward = ctx
                .api
                .create_forward(
                    &self.cloudspace,
                    &self.vm.name,
                    request.public_port,
                    request.private_port,
                )
                .await?;
            ctx.frontend.show(&render::forward_line(&forward));
            return Ok(Transition::Stay);
        }

        match line {
            "print" => {
                self.vm = ctx.api.vm_action(VmAction::Get, self.vm.id).await?;
                ctx.frontend.show(&render::vm_yaml(&self.vm)?);
                Ok(Transition::Stay)
            }
            "delete" => {
                let question = format!("Are you sure you want to delete vm {}", self.vm.name);
                if !ctx.frontend.confirm(&question)? {
                    return Ok(Transition::Stay);
                }
                ctx.api.delete_vm(&self.vm).await?;
                tracing::info!("Deleted vm {}", self.vm.name);
                Ok(Transition::Pop)
            }
            token => {
                let Ok(action) = token.parse::<VmAction>() else {
                    return Ok(Transition::Stay);
                };
                if !self.status_actions().contains(&action) {
                    return Err(InputError::InvalidAction.into());
                }
                self.vm = ctx.api.vm_action(action, self.vm.id).await?;
                ctx.frontend
                    .show(&format!("{} is {}", self.vm.name, self.vm.status));
                Ok(Transition::Stay)
            }
        }
    }
}

impl Level for VmContext {
    fn label(&self) -> String {
        self.vm.name.clone()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Machine
    }

    fn completions(&self) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .status_actions()
            .iter()
            .map(|action| Candidate::action(action.as_str()))
            .collect();
        candidates.push(Candidate::action(CREATEFORWARD));
        candidates.push(Candidate::action("print"));
        candidates.push(Candidate::destructive("delete"));
        candidates
    }

    /// `createforward` lines are accepted here and checked by their grammar
    /// on transition, where a malformed one prints the usage
    fn validate(&self, line: &str) -> std::result::Result<(), InputError> {
        if is_createforward(line) {
            return Ok(());
        }
        validate_against(&self.completions(), line)
    }
}
