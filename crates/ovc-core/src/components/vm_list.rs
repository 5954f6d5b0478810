use super::{Component, Context, Level, Transition, VmContext};
use crate::{actions, render, Candidate, PromptStyle, Result};
use ovc_api::{ApiError, CloudApi, Cloudspace, Vm};

/// Virtual machines of a cloudspace
#[derive(Debug, Clone)]
pub struct VmList {
    cloudspace: Cloudspace,
    vms: Vec<Vm>,
}

impl VmList {
    pub fn new(cloudspace: Cloudspace, vms: Vec<Vm>) -> Self {
        Self { cloudspace, vms }
    }

    pub async fn load(api: &dyn CloudApi, cloudspace: Cloudspace) -> Result<Self> {
        let vms = api.list_vms(&cloudspace).await?;
        Ok(Self::new(cloudspace, vms))
    }

    pub fn vms(&self) -> &[Vm] {
        &self.vms
    }

    pub(crate) async fn transition(&mut self, line: &str, ctx: &mut Context<'_>) -> Result<Transition> {
        match line {
            "print" => {
                self.vms = ctx.api.list_vms(&self.cloudspace).await?;
                ctx.frontend.show(&render::vms_table(&self.vms));
                Ok(Transition::Stay)
            }
            "create" => {
                let spec = actions::prompt_vm_spec(&mut *ctx.frontend, ctx.defaults, None, None, None)?;
                let created = actions::create_machine(&*ctx.api, &self.cloudspace, &spec).await?;
                ctx.frontend.show(&render::vm_summary(&created.vm));
                ctx.frontend
                    .show(&render::ssh_hint(&self.cloudspace, &created.forward));
                self.vms.push(created.vm.clone());
                Ok(Transition::Push(Component::Vm(VmContext::new(
                    self.cloudspace.clone(),
                    created.vm,
                ))))
            }
            name => match self.vms.iter().find(|vm| vm.name == name) {
                Some(vm) => Ok(Transition::Push(Component::Vm(VmContext::new(
                    self.cloudspace.clone(),
                    vm.clone(),
                )))),
                None => Err(ApiError::NotFound(format!("vm {}", name)).into()),
            },
        }
    }
}

impl Level for VmList {
    fn label(&self) -> String {
        "vm".to_string()
    }

    fn style(&self) -> PromptStyle {
        PromptStyle::Machines
    }

    fn completions(&self) -> Vec<Candidate> {
        let mut candidates = vec![Candidate::action("create"), Candidate::action("print")];
        candidates.extend(self.vms.iter().map(|vm| Candidate::neutral(&vm.name)));
        candidates
    }
}
