//! `ovc vm` commands

use super::confirmed;
use anyhow::Result;
use ovc_api::CloudApi;
use ovc_config::DefaultsConfig;
use ovc_core::{actions, render, Frontend};

/// Create a machine with an SSH forward; memory and vcpus fall back to the
/// configured defaults, a missing name is asked for
pub async fn create(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    defaults: &DefaultsConfig,
    cloudspace: Option<&str>,
    name: Option<String>,
    memory: Option<u32>,
    vcpus: Option<u32>,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, cloudspace).await?;
    let spec = actions::prompt_vm_spec(
        frontend,
        defaults,
        name,
        Some(memory.unwrap_or(defaults.memory)),
        Some(vcpus.unwrap_or(defaults.vcpus)),
    )?;

    frontend.show("Creating VM");
    let created = actions::create_machine(api, &cloudspace, &spec).await?;
    frontend.show(&render::vm_summary(&created.vm));
    frontend.show(&render::ssh_hint(&cloudspace, &created.forward));
    Ok(())
}

pub async fn list(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    cloudspace: Option<&str>,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, cloudspace).await?;
    let vms = api.list_vms(&cloudspace).await?;
    frontend.show(&render::vms_table(&vms));
    Ok(())
}

pub async fn delete(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    cloudspace: Option<&str>,
    name: Option<&str>,
    yes: bool,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, cloudspace).await?;
    let vm = actions::choose_vm(api, &cloudspace, &mut *frontend, name).await?;

    let question = format!("Are you sure you want to delete vm {}", vm.name);
    if !confirmed(frontend, &question, yes)? {
        return Ok(());
    }

    api.delete_vm(&vm).await?;
    frontend.show(&format!("Deleted vm {}", vm.name));
    Ok(())
}
