//! `ovc forwarding` commands

use super::confirmed;
use anyhow::Result;
use ovc_api::CloudApi;
use ovc_core::{actions, render, Frontend};

pub async fn list(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    cloudspace: Option<&str>,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, cloudspace).await?;
    let forwards = api.list_forwards(&cloudspace).await?;
    frontend.show(&render::forwards_table(&forwards));
    Ok(())
}

/// Forward a public port to a machine; the public port is picked
/// automatically when not given
pub async fn create(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    cloudspace: Option<&str>,
    machine: Option<&str>,
    public_port: Option<u16>,
    private_port: u16,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, cloudspace).await?;
    let vm = actions::choose_vm(api, &cloudspace, &mut *frontend, machine).await?;

    let forward = api
        .create_forward(&cloudspace, &vm.name, public_port, private_port)
        .await?;
    frontend.show(&render::forward_line(&forward));
    Ok(())
}

pub async fn delete(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    cloudspace: Option<&str>,
    public_port: u16,
    yes: bool,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, cloudspace).await?;

    let question = format!("Are you sure you want to delete forward {}", public_port);
    if !confirmed(frontend, &question, yes)? {
        return Ok(());
    }

    api.delete_forward(&cloudspace, public_port).await?;
    frontend.show(&format!(
        "Deleted forward {} of cloudspace {}",
        public_port, cloudspace.name
    ));
    Ok(())
}
