//! `ovc cloudspace` commands

use super::confirmed;
use anyhow::Result;
use ovc_api::CloudApi;
use ovc_core::{actions, render, Frontend};

pub async fn list(api: &dyn CloudApi, frontend: &mut dyn Frontend) -> Result<()> {
    let cloudspaces = api.list_cloudspaces().await?;
    frontend.show(&render::cloudspaces_table(&cloudspaces));
    Ok(())
}

/// Create a cloudspace; the account filter goes through the selector
pub async fn create(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    name: Option<String>,
    account: Option<&str>,
    cloudspace_type: Option<&str>,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => frontend.ask("Enter name: ", None)?,
    };
    let name = name.trim();

    actions::create_cloudspace(api, &mut *frontend, name, account, cloudspace_type).await?;
    frontend.show(&format!("Created cloudspace {}", name));
    Ok(())
}

pub async fn delete(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    name: Option<&str>,
    yes: bool,
) -> Result<()> {
    let cloudspace = actions::choose_cloudspace(api, &mut *frontend, name).await?;

    let question = format!("Are you sure you want to delete cloudspace {}", cloudspace.name);
    if !confirmed(frontend, &question, yes)? {
        return Ok(());
    }

    api.delete_cloudspace(&cloudspace).await?;
    frontend.show(&format!("Deleted cloudspace {}", cloudspace.name));
    Ok(())
}
