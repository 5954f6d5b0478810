//! `ovc zaccess`: zero-access console to a node

use anyhow::Result;
use ovc_api::CloudApi;
use ovc_core::{actions, Frontend};

pub async fn zaccess(
    api: &dyn CloudApi,
    frontend: &mut dyn Frontend,
    node: Option<&str>,
) -> Result<()> {
    let node = actions::choose_node(api, &mut *frontend, node).await?;
    tracing::debug!("Provisioning console for node {}", node.name);
    let session = api.provision_console(&node).await?;
    frontend.run_session(&session)?;
    Ok(())
}
