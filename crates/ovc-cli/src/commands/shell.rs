//! Interactive navigation shell

use anyhow::Result;
use ovc_api::CloudApi;
use ovc_config::DefaultsConfig;
use ovc_core::{Frontend, Shell};

/// Run the shell, entering the environment matching `env` first when given
pub async fn shell(
    api: &mut dyn CloudApi,
    frontend: &mut dyn Frontend,
    defaults: DefaultsConfig,
    env: Option<&str>,
) -> Result<()> {
    let mut shell = Shell::new(api, frontend, defaults);
    if let Some(env) = env {
        shell.preselect(env).await?;
    }
    shell.run().await?;
    Ok(())
}
