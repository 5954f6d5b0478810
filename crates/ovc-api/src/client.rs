//! HTTP/JSON client for the OpenvCloud `restmachine` API

use crate::{
    jwt, next_free_port, Account, ApiError, CloudApi, Cloudspace, ConsoleSession, Forward, Image,
    Location, Node, Result, Vm, VmAction, VmSpec,
};
use async_trait::async_trait;
use ovc_config::OvcConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Authenticated context for the selected environment
#[derive(Debug, Clone)]
struct EnvSession {
    name: String,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct WhoAmI {
    name: String,
}

/// [`CloudApi`] implementation talking to an OpenvCloud environment
pub struct OvcClient {
    config: OvcConfig,
    /// Where refreshed tokens are persisted; `None` keeps them in memory only
    config_path: Option<PathBuf>,
    http: reqwest::Client,
    session: Option<EnvSession>,
}

impl OvcClient {
    pub fn new(config: OvcConfig) -> Self {
        Self {
            config,
            config_path: None,
            http: reqwest::Client::new(),
            session: None,
        }
    }

    /// Persist refreshed tokens to `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn config(&self) -> &OvcConfig {
        &self.config
    }

    fn session(&self) -> Result<&EnvSession> {
        self.session.as_ref().ok_or(ApiError::NoEnvironment)
    }

    /// Reuse the cached token for `environment` or request a new one
    async fn token_for(&mut self, environment: &str) -> Result<String> {
        if let Some(token) = self.config.cached_token(environment) {
            if !jwt::is_expired(token) {
                tracing::debug!("Using cached token for {}", environment);
                return Ok(token.to_string());
            }
            tracing::debug!("Cached token for {} expired", environment);
        }

        let (client_id, client_secret) = self.config.credentials()?;
        let url = format!(
            "{}/v1/oauth/access_token",
            self.config.iyo.url.trim_end_matches('/')
        );
        let scope = format!("user:memberof:{}.0-access,user:publickey:ssh", environment);

        tracing::info!("Requesting a new token for {}", environment);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("response_type", "id_token"),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "itsyou.online returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Auth(format!("Malformed token response: {}", e)))?;

        self.config.store_token(environment, token.access_token.clone());
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                tracing::warn!("Could not cache token in {:?}: {}", path, e);
            }
        }

        Ok(token.access_token)
    }

    /// POST a JSON body to `restmachine/<endpoint>` and return the raw body
    async fn post(&self, endpoint: &str, body: Value) -> Result<String> {
        let session = self.session()?;
        let url = format!("{}/restmachine/{}", session.base_url, endpoint);
        tracing::debug!("POST {} {}", url, body);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text.trim().to_string(),
            });
        }
        Ok(text)
    }

    async fn call<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> Result<T> {
        let text = self.post(endpoint, body).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{}: {}", endpoint, e)))
    }

    async fn get_vm(&self, vm_id: u64) -> Result<Vm> {
        self.call("cloudapi/machines/get", json!({ "machineId": vm_id }))
            .await
    }

    /// cloud-init userdata authorizing the configured key for root
    fn userdata(&self) -> Result<Value> {
        let key_path = self.config.defaults.ssh_key_path();
        if !key_path.exists() {
            tracing::debug!("No ssh key at {:?}, creating machine without userdata", key_path);
            return Ok(Value::Null);
        }
        let pubkey = std::fs::read_to_string(&key_path)?;
        Ok(json!({
            "users": [{
                "name": "root",
                "ssh-authorized-keys": [pubkey.trim()],
                "shell": "/bin/bash",
            }]
        }))
    }
}

#[async_trait]
impl CloudApi for OvcClient {
    fn environments(&self) -> Vec<String> {
        self.config.environment_names()
    }

    fn environment(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    async fn select_environment(&mut self, name: &str) -> Result<()> {
        let base_url = self
            .config
            .base_url(name)
            .map_err(|_| ApiError::UnknownEnvironment(name.to_string()))?;
        let token = self.token_for(name).await?;
        tracing::debug!("Selected environment {} at {}", name, base_url);
        self.session = Some(EnvSession {
            name: name.to_string(),
            base_url,
            token,
        });
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.call("cloudapi/accounts/list", json!({})).await
    }

    async fn list_cloudspaces(&self) -> Result<Vec<Cloudspace>> {
        self.call("cloudapi/cloudspaces/list", json!({})).await
    }

    async fn create_cloudspace(
        &self,
        name: &str,
        account_id: u64,
        cloudspace_type: Option<&str>,
    ) -> Result<()> {
        let whoami: WhoAmI = self.call("system/usermanager/whoami", json!({})).await?;
        let locations: Vec<Location> = self.call("cloudapi/locations/list", json!({})).await?;
        let location = locations
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("location".to_string()))?;

        let mut body = json!({
            "accountId": account_id,
            "name": name,
            "access": whoami.name,
            "location": location.location_code,
        });
        if let Some(cs_type) = cloudspace_type {
            body["type"] = json!(cs_type);
        }

        tracing::info!("Creating cloudspace {}", name);
        self.post("cloudapi/cloudspaces/create", body).await?;
        Ok(())
    }

    async fn delete_cloudspace(&self, cloudspace: &Cloudspace) -> Result<()> {
        tracing::info!("Destroying cloudspace {}", cloudspace.name);
        self.post(
            "cloudbroker/cloudspace/destroy",
            json!({
                "cloudspaceId": cloudspace.id,
                "permanently": true,
                "reason": "From CLI",
            }),
        )
        .await?;
        Ok(())
    }

    async fn list_vms(&self, cloudspace: &Cloudspace) -> Result<Vec<Vm>> {
        self.call(
            "cloudapi/machines/list",
            json!({ "cloudspaceId": cloudspace.id }),
        )
        .await
    }

    async fn create_vm(&self, cloudspace: &Cloudspace, spec: &VmSpec) -> Result<Vm> {
        let wanted = &self.config.defaults.image;
        let image = self
            .list_images()
            .await?
            .into_iter()
            .find(|image| image.name.contains(wanted.as_str()))
            .ok_or_else(|| ApiError::NotFound(format!("image matching '{}'", wanted)))?;

        let body = json!({
            "cloudspaceId": cloudspace.id,
            "name": spec.name,
            "description": spec.name,
            "memory": spec.memory,
            "vcpus": spec.vcpus,
            "imageId": image.id,
            "disksize": self.config.defaults.disk_size,
            "userdata": self.userdata()?,
        });

        tracing::info!("Creating vm {} from image {}", spec.name, image.name);
        let machine_id: u64 = self.call("cloudapi/machines/create", body).await?;
        self.get_vm(machine_id).await
    }

    async fn delete_vm(&self, vm: &Vm) -> Result<()> {
        tracing::info!("Deleting vm {}", vm.name);
        self.post(
            "cloudapi/machines/delete",
            json!({ "machineId": vm.id, "permanently": true }),
        )
        .await?;
        Ok(())
    }

    async fn vm_action(&self, action: VmAction, vm_id: u64) -> Result<Vm> {
        if action != VmAction::Get {
            tracing::debug!("Running {} on machine {}", action, vm_id);
            self.post(
                &format!("cloudapi/machines/{}", action),
                json!({ "machineId": vm_id }),
            )
            .await?;
        }
        self.get_vm(vm_id).await
    }

    async fn list_forwards(&self, cloudspace: &Cloudspace) -> Result<Vec<Forward>> {
        self.call(
            "cloudapi/portforwarding/list",
            json!({ "cloudspaceId": cloudspace.id }),
        )
        .await
    }

    async fn create_forward(
        &self,
        cloudspace: &Cloudspace,
        vm_name: &str,
        public_port: Option<u16>,
        private_port: u16,
    ) -> Result<Forward> {
        let vm = self
            .list_vms(cloudspace)
            .await?
            .into_iter()
            .find(|vm| vm.name == vm_name)
            .ok_or_else(|| ApiError::NotFound(format!("vm '{}'", vm_name)))?;

        let public_port = match public_port {
            Some(port) => port,
            None => {
                let forwards = self.list_forwards(cloudspace).await?;
                next_free_port(&forwards, self.config.defaults.first_public_port)
                    .ok_or_else(|| ApiError::NotFound("free public port".to_string()))?
            }
        };
        let public_ip = cloudspace.external_ip.clone().unwrap_or_default();

        self.post(
            "cloudapi/portforwarding/create",
            json!({
                "cloudspaceId": cloudspace.id,
                "publicIp": public_ip,
                "publicPort": public_port,
                "machineId": vm.id,
                "localPort": private_port,
                "protocol": "tcp",
            }),
        )
        .await?;

        Ok(Forward {
            machine_name: vm.name.clone(),
            public_ip,
            public_port,
            local_ip: vm.ip_address().unwrap_or_default().to_string(),
            local_port: private_port,
            protocol: "tcp".to_string(),
        })
    }

    async fn delete_forward(&self, cloudspace: &Cloudspace, public_port: u16) -> Result<()> {
        self.post(
            "cloudapi/portforwarding/deleteByPort",
            json!({
                "cloudspaceId": cloudspace.id,
                "publicIp": cloudspace.external_ip.clone().unwrap_or_default(),
                "publicPort": public_port,
            }),
        )
        .await?;
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<Image>> {
        self.call("cloudapi/images/list", json!({})).await
    }

    async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.call("system/gridmanager/getNodes", json!({})).await
    }

    async fn provision_console(&self, node: &Node) -> Result<ConsoleSession> {
        let remote = node
            .console_address()
            .ok_or_else(|| ApiError::NotFound(format!("address of node '{}'", node.name)))?;
        self.call(
            "cloudbroker/zeroaccess/provision",
            json!({ "remote": remote }),
        )
        .await
    }
}
