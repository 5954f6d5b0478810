//! OpenvCloud API access for ovc
//!
//! This crate provides the [`CloudApi`] abstraction used by the shell and the
//! CLI commands, the records it exchanges, and [`OvcClient`], the HTTP/JSON
//! implementation authenticating through itsyou.online.

mod client;
mod error;
pub mod jwt;
mod types;

pub use client::OvcClient;
pub use error::*;
pub use types::*;

use async_trait::async_trait;

/// Remote operations on an OpenvCloud environment
///
/// All resource calls act on the environment chosen with
/// [`CloudApi::select_environment`].
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Configured environment identifiers, sorted
    fn environments(&self) -> Vec<String>;

    /// Currently selected environment
    fn environment(&self) -> Option<&str>;

    /// Select an environment and establish an authenticated session for it
    async fn select_environment(&mut self, name: &str) -> Result<()>;

    /// Accounts the caller has access to
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    async fn list_cloudspaces(&self) -> Result<Vec<Cloudspace>>;

    /// Create a cloudspace in an account, optionally of a specific type
    async fn create_cloudspace(
        &self,
        name: &str,
        account_id: u64,
        cloudspace_type: Option<&str>,
    ) -> Result<()>;

    /// Destroy a cloudspace permanently
    async fn delete_cloudspace(&self, cloudspace: &Cloudspace) -> Result<()>;

    async fn list_vms(&self, cloudspace: &Cloudspace) -> Result<Vec<Vm>>;

    /// Create a virtual machine and return its full record
    async fn create_vm(&self, cloudspace: &Cloudspace, spec: &VmSpec) -> Result<Vm>;

    /// Delete a virtual machine permanently
    async fn delete_vm(&self, vm: &Vm) -> Result<()>;

    /// Run an action on a machine and return the refreshed record
    async fn vm_action(&self, action: VmAction, vm_id: u64) -> Result<Vm>;

    async fn list_forwards(&self, cloudspace: &Cloudspace) -> Result<Vec<Forward>>;

    /// Forward a public port of the cloudspace to a machine port; the public
    /// port is picked automatically when `public_port` is `None`
    async fn create_forward(
        &self,
        cloudspace: &Cloudspace,
        vm_name: &str,
        public_port: Option<u16>,
        private_port: u16,
    ) -> Result<Forward>;

    async fn delete_forward(&self, cloudspace: &Cloudspace, public_port: u16) -> Result<()>;

    async fn list_images(&self) -> Result<Vec<Image>>;

    /// Nodes of the selected environment
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// Provision zero-access ssh credentials for a node
    async fn provision_console(&self, node: &Node) -> Result<ConsoleSession>;
}
