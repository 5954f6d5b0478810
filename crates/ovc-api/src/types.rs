//! Records exchanged with the OpenvCloud API

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Wire fields that have no typed counterpart are kept here so that
/// printing a record shows everything the API returned.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// A cloudspace (private network with its own external address)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloudspace {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "externalnetworkip", default)]
    pub external_ip: Option<String>,
    #[serde(rename = "accountId", default)]
    pub account_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Cloudspace {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: String::new(),
            external_ip: None,
            account_id: None,
            extra: Extra::new(),
        }
    }
}

/// Power state of a virtual machine
///
/// States without power actions keep the status the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VmStatus {
    Running,
    Halted,
    Paused,
    Unknown(String),
}

impl VmStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Halted => "HALTED",
            Self::Paused => "PAUSED",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for VmStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "RUNNING" => Self::Running,
            "HALTED" => Self::Halted,
            "PAUSED" => Self::Paused,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<VmStatus> for String {
    fn from(status: VmStatus) -> Self {
        match status {
            VmStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for VmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virtual machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vm {
    pub id: u64,
    pub name: String,
    pub status: VmStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<VmAccount>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Vm {
    pub fn new(id: u64, name: impl Into<String>, status: VmStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            interfaces: Vec::new(),
            accounts: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Address of the first interface
    pub fn ip_address(&self) -> Option<&str> {
        self.interfaces
            .first()
            .and_then(|i| i.ip_address.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(rename = "ipAddress", default)]
    pub ip_address: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Login created by the image on first boot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmAccount {
    pub login: String,
    pub password: String,
}

/// Remote action on a virtual machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmAction {
    Get,
    Start,
    Stop,
    Reboot,
    Pause,
    Resume,
}

impl VmAction {
    /// API method name, also the shell token for the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reboot => "reboot",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }

    /// Actions that change the power state
    pub fn state_changes() -> [VmAction; 5] {
        [Self::Start, Self::Stop, Self::Reboot, Self::Pause, Self::Resume]
    }
}

impl std::fmt::Display for VmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VmAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Self::Get),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "reboot" => Ok(Self::Reboot),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            _ => Err(format!("Unknown vm action: {}", s)),
        }
    }
}

/// Parameters for a new virtual machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub name: String,
    /// Memory in MiB
    pub memory: u32,
    pub vcpus: u32,
}

/// A port forwarding rule on a cloudspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forward {
    #[serde(rename = "machineName", default)]
    pub machine_name: String,
    #[serde(rename = "publicIp", default)]
    pub public_ip: String,
    #[serde(rename = "publicPort", deserialize_with = "port_from_wire")]
    pub public_port: u16,
    #[serde(rename = "localIp", default)]
    pub local_ip: String,
    #[serde(rename = "localPort", deserialize_with = "port_from_wire")]
    pub local_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

/// The API reports ports as strings on some versions and numbers on others
fn port_from_wire<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(n) => Ok(n),
        Port::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Lowest port at or above `start` not used by any of `forwards`
pub fn next_free_port(forwards: &[Forward], start: u16) -> Option<u16> {
    let used: BTreeSet<u16> = forwards.iter().map(|f| f.public_port).collect();
    (start..=u16::MAX).find(|port| !used.contains(port))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "locationCode")]
    pub location_code: String,
}

/// A physical node of the environment, reachable through zero-access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub ipaddr: Vec<String>,
    #[serde(default)]
    pub netaddr: Vec<NetAddr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetAddr {
    pub name: String,
    #[serde(default)]
    pub ip: Vec<String>,
}

impl Node {
    pub fn new(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ipaddr: vec![ip.into()],
            netaddr: Vec::new(),
        }
    }

    /// Address used for console access: the backplane address when present,
    /// otherwise the first listed address
    pub fn console_address(&self) -> Option<&str> {
        self.netaddr
            .iter()
            .find(|nic| nic.name == "backplane1")
            .and_then(|nic| nic.ip.first())
            .or_else(|| self.ipaddr.first())
            .map(String::as_str)
    }
}

/// Credentials of a provisioned zero-access ssh endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSession {
    pub ssh_ip: String,
    pub ssh_port: u16,
    pub username: String,
}

impl ConsoleSession {
    /// Arguments for `ssh` connecting to this endpoint
    pub fn ssh_args(&self, forward_agent: bool) -> Vec<String> {
        let mut args = Vec::new();
        if forward_agent {
            args.push("-A".to_string());
        }
        args.push("-p".to_string());
        args.push(self.ssh_port.to_string());
        args.push(format!("{}@{}", self.username, self.ssh_ip));
        args
    }
}
