//! Test support utilities for ovc-core
//!
//! Provides MockApi, an in-memory collaborator, and ScriptedFrontend, which
//! replays queued user input and records everything shown, so components,
//! the stack and the shell can be driven without a terminal or a network.

use crate::{CoreError, Frontend, Picker, Prompt, Result};
use async_trait::async_trait;
use ovc_api::*;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Records which methods were called on the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    SelectEnvironment { name: String },
    ListAccounts,
    ListCloudspaces,
    CreateCloudspace {
        name: String,
        account_id: u64,
        cloudspace_type: Option<String>,
    },
    DeleteCloudspace { id: u64 },
    ListVms { cloudspace_id: u64 },
    CreateVm { cloudspace_id: u64, name: String },
    DeleteVm { id: u64 },
    VmAction { action: VmAction, id: u64 },
    ListForwards { cloudspace_id: u64 },
    CreateForward {
        cloudspace_id: u64,
        vm_name: String,
        public_port: Option<u16>,
        private_port: u16,
    },
    DeleteForward { cloudspace_id: u64, public_port: u16 },
    ListImages,
    ListNodes,
    ProvisionConsole { node: String },
}

#[derive(Default)]
struct MockState {
    accounts: Vec<Account>,
    cloudspaces: Vec<Cloudspace>,
    vms: BTreeMap<u64, Vec<Vm>>,
    forwards: BTreeMap<u64, Vec<Forward>>,
    nodes: Vec<Node>,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory collaborator with failure injection
pub struct MockApi {
    environments: Vec<String>,
    environment: Option<String>,
    state: Arc<Mutex<MockState>>,
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    /// Operations (by trait method name) that fail with `ApiError::Remote`
    failures: Arc<Mutex<HashSet<&'static str>>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            environments: Vec::new(),
            environment: None,
            state: Arc::new(Mutex::new(MockState {
                next_id: 100,
                ..MockState::default()
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_environments(mut self, names: &[&str]) -> Self {
        self.environments = names.iter().map(|n| n.to_string()).collect();
        self.environments.sort();
        self
    }

    pub fn with_account(self, account: Account) -> Self {
        self.state.lock().unwrap().accounts.push(account);
        self
    }

    pub fn with_cloudspace(self, cloudspace: Cloudspace) -> Self {
        self.state.lock().unwrap().cloudspaces.push(cloudspace);
        self
    }

    pub fn with_vm(self, cloudspace_id: u64, vm: Vm) -> Self {
        self.state
            .lock()
            .unwrap()
            .vms
            .entry(cloudspace_id)
            .or_default()
            .push(vm);
        self
    }

    pub fn with_forward(self, cloudspace_id: u64, forward: Forward) -> Self {
        self.state
            .lock()
            .unwrap()
            .forwards
            .entry(cloudspace_id)
            .or_default()
            .push(forward);
        self
    }

    pub fn with_node(self, name: &str) -> Self {
        let ip = format!("10.107.1.{}", self.state.lock().unwrap().nodes.len() + 10);
        self.state.lock().unwrap().nodes.push(Node::new(name, ip));
        self
    }

    /// Make `operation` fail from now on
    pub fn fail(self, operation: &'static str) -> Self {
        self.fail_now(operation);
        self
    }

    pub fn fail_now(&self, operation: &'static str) {
        self.failures.lock().unwrap().insert(operation);
    }

    /// Record a call
    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: &'static str) -> ovc_api::Result<()> {
        if self.failures.lock().unwrap().contains(operation) {
            return Err(ApiError::Remote(format!("{} failed", operation)));
        }
        Ok(())
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Check if a specific call was made
    pub fn was_called(&self, call: &MockCall) -> bool {
        self.calls.lock().unwrap().contains(call)
    }

    pub fn cloudspaces(&self) -> Vec<Cloudspace> {
        self.state.lock().unwrap().cloudspaces.clone()
    }

    pub fn vms(&self, cloudspace_id: u64) -> Vec<Vm> {
        self.state
            .lock()
            .unwrap()
            .vms
            .get(&cloudspace_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn forwards(&self, cloudspace_id: u64) -> Vec<Forward> {
        self.state
            .lock()
            .unwrap()
            .forwards
            .get(&cloudspace_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CloudApi for MockApi {
    fn environments(&self) -> Vec<String> {
        self.environments.clone()
    }

    fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    async fn select_environment(&mut self, name: &str) -> ovc_api::Result<()> {
        self.record(MockCall::SelectEnvironment {
            name: name.to_string(),
        });
        self.check("select_environment")?;
        if !self.environments.iter().any(|env| env == name) {
            return Err(ApiError::UnknownEnvironment(name.to_string()));
        }
        self.environment = Some(name.to_string());
        Ok(())
    }

    async fn list_accounts(&self) -> ovc_api::Result<Vec<Account>> {
        self.record(MockCall::ListAccounts);
        self.check("list_accounts")?;
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn list_cloudspaces(&self) -> ovc_api::Result<Vec<Cloudspace>> {
        self.record(MockCall::ListCloudspaces);
        self.check("list_cloudspaces")?;
        Ok(self.state.lock().unwrap().cloudspaces.clone())
    }

    async fn create_cloudspace(
        &self,
        name: &str,
        account_id: u64,
        cloudspace_type: Option<&str>,
    ) -> ovc_api::Result<()> {
        self.record(MockCall::CreateCloudspace {
            name: name.to_string(),
            account_id,
            cloudspace_type: cloudspace_type.map(str::to_string),
        });
        self.check("create_cloudspace")?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let mut cloudspace = Cloudspace::new(id, name);
        cloudspace.account_id = Some(account_id);
        cloudspace.status = "DEPLOYED".to_string();
        state.cloudspaces.push(cloudspace);
        Ok(())
    }

    async fn delete_cloudspace(&self, cloudspace: &Cloudspace) -> ovc_api::Result<()> {
        self.record(MockCall::DeleteCloudspace { id: cloudspace.id });
        self.check("delete_cloudspace")?;
        let mut state = self.state.lock().unwrap();
        state.cloudspaces.retain(|cs| cs.id != cloudspace.id);
        state.vms.remove(&cloudspace.id);
        state.forwards.remove(&cloudspace.id);
        Ok(())
    }

    async fn list_vms(&self, cloudspace: &Cloudspace) -> ovc_api::Result<Vec<Vm>> {
        self.record(MockCall::ListVms {
            cloudspace_id: cloudspace.id,
        });
        self.check("list_vms")?;
        Ok(self.vms(cloudspace.id))
    }

    async fn create_vm(&self, cloudspace: &Cloudspace, spec: &VmSpec) -> ovc_api::Result<Vm> {
        self.record(MockCall::CreateVm {
            cloudspace_id: cloudspace.id,
            name: spec.name.clone(),
        });
        self.check("create_vm")?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let mut vm = Vm::new(id, spec.name.clone(), VmStatus::Running);
        vm.interfaces.push(Interface {
            ip_address: Some(format!("10.0.0.{}", id % 250 + 2)),
            extra: Extra::new(),
        });
        vm.accounts.push(VmAccount {
            login: "cloudscalers".to_string(),
            password: "secret".to_string(),
        });
        state.vms.entry(cloudspace.id).or_default().push(vm.clone());
        Ok(vm)
    }

    async fn delete_vm(&self, vm: &Vm) -> ovc_api::Result<()> {
        self.record(MockCall::DeleteVm { id: vm.id });
        self.check("delete_vm")?;
        let mut state = self.state.lock().unwrap();
        for vms in state.vms.values_mut() {
            vms.retain(|v| v.id != vm.id);
        }
        Ok(())
    }

    async fn vm_action(&self, action: VmAction, vm_id: u64) -> ovc_api::Result<Vm> {
        self.record(MockCall::VmAction { action, id: vm_id });
        self.check("vm_action")?;
        let mut state = self.state.lock().unwrap();
        let vm = state
            .vms
            .values_mut()
            .flat_map(|vms| vms.iter_mut())
            .find(|vm| vm.id == vm_id)
            .ok_or_else(|| ApiError::NotFound(format!("vm {}", vm_id)))?;
        match action {
            VmAction::Get => {}
            VmAction::Start | VmAction::Reboot | VmAction::Resume => vm.status = VmStatus::Running,
            VmAction::Stop => vm.status = VmStatus::Halted,
            VmAction::Pause => vm.status = VmStatus::Paused,
        }
        Ok(vm.clone())
    }

    async fn list_forwards(&self, cloudspace: &Cloudspace) -> ovc_api::Result<Vec<Forward>> {
        self.record(MockCall::ListForwards {
            cloudspace_id: cloudspace.id,
        });
        self.check("list_forwards")?;
        Ok(self.forwards(cloudspace.id))
    }

    async fn create_forward(
        &self,
        cloudspace: &Cloudspace,
        vm_name: &str,
        public_port: Option<u16>,
        private_port: u16,
    ) -> ovc_api::Result<Forward> {
        self.record(MockCall::CreateForward {
            cloudspace_id: cloudspace.id,
            vm_name: vm_name.to_string(),
            public_port,
            private_port,
        });
        self.check("create_forward")?;
        let mut state = self.state.lock().unwrap();
        let local_ip = state
            .vms
            .get(&cloudspace.id)
            .and_then(|vms| vms.iter().find(|vm| vm.name == vm_name))
            .ok_or_else(|| ApiError::NotFound(format!("vm {}", vm_name)))?
            .ip_address()
            .unwrap_or_default()
            .to_string();
        let existing = state.forwards.entry(cloudspace.id).or_default();
        let public_port = match public_port {
            Some(port) => port,
            None => next_free_port(existing, 3500)
                .ok_or_else(|| ApiError::Remote("no free public port".to_string()))?,
        };
        let forward = Forward {
            machine_name: vm_name.to_string(),
            public_ip: cloudspace.external_ip.clone().unwrap_or_default(),
            public_port,
            local_ip,
            local_port: private_port,
            protocol: "tcp".to_string(),
        };
        existing.push(forward.clone());
        Ok(forward)
    }

    async fn delete_forward(&self, cloudspace: &Cloudspace, public_port: u16) -> ovc_api::Result<()> {
        self.record(MockCall::DeleteForward {
            cloudspace_id: cloudspace.id,
            public_port,
        });
        self.check("delete_forward")?;
        if let Some(forwards) = self.state.lock().unwrap().forwards.get_mut(&cloudspace.id) {
            forwards.retain(|f| f.public_port != public_port);
        }
        Ok(())
    }

    async fn list_images(&self) -> ovc_api::Result<Vec<Image>> {
        self.record(MockCall::ListImages);
        self.check("list_images")?;
        Ok(vec![Image {
            id: 1,
            name: "Ubuntu 16.04 x64".to_string(),
        }])
    }

    async fn list_nodes(&self) -> ovc_api::Result<Vec<Node>> {
        self.record(MockCall::ListNodes);
        self.check("list_nodes")?;
        Ok(self.state.lock().unwrap().nodes.clone())
    }

    async fn provision_console(&self, node: &Node) -> ovc_api::Result<ConsoleSession> {
        self.record(MockCall::ProvisionConsole {
            node: node.name.clone(),
        });
        self.check("provision_console")?;
        Ok(ConsoleSession {
            ssh_ip: node.console_address().unwrap_or_default().to_string(),
            ssh_port: 2222,
            username: "zaccess".to_string(),
        })
    }
}

/// Frontend replaying queued input and recording output
#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    lines: VecDeque<String>,
    confirms: VecDeque<bool>,
    answers: VecDeque<String>,
    picks: VecDeque<String>,
    prompts: Vec<String>,
    shown: Vec<String>,
    errors: Vec<String>,
    questions: Vec<String>,
    confirmations: Vec<String>,
    picks_asked: Vec<Vec<String>>,
    sessions: Vec<ConsoleSession>,
}

impl ScriptedFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command line; the shell ends once they run out
    pub fn line(mut self, line: &str) -> Self {
        self.lines.push_back(line.to_string());
        self
    }

    pub fn lines(self, lines: &[&str]) -> Self {
        lines.iter().fold(self, |frontend, line| frontend.line(line))
    }

    /// Queue a yes/no answer; unqueued confirmations answer no
    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    /// Queue a free-text answer; an empty one takes the default
    pub fn answering(mut self, answer: &str) -> Self {
        self.answers.push_back(answer.to_string());
        self
    }

    pub fn picking(mut self, item: &str) -> Self {
        self.picks.push_back(item.to_string());
        self
    }

    /// Plain text of every prompt rendered
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.clone()
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.clone()
    }

    /// Candidate lists handed to the picker
    pub fn picks_asked(&self) -> Vec<Vec<String>> {
        self.picks_asked.clone()
    }

    pub fn sessions(&self) -> Vec<ConsoleSession> {
        self.sessions.clone()
    }
}

impl Picker for ScriptedFrontend {
    fn pick(&mut self, _prompt: &str, items: &[String]) -> Result<String> {
        self.picks_asked.push(items.to_vec());
        self.picks.pop_front().ok_or(CoreError::Cancelled)
    }
}

impl Frontend for ScriptedFrontend {
    fn read_command(
        &mut self,
        prompt: &Prompt,
        _top: &crate::Component,
    ) -> std::io::Result<Option<String>> {
        self.prompts.push(prompt.plain());
        Ok(self.lines.pop_front())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.confirmations.push(question.to_string());
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        self.questions.push(question.to_string());
        match (self.answers.pop_front(), default) {
            (Some(answer), Some(default)) if answer.is_empty() => Ok(default.to_string()),
            (Some(answer), _) => Ok(answer),
            (None, Some(default)) => Ok(default.to_string()),
            (None, None) => Err(CoreError::Cancelled),
        }
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.to_string());
    }

    fn run_session(&mut self, session: &ConsoleSession) -> Result<()> {
        self.sessions.push(session.clone());
        Ok(())
    }
}
