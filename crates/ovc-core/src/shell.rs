//! The read-evaluate loop

use crate::components::{Context, Root};
use crate::{select_item, Component, Frontend, NavigationStack, Result};
use ovc_api::CloudApi;
use ovc_config::DefaultsConfig;

/// Interactive shell over a navigation stack
///
/// The stack is only mutated here, one accepted line at a time.
pub struct Shell<'a> {
    stack: NavigationStack,
    api: &'a mut dyn CloudApi,
    frontend: &'a mut dyn Frontend,
    defaults: DefaultsConfig,
}

impl<'a> Shell<'a> {
    pub fn new(
        api: &'a mut dyn CloudApi,
        frontend: &'a mut dyn Frontend,
        defaults: DefaultsConfig,
    ) -> Self {
        let root = Root::new(api.environments());
        Self {
            stack: NavigationStack::new(root),
            api,
            frontend,
            defaults,
        }
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// Enter an environment before the loop starts, as if it had been typed
    /// at the root
    pub async fn preselect(&mut self, filter: &str) -> Result<()> {
        let environments = self.api.environments();
        let name = select_item(
            environments,
            "Select environment: ",
            Some(filter),
            &mut *self.frontend,
        )?;
        self.submit(&name).await
    }

    /// Validate and apply one line. Rejections and remote failures are
    /// reported through the frontend and leave the stack unchanged.
    pub async fn submit(&mut self, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        if let Err(e) = self.stack.top().validate(line) {
            self.frontend.error(&e.to_string());
            return Ok(());
        }

        let mut ctx = Context {
            api: &mut *self.api,
            frontend: &mut *self.frontend,
            defaults: &self.defaults,
        };
        if let Err(e) = self.stack.submit(line, &mut ctx).await {
            tracing::debug!("Transition for {:?} failed: {:?}", line, e);
            self.frontend.error(&e.to_string());
        }
        Ok(())
    }

    /// Run until end of input or interrupt
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let prompt = self.stack.prompt();
            let line = match self.frontend.read_command(&prompt, self.stack.top())? {
                Some(line) => line,
                None => {
                    tracing::debug!("Input closed, leaving shell");
                    return Ok(());
                }
            };
            self.submit(&line).await?;
        }
    }

    pub fn top(&self) -> &Component {
        self.stack.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockApi, MockCall, ScriptedFrontend};
    use ovc_api::{Account, Cloudspace, Forward, Vm, VmAction, VmStatus};

    fn api() -> MockApi {
        let mut alpha = Cloudspace::new(1, "alpha");
        alpha.external_ip = Some("1.2.3.4".to_string());
        MockApi::new()
            .with_environments(&["prod", "staging.be-g8-2"])
            .with_account(Account {
                id: 7,
                name: "ops".to_string(),
            })
            .with_cloudspace(alpha)
            .with_cloudspace(Cloudspace::new(2, "beta"))
            .with_vm(1, Vm::new(11, "web1", VmStatus::Running))
            .with_vm(2, Vm::new(12, "db1", VmStatus::Halted))
            .with_forward(
                1,
                Forward {
                    machine_name: "web1".to_string(),
                    public_ip: "1.2.3.4".to_string(),
                    public_port: 3500,
                    local_ip: "10.0.0.5".to_string(),
                    local_port: 22,
                    protocol: "tcp".to_string(),
                },
            )
            .with_node("cpu-01")
    }

    async fn run(api: &mut MockApi, frontend: &mut ScriptedFrontend) -> NavigationStack {
        let mut shell = Shell::new(api, frontend, DefaultsConfig::default());
        shell.run().await.unwrap();
        shell.stack().clone()
    }

    fn labels(component: &Component) -> Vec<String> {
        component.completions().into_iter().map(|c| c.label).collect()
    }

    #[tokio::test]
    async fn test_navigate_to_running_vm() {
        let mut api = api();
        let mut frontend =
            ScriptedFrontend::new().lines(&["prod", "cloudspace", "alpha", "vm", "web1"]);

        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 6);
        assert_eq!(
            labels(stack.top()),
            vec!["stop", "reboot", "pause", "createforward", "print", "delete"]
        );
        assert_eq!(
            frontend.prompts(),
            vec![
                " > ",
                "/prod > ",
                "/prod/cloudspace > ",
                "/prod/cloudspace/alpha > ",
                "/prod/cloudspace/alpha/vm > ",
                "/prod/cloudspace/alpha/vm/web1 > ",
            ]
        );
        assert_eq!(
            labels(&stack.components()[2]),
            vec!["create", "print", "alpha", "beta"]
        );
        assert_eq!(api.environment(), Some("prod"));
        assert!(frontend.errors().is_empty());
    }

    #[tokio::test]
    async fn test_parent_and_root_tokens() {
        let mut api = api();
        let mut frontend =
            ScriptedFrontend::new().lines(&["prod", "cloudspace", "alpha", "..", "alpha", "vm"]);
        let stack = run(&mut api, &mut frontend).await;
        assert_eq!(stack.len(), 5);

        let mut frontend = ScriptedFrontend::new().lines(&["prod", "cloudspace", "alpha", "/"]);
        let stack = run(&mut api, &mut frontend).await;
        assert_eq!(stack.len(), 1);

        let mut frontend = ScriptedFrontend::new().lines(&["..", "..", "/"]);
        let stack = run(&mut api, &mut frontend).await;
        assert_eq!(stack.len(), 1);
        assert!(frontend.errors().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new().lines(&["pro", "prod", "cloud", "  "]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 2);
        assert_eq!(frontend.errors(), vec!["Invalid action", "Invalid action"]);
    }

    #[tokio::test]
    async fn test_padded_name_is_rejected() {
        let mut api = api();
        let mut frontend =
            ScriptedFrontend::new().lines(&[" prod", "prod ", "prod", "cloudspace", " alpha"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 3);
        assert_eq!(
            frontend.errors(),
            vec!["Invalid action", "Invalid action", "Invalid action"]
        );
    }

    #[tokio::test]
    async fn test_cloudspace_list_print_keeps_stack() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new().lines(&["prod", "cloudspace", "print"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 3);
        assert!(matches!(stack.top(), Component::CloudspaceList(_)));
        let shown = frontend.shown();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].contains("alpha"));
        assert!(shown[0].contains("beta"));
        assert!(shown[0].contains("1.2.3.4"));
        let listings = api
            .get_calls()
            .into_iter()
            .filter(|call| *call == MockCall::ListCloudspaces)
            .count();
        assert_eq!(listings, 1);
    }

    #[tokio::test]
    async fn test_vm_list_print_refreshes() {
        let mut api = api();
        let mut frontend =
            ScriptedFrontend::new().lines(&["prod", "cloudspace", "alpha", "vm", "print"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 5);
        assert!(matches!(stack.top(), Component::VmList(_)));
        let listings = api
            .get_calls()
            .into_iter()
            .filter(|call| *call == MockCall::ListVms { cloudspace_id: 1 })
            .count();
        assert_eq!(listings, 2);
        let shown = frontend.shown();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].contains("web1"));
        assert!(shown[0].contains("RUNNING"));
        assert!(!shown[0].contains("db1"));
    }

    #[tokio::test]
    async fn test_stop_rejected_when_halted() {
        let mut api = api();
        let mut frontend =
            ScriptedFrontend::new().lines(&["prod", "cloudspace", "beta", "vm", "db1", "stop"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 6);
        assert_eq!(frontend.errors(), vec!["Invalid action"]);
        assert!(!api
            .get_calls()
            .iter()
            .any(|call| matches!(call, MockCall::VmAction { .. })));
    }

    #[tokio::test]
    async fn test_vm_action_refreshes_status() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "alpha", "vm", "web1", "stop", "start"]);
        let stack = run(&mut api, &mut frontend).await;

        assert!(api.was_called(&MockCall::VmAction {
            action: VmAction::Stop,
            id: 11
        }));
        assert!(api.was_called(&MockCall::VmAction {
            action: VmAction::Start,
            id: 11
        }));
        match stack.top() {
            Component::Vm(vm) => assert_eq!(vm.vm().status, VmStatus::Running),
            other => panic!("unexpected top {:?}", other),
        }
        assert_eq!(frontend.shown(), vec!["web1 is HALTED", "web1 is RUNNING"]);
    }

    #[tokio::test]
    async fn test_forward_delete_declined() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "alpha", "forwards", "delete 3500"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(
            frontend.confirmations(),
            vec!["Are you sure you want to delete forward 3500"]
        );
        assert!(!api.was_called(&MockCall::DeleteForward {
            cloudspace_id: 1,
            public_port: 3500
        }));
        assert_eq!(api.forwards(1).len(), 1);
        match stack.top() {
            Component::ForwardList(list) => assert_eq!(list.forwards().len(), 1),
            other => panic!("unexpected top {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_delete_keeps_cached_rules() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "alpha", "forwards", "delete 3500"])
            .confirming(true);
        let stack = run(&mut api, &mut frontend).await;

        assert!(api.was_called(&MockCall::DeleteForward {
            cloudspace_id: 1,
            public_port: 3500
        }));
        assert!(api.forwards(1).is_empty());
        assert_eq!(stack.len(), 5);
        match stack.top() {
            Component::ForwardList(list) => assert_eq!(list.forwards().len(), 1),
            other => panic!("unexpected top {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_delete_needs_numeric_port() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "alpha", "forwards", "delete abc", "print"]);
        run(&mut api, &mut frontend).await;

        assert_eq!(frontend.errors(), vec!["Public port should be a number"]);
        assert!(frontend.confirmations().is_empty());
        assert_eq!(frontend.shown().len(), 1);
        assert!(frontend.shown()[0].contains("1.2.3.4:3500"));
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_stack_unchanged() {
        let mut api = api().fail("list_vms");
        let mut frontend = ScriptedFrontend::new().lines(&["prod", "cloudspace", "alpha", "vm"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 4);
        assert!(matches!(stack.top(), Component::Cloudspace(_)));
        assert_eq!(
            frontend.errors(),
            vec!["Remote operation failed: list_vms failed"]
        );
    }

    #[tokio::test]
    async fn test_failed_environment_selection_stays_at_root() {
        let mut api = api().fail("select_environment");
        let mut frontend = ScriptedFrontend::new().lines(&["prod"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 1);
        assert_eq!(frontend.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_cloudspace_delete_pops_on_confirm() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "beta", "delete"])
            .confirming(true);
        let stack = run(&mut api, &mut frontend).await;

        assert!(api.was_called(&MockCall::DeleteCloudspace { id: 2 }));
        assert_eq!(stack.len(), 3);
        assert!(matches!(stack.top(), Component::CloudspaceList(_)));
        assert_eq!(
            frontend.confirmations(),
            vec!["Are you sure you want to delete cloudspace beta"]
        );
    }

    #[tokio::test]
    async fn test_cloudspace_delete_declined() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new().lines(&["prod", "cloudspace", "beta", "delete"]);
        let stack = run(&mut api, &mut frontend).await;

        assert!(!api.was_called(&MockCall::DeleteCloudspace { id: 2 }));
        assert_eq!(stack.len(), 4);
    }

    #[tokio::test]
    async fn test_cloudspace_create_enters_new_cloudspace() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "create"])
            .answering("gamma");
        let stack = run(&mut api, &mut frontend).await;

        assert!(api.was_called(&MockCall::CreateCloudspace {
            name: "gamma".to_string(),
            account_id: 7,
            cloudspace_type: None,
        }));
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.top().label(), "gamma");
        assert_eq!(frontend.questions(), vec!["Name: "]);
    }

    #[tokio::test]
    async fn test_vm_create_enters_new_vm() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new()
            .lines(&["prod", "cloudspace", "alpha", "vm", "create"])
            .answering("web2")
            .answering("2048")
            .answering("");
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 6);
        assert_eq!(stack.top().label(), "web2");
        assert!(api.was_called(&MockCall::CreateForward {
            cloudspace_id: 1,
            vm_name: "web2".to_string(),
            public_port: None,
            private_port: 22,
        }));
        assert!(frontend
            .shown()
            .contains(&"ssh -p 3501 root@1.2.3.4".to_string()));
    }

    #[tokio::test]
    async fn test_createforward_usage_and_call() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new().lines(&[
            "prod",
            "cloudspace",
            "alpha",
            "vm",
            "web1",
            "createforward abc 22",
            "createforward",
            "createforward 8080 80",
        ]);
        let stack = run(&mut api, &mut frontend).await;

        let shown = frontend.shown();
        assert_eq!(shown[0], "Ports should be numbers");
        assert!(shown[1].starts_with("Invalid call, usages:"));
        assert_eq!(shown[2], "web1 1.2.3.4:8080 -> :80 tcp");
        assert!(api.was_called(&MockCall::CreateForward {
            cloudspace_id: 1,
            vm_name: "web1".to_string(),
            public_port: Some(8080),
            private_port: 80,
        }));
        assert_eq!(stack.len(), 6);
        assert!(frontend.errors().is_empty());
    }

    #[tokio::test]
    async fn test_vm_print_shows_yaml() {
        let mut api = api();
        let mut frontend =
            ScriptedFrontend::new().lines(&["prod", "cloudspace", "alpha", "vm", "web1", "print"]);
        run(&mut api, &mut frontend).await;

        assert!(api.was_called(&MockCall::VmAction {
            action: VmAction::Get,
            id: 11
        }));
        assert!(frontend.shown()[0].contains("name: web1"));
    }

    #[tokio::test]
    async fn test_console_returns_after_session() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new().lines(&["prod", "console", "cpu-01"]);
        let stack = run(&mut api, &mut frontend).await;

        assert_eq!(stack.len(), 3);
        assert!(matches!(stack.top(), Component::Console(_)));
        let sessions = frontend.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].ssh_ip, "10.107.1.10");
    }

    #[tokio::test]
    async fn test_preselect_environment() {
        let mut api = api();
        let mut frontend = ScriptedFrontend::new();
        let mut shell = Shell::new(&mut api, &mut frontend, DefaultsConfig::default());

        shell.preselect("stag").await.unwrap();
        assert_eq!(shell.stack().len(), 2);
        assert_eq!(shell.top().label(), "be-g8-2");

        let err = shell.preselect("qa").await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find item with filter qa");
    }
}
