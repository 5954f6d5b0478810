//! Mock-based command tests.
//!
//! These tests call command functions directly with a `MockApi` and a
//! `ScriptedFrontend`, avoiding any network access or terminal.

use ovc_api::{Account, Cloudspace, Forward, Vm, VmStatus};
use ovc_cli::commands;
use ovc_config::DefaultsConfig;
use ovc_core::test_support::{MockApi, MockCall, ScriptedFrontend};

fn api() -> MockApi {
    let mut alpha = Cloudspace::new(1, "alpha");
    alpha.external_ip = Some("1.2.3.4".to_string());
    MockApi::new()
        .with_environments(&["prod.be-g8-1"])
        .with_account(Account {
            id: 7,
            name: "ops".to_string(),
        })
        .with_cloudspace(alpha)
        .with_cloudspace(Cloudspace::new(2, "beta"))
        .with_vm(1, Vm::new(11, "web1", VmStatus::Running))
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

// ---- vm ----

#[tokio::test]
async fn test_vm_create_reports_ssh_access() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::vm::create(
        &api,
        &mut frontend,
        &DefaultsConfig::default(),
        Some("alpha"),
        Some("web2".to_string()),
        None,
        None,
    )
    .await
    .unwrap();

    assert!(frontend.questions().is_empty());
    assert!(api.was_called(&MockCall::CreateVm {
        cloudspace_id: 1,
        name: "web2".to_string(),
    }));
    assert!(api.was_called(&MockCall::CreateForward {
        cloudspace_id: 1,
        vm_name: "web2".to_string(),
        public_port: None,
        private_port: 22,
    }));
    let shown = frontend.shown();
    assert!(shown.iter().any(|s| s.starts_with("VM web2: ")));
    assert!(shown.iter().any(|s| s.contains("User: cloudscalers / secret")));
    assert_eq!(shown.last().unwrap(), "ssh -p 3501 root@1.2.3.4");
}

#[tokio::test]
async fn test_vm_create_asks_missing_name() {
    let api = api();
    let mut frontend = ScriptedFrontend::new().answering("db2");

    commands::vm::create(
        &api,
        &mut frontend,
        &DefaultsConfig::default(),
        Some("beta"),
        None,
        Some(2048),
        Some(2),
    )
    .await
    .unwrap();

    assert_eq!(frontend.questions(), vec!["Enter name: ".to_string()]);
    assert_eq!(api.vms(2).len(), 1);
    assert_eq!(api.vms(2)[0].name, "db2");
}

#[tokio::test]
async fn test_vm_list_shows_table() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::vm::list(&api, &mut frontend, Some("alp")).await.unwrap();

    let shown = frontend.shown();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].contains("web1"));
    assert!(shown[0].contains("RUNNING"));
}

#[tokio::test]
async fn test_vm_delete_declined() {
    let api = api();
    let mut frontend = ScriptedFrontend::new().confirming(false);

    commands::vm::delete(&api, &mut frontend, Some("alpha"), Some("web1"), false)
        .await
        .unwrap();

    assert_eq!(
        frontend.confirmations(),
        vec!["Are you sure you want to delete vm web1".to_string()]
    );
    assert!(!api.was_called(&MockCall::DeleteVm { id: 11 }));
    assert_eq!(api.vms(1).len(), 1);
    assert!(frontend.shown().contains(&"Aborted.".to_string()));
}

#[tokio::test]
async fn test_vm_delete_with_yes_skips_confirmation() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::vm::delete(&api, &mut frontend, Some("alpha"), Some("web1"), true)
        .await
        .unwrap();

    assert!(frontend.confirmations().is_empty());
    assert!(api.was_called(&MockCall::DeleteVm { id: 11 }));
    assert!(api.vms(1).is_empty());
}

#[tokio::test]
async fn test_vm_list_remote_failure() {
    let api = api().fail("list_vms");
    let mut frontend = ScriptedFrontend::new();

    let result = commands::vm::list(&api, &mut frontend, Some("alpha")).await;

    assert!(result.is_err());
    assert!(frontend.shown().is_empty());
}

// ---- cloudspace ----

#[tokio::test]
async fn test_cloudspace_list() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::cloudspace::list(&api, &mut frontend).await.unwrap();

    let shown = frontend.shown();
    assert!(shown[0].contains("alpha"));
    assert!(shown[0].contains("beta"));
    assert!(shown[0].contains("1.2.3.4"));
}

#[tokio::test]
async fn test_cloudspace_create_with_account_filter() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::cloudspace::create(
        &api,
        &mut frontend,
        Some("gamma".to_string()),
        Some("op"),
        Some("vgw"),
    )
    .await
    .unwrap();

    assert!(api.was_called(&MockCall::CreateCloudspace {
        name: "gamma".to_string(),
        account_id: 7,
        cloudspace_type: Some("vgw".to_string()),
    }));
    assert!(frontend.picks_asked().is_empty());
    assert!(api.cloudspaces().iter().any(|cs| cs.name == "gamma"));
}

#[tokio::test]
async fn test_cloudspace_delete_picks_among_all() {
    let api = api();
    let mut frontend = ScriptedFrontend::new().picking("beta").confirming(true);

    commands::cloudspace::delete(&api, &mut frontend, None, false)
        .await
        .unwrap();

    assert_eq!(
        frontend.picks_asked(),
        vec![vec!["alpha".to_string(), "beta".to_string()]]
    );
    assert!(api.was_called(&MockCall::DeleteCloudspace { id: 2 }));
    assert_eq!(api.cloudspaces().len(), 1);
}

#[tokio::test]
async fn test_cloudspace_filter_without_match() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    let err = commands::cloudspace::delete(&api, &mut frontend, Some("zzz"), true)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Could not find item with filter zzz");
    assert!(frontend.picks_asked().is_empty());
}

// ---- forwarding ----

#[tokio::test]
async fn test_forwarding_create_picks_free_port() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::forwarding::create(&api, &mut frontend, Some("alpha"), Some("web"), None, 80)
        .await
        .unwrap();

    assert!(api.was_called(&MockCall::CreateForward {
        cloudspace_id: 1,
        vm_name: "web1".to_string(),
        public_port: None,
        private_port: 80,
    }));
    assert!(frontend.shown()[0].contains("1.2.3.4:3501"));
    assert_eq!(api.forwards(1).len(), 2);
}

#[tokio::test]
async fn test_forwarding_create_explicit_port() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::forwarding::create(
        &api,
        &mut frontend,
        Some("alpha"),
        Some("web1"),
        Some(8080),
        80,
    )
    .await
    .unwrap();

    assert!(frontend.shown()[0].contains("1.2.3.4:8080"));
}

#[tokio::test]
async fn test_forwarding_delete_confirmed() {
    let api = api();
    let mut frontend = ScriptedFrontend::new().confirming(true);

    commands::forwarding::delete(&api, &mut frontend, Some("alpha"), 3500, false)
        .await
        .unwrap();

    assert_eq!(
        frontend.confirmations(),
        vec!["Are you sure you want to delete forward 3500".to_string()]
    );
    assert!(api.was_called(&MockCall::DeleteForward {
        cloudspace_id: 1,
        public_port: 3500,
    }));
    assert!(api.forwards(1).is_empty());
}

#[tokio::test]
async fn test_forwarding_list() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::forwarding::list(&api, &mut frontend, Some("alpha"))
        .await
        .unwrap();

    assert!(frontend.shown()[0].contains("1.2.3.4:3500"));
    assert!(frontend.shown()[0].contains("10.0.0.5:22"));
}

// ---- zaccess / shell ----

#[tokio::test]
async fn test_zaccess_runs_console_session() {
    let api = api();
    let mut frontend = ScriptedFrontend::new();

    commands::zaccess(&api, &mut frontend, Some("cpu")).await.unwrap();

    let sessions = frontend.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].ssh_ip, "10.107.1.10");
    assert_eq!(sessions[0].ssh_port, 2222);
    assert!(api.was_called(&MockCall::ProvisionConsole {
        node: "cpu-01".to_string(),
    }));
}

#[tokio::test]
async fn test_shell_preselects_environment() {
    let mut api = api();
    let mut frontend = ScriptedFrontend::new().line("cloudspace");

    commands::shell(
        &mut api,
        &mut frontend,
        DefaultsConfig::default(),
        Some("prod"),
    )
    .await
    .unwrap();

    assert!(api.was_called(&MockCall::SelectEnvironment {
        name: "prod.be-g8-1".to_string(),
    }));
    assert_eq!(
        frontend.prompts(),
        vec![
            "/be-g8-1 > ".to_string(),
            "/be-g8-1/cloudspace > ".to_string(),
        ]
    );
}
