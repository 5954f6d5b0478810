//! Operations shared by the shell and the non-interactive commands
//!
//! Names are resolved through the selector, so a filter that matches one
//! record never prompts and an ambiguous one asks the picker.

use crate::{select_item, CoreError, Frontend, Picker, Result};
use ovc_api::{Account, ApiError, CloudApi, Cloudspace, Forward, Node, Vm, VmSpec};
use ovc_config::DefaultsConfig;

/// Select an environment (by filter or picker) and authenticate against it
pub async fn choose_environment<P: Picker + ?Sized>(
    api: &mut dyn CloudApi,
    picker: &mut P,
    filter: Option<&str>,
) -> Result<String> {
    let name = select_item(api.environments(), "Select environment: ", filter, picker)?;
    api.select_environment(&name).await?;
    Ok(name)
}

pub async fn choose_cloudspace<P: Picker + ?Sized>(
    api: &dyn CloudApi,
    picker: &mut P,
    filter: Option<&str>,
) -> Result<Cloudspace> {
    let cloudspaces = api.list_cloudspaces().await?;
    let name = select_item(
        cloudspaces.iter().map(|cs| cs.name.clone()),
        "Select cloudspace: ",
        filter,
        picker,
    )?;
    find_by_name(cloudspaces, &name, |cs| &cs.name, "cloudspace")
}

pub async fn choose_vm<P: Picker + ?Sized>(
    api: &dyn CloudApi,
    cloudspace: &Cloudspace,
    picker: &mut P,
    filter: Option<&str>,
) -> Result<Vm> {
    let vms = api.list_vms(cloudspace).await?;
    let name = select_item(
        vms.iter().map(|vm| vm.name.clone()),
        "Select vm: ",
        filter,
        picker,
    )?;
    find_by_name(vms, &name, |vm| &vm.name, "vm")
}

pub async fn choose_account<P: Picker + ?Sized>(
    api: &dyn CloudApi,
    picker: &mut P,
    filter: Option<&str>,
) -> Result<Account> {
    let accounts = api.list_accounts().await?;
    let name = select_item(
        accounts.iter().map(|a| a.name.clone()),
        "Select account: ",
        filter,
        picker,
    )?;
    find_by_name(accounts, &name, |a| &a.name, "account")
}

pub async fn choose_node<P: Picker + ?Sized>(
    api: &dyn CloudApi,
    picker: &mut P,
    filter: Option<&str>,
) -> Result<Node> {
    let nodes = api.list_nodes().await?;
    let name = select_item(
        nodes.iter().map(|n| n.name.clone()),
        "Select node: ",
        filter,
        picker,
    )?;
    find_by_name(nodes, &name, |n| &n.name, "node")
}

fn find_by_name<T>(
    records: Vec<T>,
    name: &str,
    name_of: impl Fn(&T) -> &String,
    what: &str,
) -> Result<T> {
    records
        .into_iter()
        .find(|record| name_of(record) == name)
        .ok_or_else(|| ApiError::NotFound(format!("{} {}", what, name)).into())
}

/// Create a cloudspace in the account matching `account_filter`
pub async fn create_cloudspace<P: Picker + ?Sized>(
    api: &dyn CloudApi,
    picker: &mut P,
    name: &str,
    account_filter: Option<&str>,
    cloudspace_type: Option<&str>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Grammar("Cloudspace name cannot be empty".to_string()));
    }
    let account = choose_account(api, picker, account_filter).await?;
    api.create_cloudspace(name, account.id, cloudspace_type).await?;
    tracing::info!("Created cloudspace {} in account {}", name, account.name);
    Ok(())
}

/// A new machine with its SSH forward
#[derive(Debug, Clone)]
pub struct CreatedMachine {
    pub vm: Vm,
    pub forward: Forward,
}

/// Create a machine and forward an automatically picked public port to its
/// SSH port
pub async fn create_machine(
    api: &dyn CloudApi,
    cloudspace: &Cloudspace,
    spec: &VmSpec,
) -> Result<CreatedMachine> {
    let vm = api.create_vm(cloudspace, spec).await?;
    tracing::info!("Created vm {} ({})", vm.name, vm.id);
    let forward = api.create_forward(cloudspace, &vm.name, None, 22).await?;
    Ok(CreatedMachine { vm, forward })
}

/// Ask for whatever part of a machine spec was not given
pub fn prompt_vm_spec(
    frontend: &mut dyn Frontend,
    defaults: &DefaultsConfig,
    name: Option<String>,
    memory: Option<u32>,
    vcpus: Option<u32>,
) -> Result<VmSpec> {
    let name = match name {
        Some(name) => name,
        None => frontend.ask("Enter name: ", None)?,
    };
    if name.trim().is_empty() {
        return Err(CoreError::Grammar("Machine name cannot be empty".to_string()));
    }

    let memory = match memory {
        Some(memory) => memory,
        None => ask_number(frontend, "Memory: ", defaults.memory)?,
    };
    let vcpus = match vcpus {
        Some(vcpus) => vcpus,
        None => ask_number(frontend, "VCPUS: ", defaults.vcpus)?,
    };

    Ok(VmSpec {
        name: name.trim().to_string(),
        memory,
        vcpus,
    })
}

fn ask_number(frontend: &mut dyn Frontend, question: &str, default: u32) -> Result<u32> {
    let answer = frontend.ask(question, Some(&default.to_string()))?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }
    answer.parse().map_err(|_| {
        CoreError::Grammar(format!(
            "{} should be a number",
            question.trim_end_matches(": ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockApi, MockCall, ScriptedFrontend};

    #[tokio::test]
    async fn test_choose_cloudspace_by_filter() {
        let api = MockApi::new()
            .with_cloudspace(Cloudspace::new(1, "alpha"))
            .with_cloudspace(Cloudspace::new(2, "beta"));
        let mut frontend = ScriptedFrontend::new();

        let cs = choose_cloudspace(&api, &mut frontend, Some("bet")).await.unwrap();
        assert_eq!(cs.id, 2);
        assert!(frontend.picks_asked().is_empty());
    }

    #[tokio::test]
    async fn test_choose_cloudspace_ambiguous_asks_picker() {
        let api = MockApi::new()
            .with_cloudspace(Cloudspace::new(1, "alpha"))
            .with_cloudspace(Cloudspace::new(2, "alpine"));
        let mut frontend = ScriptedFrontend::new().picking("alpine");

        let cs = choose_cloudspace(&api, &mut frontend, Some("alp")).await.unwrap();
        assert_eq!(cs.id, 2);
        assert_eq!(
            frontend.picks_asked(),
            vec![vec!["alpha".to_string(), "alpine".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_choose_environment_authenticates() {
        let mut api = MockApi::new().with_environments(&["prod.be-g8-1", "staging.be-g8-2"]);
        let mut frontend = ScriptedFrontend::new();

        let env = choose_environment(&mut api, &mut frontend, Some("prod")).await.unwrap();
        assert_eq!(env, "prod.be-g8-1");
        assert!(api.was_called(&MockCall::SelectEnvironment {
            name: "prod.be-g8-1".to_string()
        }));
    }

    #[tokio::test]
    async fn test_choose_node_without_match() {
        let api = MockApi::new().with_node("cpu-01");
        let mut frontend = ScriptedFrontend::new();

        let err = choose_node(&api, &mut frontend, Some("stor")).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find item with filter stor");
    }

    #[tokio::test]
    async fn test_create_cloudspace_resolves_account() {
        let api = MockApi::new().with_account(Account {
            id: 42,
            name: "ops".to_string(),
        });
        let mut frontend = ScriptedFrontend::new();

        create_cloudspace(&api, &mut frontend, "gamma", None, Some("vgw"))
            .await
            .unwrap();
        assert!(api.was_called(&MockCall::CreateCloudspace {
            name: "gamma".to_string(),
            account_id: 42,
            cloudspace_type: Some("vgw".to_string()),
        }));
    }

    #[tokio::test]
    async fn test_create_machine_opens_ssh_forward() {
        let cs = Cloudspace::new(1, "alpha");
        let api = MockApi::new().with_cloudspace(cs.clone());
        let spec = VmSpec {
            name: "web1".to_string(),
            memory: 2048,
            vcpus: 2,
        };

        let created = create_machine(&api, &cs, &spec).await.unwrap();
        assert_eq!(created.vm.name, "web1");
        assert_eq!(created.forward.local_port, 22);
        assert_eq!(created.forward.public_port, 3500);
        assert!(api.was_called(&MockCall::CreateForward {
            cloudspace_id: 1,
            vm_name: "web1".to_string(),
            public_port: None,
            private_port: 22,
        }));
    }

    #[test]
    fn test_prompt_vm_spec_asks_missing_values() {
        let mut frontend = ScriptedFrontend::new().answering("web2").answering("").answering("4");
        let spec =
            prompt_vm_spec(&mut frontend, &DefaultsConfig::default(), None, None, None).unwrap();
        assert_eq!(
            spec,
            VmSpec {
                name: "web2".to_string(),
                memory: 1024,
                vcpus: 4
            }
        );
        assert_eq!(frontend.questions(), vec!["Enter name: ", "Memory: ", "VCPUS: "]);
    }

    #[test]
    fn test_prompt_vm_spec_skips_given_values() {
        let mut frontend = ScriptedFrontend::new();
        let spec = prompt_vm_spec(
            &mut frontend,
            &DefaultsConfig::default(),
            Some("db".to_string()),
            Some(512),
            Some(1),
        )
        .unwrap();
        assert_eq!(spec.name, "db");
        assert!(frontend.questions().is_empty());
    }

    #[test]
    fn test_prompt_vm_spec_rejects_non_numeric_memory() {
        let mut frontend = ScriptedFrontend::new().answering("web2").answering("lots");
        let err = prompt_vm_spec(&mut frontend, &DefaultsConfig::default(), None, None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Memory should be a number");
    }
}
