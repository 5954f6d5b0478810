//! ovc - OpenvCloud command-line client

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ovc_api::OvcClient;
use ovc_cli::commands;
use ovc_cli::picker::TerminalPicker;
use ovc_cli::terminal::TerminalFrontend;
use ovc_cli::theme::Theme;
use ovc_config::OvcConfig;
use ovc_core::actions;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ovc")]
#[command(author, version, about = "OpenvCloud command-line client", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Filter for environment
    #[arg(long, global = true, env = "ENV_NAME")]
    env: Option<String>,

    /// Config file (defaults to ~/.config/ovc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Navigate environments, cloudspaces and machines interactively
    Shell,

    /// Open a zero-access console on a node
    Zaccess {
        /// Preselect node to connect to
        #[arg(long)]
        node: Option<String>,
    },

    /// Manage virtual machines
    Vm {
        #[command(subcommand)]
        action: VmCommand,
    },

    /// Manage cloudspaces
    Cloudspace {
        #[command(subcommand)]
        action: CloudspaceCommand,
    },

    /// Manage port forwards
    Forwarding {
        #[command(subcommand)]
        action: ForwardingCommand,
    },
}

#[derive(Subcommand)]
enum VmCommand {
    /// Create a machine reachable over SSH
    Create {
        /// Preselect cloudspace
        #[arg(long)]
        cloudspace: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// VM memory in MiB (defaults to the configured value, 1024)
        #[arg(long)]
        memory: Option<u32>,
        /// VM vcpus (defaults to the configured value, 1)
        #[arg(long)]
        vcpus: Option<u32>,
    },

    /// List machines of a cloudspace
    List {
        /// Preselect cloudspace
        #[arg(long)]
        cloudspace: Option<String>,
    },

    /// Delete a machine permanently
    Delete {
        /// Preselect cloudspace
        #[arg(long)]
        cloudspace: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CloudspaceCommand {
    /// List cloudspaces
    List,

    /// Create a cloudspace
    Create {
        #[arg(long)]
        name: Option<String>,
        /// Filter for the owning account
        #[arg(long)]
        account: Option<String>,
        /// Cloudspace type
        #[arg(long = "type")]
        cloudspace_type: Option<String>,
    },

    /// Delete a cloudspace permanently
    Delete {
        #[arg(long)]
        name: Option<String>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ForwardingCommand {
    /// List port forwards of a cloudspace
    List {
        /// Preselect cloudspace
        #[arg(long)]
        cloudspace: Option<String>,
    },

    /// Forward a public port to a machine
    Create {
        /// Preselect cloudspace
        #[arg(long)]
        cloudspace: Option<String>,
        /// Preselect vm
        #[arg(long)]
        machine: Option<String>,
        /// Choose public port (first free one when omitted)
        #[arg(long = "publicport")]
        public_port: Option<u16>,
        /// Choose private port
        #[arg(long = "privateport")]
        private_port: u16,
    },

    /// Delete a port forward
    Delete {
        /// Preselect cloudspace
        #[arg(long)]
        cloudspace: Option<String>,
        /// Public port of the forward
        #[arg(long = "publicport")]
        public_port: u16,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Fine be that way");
            std::process::exit(0);
        }
    });

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => OvcConfig::config_path()?,
    };
    let config = OvcConfig::load_from(&config_path)
        .with_context(|| format!("Could not load {}", config_path.display()))?;
    if config.environments.is_empty() {
        bail!("No environments configured in {}", config_path.display());
    }

    let defaults = config.defaults.clone();
    let mut api = OvcClient::new(config).with_config_path(config_path);
    let mut frontend = TerminalFrontend::new(
        Theme::default(),
        TerminalPicker::detect(),
        defaults.forward_agent,
    );
    let env = cli.env.as_deref();

    let command = match cli.command {
        None | Some(Commands::Shell) => {
            return commands::shell(&mut api, &mut frontend, defaults, env).await;
        }
        Some(command) => command,
    };

    actions::choose_environment(&mut api, &mut frontend, env).await?;

    match command {
        Commands::Shell => unreachable!(), // Handled above
        Commands::Zaccess { node } => {
            commands::zaccess(&api, &mut frontend, node.as_deref()).await?;
        }
        Commands::Vm { action } => match action {
            VmCommand::Create {
                cloudspace,
                name,
                memory,
                vcpus,
            } => {
                commands::vm::create(
                    &api,
                    &mut frontend,
                    &defaults,
                    cloudspace.as_deref(),
                    name,
                    memory,
                    vcpus,
                )
                .await?;
            }
            VmCommand::List { cloudspace } => {
                commands::vm::list(&api, &mut frontend, cloudspace.as_deref()).await?;
            }
            VmCommand::Delete {
                cloudspace,
                name,
                yes,
            } => {
                commands::vm::delete(
                    &api,
                    &mut frontend,
                    cloudspace.as_deref(),
                    name.as_deref(),
                    yes,
                )
                .await?;
            }
        },
        Commands::Cloudspace { action } => match action {
            CloudspaceCommand::List => {
                commands::cloudspace::list(&api, &mut frontend).await?;
            }
            CloudspaceCommand::Create {
                name,
                account,
                cloudspace_type,
            } => {
                commands::cloudspace::create(
                    &api,
                    &mut frontend,
                    name,
                    account.as_deref(),
                    cloudspace_type.as_deref(),
                )
                .await?;
            }
            CloudspaceCommand::Delete { name, yes } => {
                commands::cloudspace::delete(&api, &mut frontend, name.as_deref(), yes).await?;
            }
        },
        Commands::Forwarding { action } => match action {
            ForwardingCommand::List { cloudspace } => {
                commands::forwarding::list(&api, &mut frontend, cloudspace.as_deref()).await?;
            }
            ForwardingCommand::Create {
                cloudspace,
                machine,
                public_port,
                private_port,
            } => {
                commands::forwarding::create(
                    &api,
                    &mut frontend,
                    cloudspace.as_deref(),
                    machine.as_deref(),
                    public_port,
                    private_port,
                )
                .await?;
            }
            ForwardingCommand::Delete {
                cloudspace,
                public_port,
                yes,
            } => {
                commands::forwarding::delete(
                    &api,
                    &mut frontend,
                    cloudspace.as_deref(),
                    public_port,
                    yes,
                )
                .await?;
            }
        },
    }

    Ok(())
}
