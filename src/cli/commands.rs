//! Command dispatch

use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output::{self, TreePrinter};
use crate::cli::{CliError, CliResult};
use crate::config::{expand_path, global_config_path, CycleCheck, Settings};
use crate::domain::Direction;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Members(args) => tree_command(cli, args, Direction::Downward),
        Commands::MemberOf(args) => tree_command(cli, args, Direction::Upward),
        Commands::Config { command } => config_command(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Apply command line flags on top of loaded settings.
pub fn apply_overrides(settings: &mut Settings, args: &TreeArgs) {
    if args.ascii {
        settings.output.ascii = true;
    }
    if args.full_cycle_check {
        settings.traversal.cycle_check = CycleCheck::Ancestors;
    }
    if let Some(max_nodes) = args.max_nodes {
        settings.traversal.max_nodes = max_nodes;
    }
    if let Some(max_depth) = args.max_depth {
        settings.traversal.max_depth = max_depth;
    }
    if let Some(server) = &args.server {
        settings.ldap.server = Some(server.clone());
    }
    if let Some(port) = args.port {
        settings.ldap.port = Some(port);
    }
    if args.tls {
        settings.ldap.use_tls = true;
    }
}

#[instrument(skip(cli))]
fn tree_command(cli: &Cli, args: &TreeArgs, direction: Direction) -> CliResult<()> {
    let mut settings = Settings::load(cli.config_file.as_deref())?;
    apply_overrides(&mut settings, args);
    debug!("settings: {:?}", settings);

    let container = match &args.snapshot {
        Some(path) => {
            ServiceContainer::with_snapshot(settings, &expand_path(&path.to_string_lossy()))?
        }
        None => ServiceContainer::new(settings),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_tree(&container, args, direction, &mut out)
}

/// Expand, render and print one membership tree.
pub fn run_tree<W: Write>(
    container: &ServiceContainer,
    args: &TreeArgs,
    direction: Direction,
    out: &mut W,
) -> CliResult<()> {
    let mut tree = container
        .expander()
        .expand(&args.name, &args.domain, direction)?;
    let lines = container.renderer().render(&mut tree);

    TreePrinter::new(!args.plain)
        .write_tree(out, &lines)
        .map_err(|e| InfraError::io("write tree", e))?;
    Ok(())
}

fn config_target(cli: &Cli) -> CliResult<PathBuf> {
    cli.config_file
        .clone()
        .or_else(global_config_path)
        .ok_or_else(|| CliError::Usage("cannot determine config directory".to_string()))
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config_file.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::info(&config_target(cli)?.display());
        }
        ConfigCommands::Init { force } => {
            let path = config_target(cli)?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config file already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
