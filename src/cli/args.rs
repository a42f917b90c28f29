//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Render nested directory group membership as a tree, flagging circular nesting
#[derive(Parser, Debug)]
#[command(name = "grouptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output to stderr (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/grouptree/grouptree.toml)
    #[arg(long = "config", global = true, value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show who is a member of a group, recursively
    Members(TreeArgs),

    /// Show which groups an object belongs to, recursively
    #[command(name = "memberof")]
    MemberOf(TreeArgs),

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments shared by the tree commands.
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// Group or object name (account name or display name)
    pub name: String,

    /// Full DNS domain name, e.g. ad.example.com
    pub domain: String,

    /// Pipeable output: no colors, safe to redirect
    #[arg(short, long, visible_alias = "make-pipeable")]
    pub plain: bool,

    /// Draw branches with ASCII characters
    #[arg(long)]
    pub ascii: bool,

    /// Detect circular nesting against the whole ancestor chain
    #[arg(long)]
    pub full_cycle_check: bool,

    /// Abort when the tree grows beyond N nodes
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,

    /// Abort when nesting goes deeper than N levels
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Read the directory from a TOML snapshot instead of LDAP
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    /// Directory server to query (default: the domain name)
    #[arg(long, value_hint = ValueHint::Hostname)]
    pub server: Option<String>,

    /// LDAP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Connect with ldaps://
    #[arg(long)]
    pub tls: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
