use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// GitHub user owning unqualified repositories
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// GitHub access token
    #[arg(short, long, global = true)]
    pub access_token: Option<String>,

    /// Address to serve on
    #[arg(short, long, global = true)]
    pub bind: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the package index over HTTP
    Serve {
        /// Repositories to track in addition to the configured ones
        #[arg(required = false)]
        repositories: Vec<String>,
    },

    /// Resolve every repository once and print the assets
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Repositories to track in addition to the configured ones
        #[arg(required = false)]
        repositories: Vec<String>,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}
