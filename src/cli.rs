use crate::config::CliOverrides;
use clap::Parser;

/// Track and document npm, yarn and pnpm override directives
#[derive(Parser, Debug)]
#[command(name = "pastoralist")]
#[command(version)]
#[command(
    about = "Keep package.json overrides and resolutions accountable",
    long_about = None
)]
pub struct Args {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<String>,

    /// Compute everything but do not write package.json
    #[arg(long)]
    pub dry_run: bool,

    /// Workspace member patterns, or the sentinel "workspace" to reuse the
    /// manifest's workspaces field. Can be specified multiple times.
    #[arg(long = "dep-paths", value_name = "PATTERN")]
    pub dep_paths: Vec<String>,

    /// Reason recorded in the ledger of every newly tracked override
    #[arg(short, long)]
    pub reason: Option<String>,

    /// Look up overridden packages in a vulnerability database
    #[arg(long)]
    pub check_security: bool,

    /// Security provider to query (currently only "osv")
    #[arg(long, requires = "check_security")]
    pub provider: Option<String>,

    /// Print diagnostic output
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subset of flags that participate in config-file precedence.
    pub fn cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            dep_paths: self.dep_paths.clone(),
            reason: self.reason.clone(),
            // An absent flag must not override a config-file "enabled".
            check_security: self.check_security.then_some(true),
            provider: self.provider.clone(),
        }
    }
}
