use clap::Args;
use std::path::PathBuf;

use navmig::walker::{self, MigrationReport};
use navmig::{MigrationConfig, RuleSet};

#[derive(Args)]
pub struct ScanArgs {
    /// Subdirectories to restrict the scan to (default: the whole tree)
    pub dirs: Vec<String>,

    /// Project root to scan
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: ScanArgs) -> navmig::Result<MigrationReport> {
    let rules = RuleSet::builtin()?;
    let config = MigrationConfig {
        root: args.root,
        subdirs: args.dirs,
        apply: false,
    };
    walker::run(&rules, &config)
}
