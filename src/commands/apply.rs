use clap::Args;
use std::path::PathBuf;

use navmig::walker::{self, MigrationReport};
use navmig::{MigrationConfig, RuleSet};

#[derive(Args)]
pub struct ApplyArgs {
    /// Subdirectories to restrict the rewrite to (default: the whole tree)
    pub dirs: Vec<String>,

    /// Project root to rewrite
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: ApplyArgs) -> navmig::Result<MigrationReport> {
    let rules = RuleSet::builtin()?;
    let config = MigrationConfig {
        root: args.root,
        subdirs: args.dirs,
        apply: true,
    };
    walker::run(&rules, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn apply_rewrites_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Bot.cpp"), "#include \"NavArea.h\"\n").unwrap();

        let report = run(ApplyArgs {
            dirs: Vec::new(),
            root: dir.path().to_path_buf(),
        })
        .unwrap();

        assert!(report.applied);
        assert_eq!(
            fs::read_to_string(dir.path().join("Bot.cpp")).unwrap(),
            "#include \"NavAreas/NavArea.h\"\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Bot.cpp.bak")).unwrap(),
            "#include \"NavArea.h\"\n"
        );
    }
}
