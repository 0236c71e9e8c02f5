use clap::Args;
use serde::Serialize;

use navmig::{RenameRule, RuleSet};

#[derive(Args)]
pub struct RulesArgs {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesOutput {
    pub rules: Vec<RenameRule>,
}

pub fn run(_args: RulesArgs) -> navmig::Result<RulesOutput> {
    Ok(RulesOutput {
        rules: RuleSet::table().to_vec(),
    })
}

/// One line per rule: symbol, new include location, new module.
pub fn render(output: &RulesOutput) -> String {
    let mut out = String::new();
    for rule in &output.rules {
        out.push_str(&format!(
            "{} -> {}{}.h [{}{}]\n",
            rule.symbol,
            rule.include_dir,
            rule.symbol,
            rule.module,
            rule.script_name
                .map(|name| format!(", serialized as {}", name))
                .unwrap_or_default(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_every_rule() {
        let output = run(RulesArgs {}).unwrap();
        let rendered = render(&output);
        assert_eq!(rendered.lines().count(), output.rules.len());
        assert!(rendered.contains("NavArea -> NavAreas/NavArea.h [NavigationSystem]"));
        assert!(rendered.contains(
            "NavigationSystem -> NavigationSystem.h [NavigationSystem, serialized as NavigationSystemV1]"
        ));
    }
}
