//! Line classification and the rewrite engine.
//!
//! Every line is classified as exactly one of: include directive,
//! serialized engine reference, or ordinary source. Include and
//! serialized rewrites use the rename table (first structural match
//! wins); ordinary lines in game code additionally run the idiom rules,
//! which chain within the line. A line never receives both an include
//! rewrite and an idiom rewrite.

use serde::Serialize;

use crate::rules::RuleSet;

/// A single applied rewrite within a file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChange {
    /// Line number, starting at 1.
    pub line_number: usize,
    pub original: String,
    pub rewritten: String,
}

/// Strip the trailing line terminator (`\n`, `\r\n`, or bare `\r`).
pub(crate) fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Classify one line and apply the matching rule subset.
///
/// Returns `(original, rewritten)` when a rule produced a different
/// line, `None` otherwise. `engine_code` gates the idiom rules: engine
/// sources receive include and serialized-reference rewrites only.
pub fn check_line(rules: &RuleSet, line: &str, engine_code: bool) -> Option<(String, String)> {
    let line = chomp(line);

    if rules.is_include_line(line) {
        // First structural match wins; later rules are not consulted
        // even when the synthesized line is unchanged.
        for rule in rules.renames() {
            if let Some(rewritten) = rule.try_include(line) {
                if rewritten != line {
                    return Some((line.to_string(), rewritten));
                }
                return None;
            }
        }
        return None;
    }

    if rules.has_script_marker(line) {
        for rule in rules.renames() {
            if let Some(rewritten) = rule.try_script(line) {
                if rewritten != line {
                    return Some((line.to_string(), rewritten));
                }
                return None;
            }
        }
        return None;
    }

    if !engine_code {
        let mut work = line.to_string();
        for idiom in rules.idioms() {
            work = idiom.apply(&work);
        }
        if work != line {
            return Some((line.to_string(), work));
        }
    }

    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RenameRule, RuleSet};

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    #[test]
    fn include_is_requalified() {
        let change = check_line(&rules(), "#include \"NavArea.h\"\n", false).unwrap();
        assert_eq!(change.0, "#include \"NavArea.h\"");
        assert_eq!(change.1, "#include \"NavAreas/NavArea.h\"");
    }

    #[test]
    fn include_applies_to_engine_code_too() {
        let change = check_line(&rules(), "#include \"RecastNavMesh.h\"", true).unwrap();
        assert_eq!(change.1, "#include \"NavMesh/RecastNavMesh.h\"");
    }

    #[test]
    fn requalified_include_is_left_alone() {
        assert!(check_line(&rules(), "#include \"NavAreas/NavArea.h\"", false).is_none());
    }

    #[test]
    fn include_without_table_entry_is_left_alone() {
        assert!(check_line(&rules(), "#include \"CoreMinimal.h\"", false).is_none());
    }

    #[test]
    fn serialized_reference_is_renamed() {
        let change = check_line(&rules(), "/Script/Engine.NavigationSystem", false).unwrap();
        assert_eq!(change.1, "/Script/NavigationSystem.NavigationSystemV1");
    }

    #[test]
    fn serialized_reference_keeps_symbol_without_script_name() {
        let change = check_line(
            &rules(),
            "NavAreaClass=/Script/Engine.NavArea_Obstacle",
            true,
        )
        .unwrap();
        assert_eq!(change.1, "NavAreaClass=/Script/NavigationSystem.NavArea_Obstacle");
    }

    #[test]
    fn idiom_rules_chain_within_one_line() {
        let line = "UNavigationSystem* Nav = GetNavSys(); Nav->GetMainNavData();";
        let change = check_line(&rules(), line, false).unwrap();
        assert!(change.1.contains("UNavigationSystemV1*"));
        assert!(change.1.contains("GetDefaultNavDataInstance"));
        assert!(!change.1.contains("GetMainNavData"));
    }

    #[test]
    fn idiom_rules_never_touch_engine_code() {
        let line = "UNavigationSystem* Nav = GetNavSys(); Nav->GetMainNavData();";
        assert!(check_line(&rules(), line, true).is_none());
    }

    #[test]
    fn accessor_idiom_rebuilds_call_site() {
        let change = check_line(
            &rules(),
            "UNavigationSystem* Nav = World->GetNavigationSystem()->GetOwner();",
            false,
        )
        .unwrap();
        assert!(change
            .1
            .contains("FNavigationSystem::GetCurrent<UNavigationSystemV1>(World)->"));
    }

    #[test]
    fn classification_is_mutually_exclusive() {
        // An include line never runs idiom rules, even in game code.
        assert!(check_line(&rules(), "#include \"GetMainNavData.h\"", false).is_none());
    }

    #[test]
    fn rewrite_is_idempotent() {
        let samples = [
            "#include \"NavArea.h\"",
            "/Script/Engine.NavigationSystem",
            "UNavigationSystem* Nav = GetNavSys(); Nav->GetMainNavData();",
            "if (FNavigationSystem::ECreateIfEmpty == Mode)",
        ];
        let rules = rules();
        for line in samples {
            let (_, rewritten) = check_line(&rules, line, false).unwrap();
            assert!(
                check_line(&rules, &rewritten, false).is_none(),
                "rewrite of {:?} was not idempotent",
                line
            );
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        const TABLE: &[RenameRule] = &[
            RenameRule {
                symbol: "Nav",
                include_dir: "",
                module: "First",
                script_name: None,
            },
            RenameRule {
                symbol: "NavArea",
                include_dir: "",
                module: "Second",
                script_name: None,
            },
        ];
        let rules = RuleSet::compile(TABLE).unwrap();
        let change = check_line(&rules, "/Script/Engine.NavArea", true).unwrap();
        assert_eq!(change.1, "/Script/First.NavArea");
    }

    #[test]
    fn terminator_is_stripped_before_matching() {
        let change = check_line(&rules(), "#include \"NavArea.h\"\r\n", false).unwrap();
        assert_eq!(change.0, "#include \"NavArea.h\"");
        assert_eq!(change.1, "#include \"NavAreas/NavArea.h\"");
    }
}
