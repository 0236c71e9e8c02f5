//! Rename rule table and compiled matchers.
//!
//! The declarative table lists every symbol the engine moved out of its
//! monolithic module during the NavigationSystem split, with the new
//! include subdirectory and owning module. `RuleSet::compile` expands
//! the table once at startup into immutable matcher pairs; rule order
//! defines precedence: the first rule whose matcher fires on a line
//! wins and later rules are never consulted for that line.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

// ============================================================================
// Declarative table
// ============================================================================

/// One entry of the declarative rename table.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRule {
    /// Bare identifier being renamed (no extension).
    pub symbol: &'static str,
    /// Path prefix inserted before the include filename (may be empty).
    pub include_dir: &'static str,
    /// Module the symbol now lives in.
    pub module: &'static str,
    /// New name in serialized references, when the symbol itself was renamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_name: Option<&'static str>,
}

const fn moved(
    symbol: &'static str,
    include_dir: &'static str,
    module: &'static str,
) -> RenameRule {
    RenameRule {
        symbol,
        include_dir,
        module,
        script_name: None,
    }
}

const fn renamed(
    symbol: &'static str,
    include_dir: &'static str,
    module: &'static str,
    script_name: &'static str,
) -> RenameRule {
    RenameRule {
        symbol,
        include_dir,
        module,
        script_name: Some(script_name),
    }
}

/// The builtin NavigationSystem migration table.
///
/// Order matters: `NavAreaMeta_SwitchByAgent` must precede `NavAreaMeta`
/// so the longer serialized reference is claimed first.
pub const RENAME_TABLE: &[RenameRule] = &[
    moved("AbstractNavData", "", "NavigationSystem"),
    moved("CrowdManagerBase", "", "NavigationSystem"),
    moved("NavArea", "NavAreas/", "NavigationSystem"),
    moved("NavAreaMeta_SwitchByAgent", "NavAreas/", "NavigationSystem"),
    moved("NavAreaMeta", "NavAreas/", "NavigationSystem"),
    moved("NavArea_Default", "NavAreas/", "NavigationSystem"),
    moved("NavArea_LowHeight", "NavAreas/", "NavigationSystem"),
    moved("NavArea_Null", "NavAreas/", "NavigationSystem"),
    moved("NavArea_Obstacle", "NavAreas/", "NavigationSystem"),
    moved("NavCollision", "", "NavigationSystem"),
    moved("NavigationQueryFilter", "NavFilters/", "NavigationSystem"),
    moved("RecastFilter_UseDefaultArea", "NavFilters/", "NavigationSystem"),
    moved("NavigationGraph", "NavGraph/", "NavigationSystem"),
    moved("NavigationGraphNode", "NavGraph/", "NavigationSystem"),
    moved("NavigationGraphNodeComponent", "NavGraph/", "NavigationSystem"),
    moved("NavLinkComponent", "", "NavigationSystem"),
    moved("NavLinkCustomComponent", "", "NavigationSystem"),
    moved("NavLinkCustomInterface", "", "NavigationSystem"),
    moved("NavLinkHostInterface", "", "NavigationSystem"),
    moved("NavLinkRenderingComponent", "", "NavigationSystem"),
    moved("NavLinkRenderingProxy", "", "NavigationSystem"),
    moved("NavLinkTrivial", "", "NavigationSystem"),
    moved("NavMeshBoundsVolume", "NavMesh/", "NavigationSystem"),
    moved("NavMeshPath", "NavMesh/", "NavigationSystem"),
    moved("NavMeshRenderingComponent", "NavMesh/", "NavigationSystem"),
    moved("NavTestRenderingComponent", "NavMesh/", "NavigationSystem"),
    moved("PImplRecastNavMesh", "NavMesh/", "NavigationSystem"),
    moved("RecastHelpers", "NavMesh/", "NavigationSystem"),
    moved("RecastNavMesh", "NavMesh/", "NavigationSystem"),
    moved("RecastNavMeshDataChunk", "NavMesh/", "NavigationSystem"),
    moved("RecastNavMeshGenerator", "NavMesh/", "NavigationSystem"),
    moved("RecastQueryFilter", "NavMesh/", "NavigationSystem"),
    moved("NavModifierComponent", "", "NavigationSystem"),
    moved("NavModifierVolume", "", "NavigationSystem"),
    moved("NavNodeInterface", "", "NavigationSystem"),
    moved("NavRelevantComponent", "", "NavigationSystem"),
    moved("NavigationData", "", "NavigationSystem"),
    moved("NavigationInvokerComponent", "", "NavigationSystem"),
    moved("NavigationOctree", "", "NavigationSystem"),
    moved("NavigationPath", "", "NavigationSystem"),
    moved("NavigationPathGenerator", "", "NavigationSystem"),
    renamed("NavigationSystem", "", "NavigationSystem", "NavigationSystemV1"),
    moved("NavigationSystemModule", "", "NavigationSystem"),
    moved("NavigationSystemTypes", "", "NavigationSystem"),
    moved("NavigationTestingActor", "", "NavigationSystem"),
    moved("NavLinkProxy", "Navigation/", "AIModule"),
];

// ============================================================================
// Compiled rules
// ============================================================================

/// A rename rule compiled into its two matchers.
///
/// Built once from the declarative table at process start; read-only for
/// the rest of the run.
#[derive(Debug)]
pub struct CompiledRule {
    pub symbol: &'static str,
    include_re: Regex,
    include_dir: &'static str,
    script_re: Regex,
    script_replacement: String,
}

impl CompiledRule {
    fn compile(rule: &RenameRule) -> Result<Self> {
        let include_re = Regex::new(&format!(r#"(?i)#include.*\W({}\.h)""#, rule.symbol))
            .map_err(|e| Error::config_invalid_rule(rule.symbol, e.to_string()))?;
        let script_re = Regex::new(&format!(r"(?i)(/Script/)Engine(\.{})", rule.symbol))
            .map_err(|e| Error::config_invalid_rule(rule.symbol, e.to_string()))?;

        let script_replacement = match rule.script_name {
            Some(name) => format!("${{1}}{}.{}", rule.module, name),
            None => format!("${{1}}{}${{2}}", rule.module),
        };

        Ok(CompiledRule {
            symbol: rule.symbol,
            include_re,
            include_dir: rule.include_dir,
            script_re,
            script_replacement,
        })
    }

    /// Synthesize the replacement include line if this rule's header is
    /// referenced. The caller compares against the original line.
    pub(crate) fn try_include(&self, line: &str) -> Option<String> {
        let caps = self.include_re.captures(line)?;
        Some(format!("#include \"{}{}\"", self.include_dir, &caps[1]))
    }

    /// Substitute this rule's serialized reference, if present.
    pub(crate) fn try_script(&self, line: &str) -> Option<String> {
        if !self.script_re.is_match(line) {
            return None;
        }
        Some(
            self.script_re
                .replace_all(line, self.script_replacement.as_str())
                .into_owned(),
        )
    }
}

// ============================================================================
// Idiom rules
// ============================================================================

/// A free-form call-site rewrite unrelated to the rename table.
///
/// Idiom rules apply only to game code and chain: each rule runs against
/// the line as left by the previous one.
#[derive(Debug)]
pub struct IdiomRule {
    pattern: Regex,
    replacement: &'static str,
}

impl IdiomRule {
    pub(crate) fn apply(&self, line: &str) -> String {
        self.pattern.replace_all(line, self.replacement).into_owned()
    }
}

/// Deprecated game-code patterns and their replacements, in application
/// order. Accessor forms come before the bare identifier rewrite so the
/// `GetNavigationSystem()` call sites are rebuilt before `UNavigationSystem`
/// itself is renamed.
const IDIOM_TABLE: &[(&str, &str)] = &[
    (
        r"UNavigationSystem::InitializeForWorld\(",
        "FNavigationSystem::AddNavigationSystemToWorld(*",
    ),
    (
        r"(\w+)\.GetNavigationSystem\(\)->",
        "FNavigationSystem::GetCurrent<UNavigationSystemV1>(&${1})->",
    ),
    (
        r"(\w+(\(\))?)->GetNavigationSystem\(\)->",
        "FNavigationSystem::GetCurrent<UNavigationSystemV1>(${1})->",
    ),
    (
        r"=\s*(\w+)\.GetNavigationSystem\(\)",
        "= FNavigationSystem::GetCurrent<UNavigationSystemV1>(&${1})",
    ),
    (
        r"=\s*(\w+(\(\))?)->GetNavigationSystem\(\)",
        "= FNavigationSystem::GetCurrent<UNavigationSystemV1>(${1})",
    ),
    (r"(\W*)UNavigationSystem(\W)", "${1}UNavigationSystemV1${2}"),
    (r"(\W*)GetMainNavData([\(\W]*)", "${1}GetDefaultNavDataInstance${2}"),
    (
        r"FNavigationSystem::ECreateIfEmpty",
        "FNavigationSystem::ECreateIfMissing",
    ),
];

// ============================================================================
// Rule set
// ============================================================================

/// The compiled bundle threaded through the whole run.
#[derive(Debug)]
pub struct RuleSet {
    renames: Vec<CompiledRule>,
    idioms: Vec<IdiomRule>,
    include_line: Regex,
    script_marker: Regex,
}

impl RuleSet {
    /// Compile the builtin NavigationSystem table.
    pub fn builtin() -> Result<Self> {
        Self::compile(RENAME_TABLE)
    }

    /// Compile an arbitrary rename table.
    ///
    /// Fails fast on an uncompilable entry or a duplicate symbol; the
    /// run must not proceed with an ambiguous rule set.
    pub fn compile(table: &[RenameRule]) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in table {
            if !seen.insert(rule.symbol) {
                return Err(Error::config_duplicate_symbol(rule.symbol));
            }
        }

        let renames = table
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;

        let idioms = IDIOM_TABLE
            .iter()
            .map(|&(pattern, replacement)| {
                Ok(IdiomRule {
                    pattern: Regex::new(pattern)
                        .map_err(|e| Error::config_invalid_rule(pattern, e.to_string()))?,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleSet {
            renames,
            idioms,
            include_line: Regex::new(r"(?i)^#include\s+")
                .map_err(|e| Error::config_invalid_rule("#include", e.to_string()))?,
            script_marker: Regex::new(r"(?i)/Script/Engine\.")
                .map_err(|e| Error::config_invalid_rule("/Script/Engine.", e.to_string()))?,
        })
    }

    /// The declarative builtin table, for display.
    pub fn table() -> &'static [RenameRule] {
        RENAME_TABLE
    }

    pub(crate) fn renames(&self) -> &[CompiledRule] {
        &self.renames
    }

    pub(crate) fn idioms(&self) -> &[IdiomRule] {
        &self.idioms
    }

    pub(crate) fn is_include_line(&self, line: &str) -> bool {
        self.include_line.is_match(line)
    }

    pub(crate) fn has_script_marker(&self, line: &str) -> bool {
        self.script_marker.is_match(line)
    }
}

// ============================================================================
// Tests
// ============================================================================
