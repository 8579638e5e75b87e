//! Records and Run Reporting Types
//!
//! `Record` is the one entity read from the mapping file; everything else
//! here describes what a run intends to do or did.

use crate::config::ReorganizerConfig;
use crate::{PackageifyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// One mapping-file entry: a unit and the namespace it moves into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// File stem of the unit in the source directory
    pub unit_name: String,
    /// Dot-delimited namespace path, e.g. `com.marcusman.utils`
    pub namespace_path: String,
}

impl Record {
    /// Create a record. Both fields are expected to be non-empty.
    pub fn new(unit_name: impl Into<String>, namespace_path: impl Into<String>) -> Self {
        Self {
            unit_name: unit_name.into(),
            namespace_path: namespace_path.into(),
        }
    }

    /// Namespace path in directory form: `com.marcusman` becomes `com/marcusman`
    ///
    /// Fails when a segment would leave the destination root.
    pub fn directory_path(&self) -> Result<PathBuf> {
        directory_path(&self.namespace_path).ok_or_else(|| {
            PackageifyError::InvalidInput(format!(
                "namespace path {:?} of unit {} is not a relative directory path",
                self.namespace_path, self.unit_name
            ))
        })
    }

    /// File name of the unit, e.g. `Game.java`
    ///
    /// Fails when the unit name is not a single plain path component.
    pub fn file_name(&self, config: &ReorganizerConfig) -> Result<String> {
        if !is_plain_name(&self.unit_name) {
            return Err(PackageifyError::InvalidInput(format!(
                "unit name {:?} is not a plain file name",
                self.unit_name
            )));
        }
        Ok(format!("{}.{}", self.unit_name, config.managed_extension))
    }

    /// Namespace declaration line, e.g. `package com.marcusman;`
    pub fn namespace_declaration(&self, config: &ReorganizerConfig) -> String {
        format!(
            "{} {}{}",
            config.namespace_keyword, self.namespace_path, config.statement_terminator
        )
    }

    /// Fully qualified name, e.g. `com.marcusman.utils.GameObject`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace_path, self.unit_name)
    }

    /// Reference-injection line, e.g. `import com.marcusman.utils.GameObject;`
    pub fn reference_line(&self, config: &ReorganizerConfig) -> String {
        format!(
            "{} {}{}",
            config.reference_keyword,
            self.qualified_name(),
            config.statement_terminator
        )
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Class Name: {} Package: {}", self.unit_name, self.namespace_path)
    }
}

/// Directory form of a namespace path
///
/// `None` when the path is empty or any segment is absolute, a root, or
/// a `.`/`..` component; the result always stays under the directory it
/// is joined onto.
pub fn directory_path(namespace_path: &str) -> Option<PathBuf> {
    let mut dir = PathBuf::new();
    for segment in namespace_path.split('.') {
        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => dir.push(part),
                _ => return None,
            }
        }
    }
    if dir.as_os_str().is_empty() {
        None
    } else {
        Some(dir)
    }
}

/// Whether `name` is exactly one normal path component
pub fn is_plain_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Recover the namespace path from a declaration line
///
/// Inverse of [`Record::namespace_declaration`] for the same config.
pub fn namespace_from_declaration(line: &str, config: &ReorganizerConfig) -> Option<String> {
    let rest = line.trim().strip_prefix(config.namespace_keyword.as_str())?;
    let rest = rest.strip_prefix(' ')?;
    let path = rest.strip_suffix(config.statement_terminator.as_str())?;
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Where a mapped unit goes and what its header will contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub unit_name: String,
    pub namespace_path: String,
    pub source: PathBuf,
    pub target: PathBuf,
    /// Qualified names of the units referenced from this one, in table order
    pub references: Vec<String>,
}

/// What the passthrough phase does with one top-level source entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PassthroughAction {
    /// Byte-for-byte copy of a regular file
    Copy { source: PathBuf, target: PathBuf },
    /// Recursive copy of a subdirectory
    CopyTree { source: PathBuf, target: PathBuf },
    /// Entry left behind
    Skip { source: PathBuf, reason: String },
}

impl PassthroughAction {
    pub fn source(&self) -> &PathBuf {
        match self {
            PassthroughAction::Copy { source, .. }
            | PassthroughAction::CopyTree { source, .. }
            | PassthroughAction::Skip { source, .. } => source,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, PassthroughAction::Skip { .. })
    }
}

/// Everything a run would do, computed without touching the destination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorganizationPlan {
    pub placements: Vec<Placement>,
    pub passthrough: Vec<PassthroughAction>,
    /// Managed files in the source directory that no record names
    pub unmapped_units: Vec<String>,
    /// Unit names that appear on more than one mapping line
    pub duplicate_units: Vec<String>,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub placements: Vec<Placement>,
    pub passthrough: Vec<PassthroughAction>,
    pub unmapped_units: Vec<String>,
    pub duplicate_units: Vec<String>,
}

impl RunSummary {
    /// Number of rewritten unit files
    pub fn units_written(&self) -> usize {
        self.placements.len()
    }

    /// Number of passthrough entries actually copied
    pub fn entries_copied(&self) -> usize {
        self.passthrough.iter().filter(|action| !action.is_skip()).count()
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_directory_path() {
        assert_eq!(directory_path("com.marcusman.utils"), Some(PathBuf::from("com/marcusman/utils")));
        assert_eq!(directory_path("com"), Some(PathBuf::from("com")));
        assert_eq!(directory_path(""), None);
        assert_eq!(
            Record::new("Game", "com.marcusman").directory_path().unwrap(),
            PathBuf::from("com/marcusman")
        );
    }

    #[test]
    fn test_directory_path_stays_relative() {
        assert_eq!(directory_path("com./tmp/escaped"), None);
        assert_eq!(directory_path("/etc"), None);
        assert_eq!(directory_path("com/../../x"), None);
        assert_eq!(directory_path("..."), None);

        let err = Record::new("Game", "com./tmp/escaped").directory_path().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_file_name_rejects_paths() {
        let config = ReorganizerConfig::default();
        for unit in ["/tmp/Game", "../Game", "sub/Game", "..", "."] {
            assert!(Record::new(unit, "com").file_name(&config).is_err(), "unit {:?}", unit);
        }
        assert!(is_plain_name("Game"));
    }

    #[test]
    fn test_generated_lines() {
        let config = ReorganizerConfig::default();
        let record = Record::new("GameObject", "com.marcusman.utils");

        assert_eq!(record.file_name(&config).unwrap(), "GameObject.java");
        assert_eq!(record.namespace_declaration(&config), "package com.marcusman.utils;");
        assert_eq!(record.reference_line(&config), "import com.marcusman.utils.GameObject;");
        assert_eq!(record.to_string(), "Class Name: GameObject Package: com.marcusman.utils");
    }

    #[test]
    fn test_namespace_from_declaration_rejects_other_lines() {
        let config = ReorganizerConfig::default();
        assert_eq!(namespace_from_declaration("import a.B;", &config), None);
        assert_eq!(namespace_from_declaration("package ;", &config), None);
        assert_eq!(namespace_from_declaration("package a.b", &config), None);
        assert_eq!(namespace_from_declaration("  package a.b;\n", &config), Some("a.b".to_string()));
    }

    #[test]
    fn test_custom_keywords_round_trip() {
        let config = ReorganizerConfig {
            namespace_keyword: "namespace".to_string(),
            statement_terminator: String::new(),
            ..ReorganizerConfig::default()
        };
        let record = Record::new("Widget", "Acme.Ui");
        let line = record.namespace_declaration(&config);
        assert_eq!(line, "namespace Acme.Ui");
        assert_eq!(namespace_from_declaration(&line, &config), Some("Acme.Ui".to_string()));
    }

    #[test]
    fn test_summary_counts() {
        let now = Utc::now();
        let summary = RunSummary {
            run_id: "run".to_string(),
            started_at: now,
            finished_at: now,
            placements: Vec::new(),
            passthrough: vec![
                PassthroughAction::Copy { source: "a.txt".into(), target: "out/a.txt".into() },
                PassthroughAction::Skip { source: "dir".into(), reason: "directory".into() },
            ],
            unmapped_units: Vec::new(),
            duplicate_units: Vec::new(),
        };
        assert_eq!(summary.units_written(), 0);
        assert_eq!(summary.entries_copied(), 1);
        assert!(summary.duration_seconds().abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_declaration_round_trip(path in "[a-z][a-z0-9_]{0,8}(\\.[a-z][a-z0-9_]{0,8}){0,4}") {
            let config = ReorganizerConfig::default();
            let record = Record::new("Unit", path.clone());
            let line = record.namespace_declaration(&config);
            prop_assert_eq!(namespace_from_declaration(&line, &config), Some(path));
        }

        #[test]
        fn prop_directory_path_has_one_component_per_segment(path in "[A-Za-z]{1,6}(\\.[A-Za-z]{1,6}){0,5}") {
            let dir = directory_path(&path).unwrap();
            prop_assert_eq!(dir.components().count(), path.split('.').count());
        }
    }
}
