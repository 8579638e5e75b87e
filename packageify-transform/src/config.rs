//! Reorganizer configuration
//!
//! Defaults describe the Java layout: `.java` files, `package` and
//! `import` keywords, `;` terminators.

use crate::{PackageifyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the passthrough phase does with subdirectories of the source root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryPolicy {
    /// Leave the directory behind and log a warning
    #[default]
    Skip,
    /// Abort the run
    Error,
    /// Copy the whole tree into the destination root
    Recursive,
}

impl std::fmt::Display for DirectoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DirectoryPolicy::Skip => "skip",
            DirectoryPolicy::Error => "error",
            DirectoryPolicy::Recursive => "recursive",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for DirectoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "skip" => Ok(DirectoryPolicy::Skip),
            "error" => Ok(DirectoryPolicy::Error),
            "recursive" => Ok(DirectoryPolicy::Recursive),
            _ => Err(format!("Unknown directory policy: {}", s)),
        }
    }
}

/// Configuration for a reorganization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorganizerConfig {
    /// Suffix, without the dot, of files subject to placement
    pub managed_extension: String,
    /// Keyword of the namespace declaration line
    pub namespace_keyword: String,
    /// Keyword of reference-injection lines
    pub reference_keyword: String,
    /// Terminator appended to both generated lines
    pub statement_terminator: String,
    /// Mapping-file field separator
    pub delimiter: char,
    /// Emit reference-injection lines
    pub inject_references: bool,
    /// Prepend the namespace header; when off, units are moved verbatim
    pub rewrite_header: bool,
    /// Copy non-managed top-level entries into the destination root
    pub copy_passthrough: bool,
    /// Keep the historical body layout: a blank line, then every line
    /// followed by `\n`
    pub legacy_body_layout: bool,
    /// Passthrough handling of subdirectories
    pub directory_policy: DirectoryPolicy,
}

impl Default for ReorganizerConfig {
    fn default() -> Self {
        Self {
            managed_extension: "java".to_string(),
            namespace_keyword: "package".to_string(),
            reference_keyword: "import".to_string(),
            statement_terminator: ";".to_string(),
            delimiter: ';',
            inject_references: true,
            rewrite_header: true,
            copy_passthrough: true,
            legacy_body_layout: true,
            directory_policy: DirectoryPolicy::Skip,
        }
    }
}

impl ReorganizerConfig {
    /// Only move files into namespace directories
    pub fn move_only() -> Self {
        Self {
            rewrite_header: false,
            inject_references: false,
            copy_passthrough: false,
            ..Self::default()
        }
    }

    /// Move files and write namespace declarations, nothing more
    pub fn move_and_rewrite() -> Self {
        Self {
            inject_references: false,
            copy_passthrough: false,
            ..Self::default()
        }
    }

    /// Load from a TOML, JSON or YAML file; missing fields take defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = packageify_utils::load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce sensible output
    pub fn validate(&self) -> Result<()> {
        if self.managed_extension.is_empty() {
            return Err(PackageifyError::Config("managed_extension must not be empty".to_string()));
        }
        if self.managed_extension.starts_with('.') {
            return Err(PackageifyError::Config(format!(
                "managed_extension must not start with '.': {}",
                self.managed_extension
            )));
        }
        if self.namespace_keyword.trim().is_empty() {
            return Err(PackageifyError::Config("namespace_keyword must not be empty".to_string()));
        }
        if self.reference_keyword.trim().is_empty() {
            return Err(PackageifyError::Config("reference_keyword must not be empty".to_string()));
        }
        if self.delimiter == '.' || self.delimiter.is_whitespace() {
            return Err(PackageifyError::Config(format!(
                "delimiter {:?} would clash with namespace paths",
                self.delimiter
            )));
        }
        Ok(())
    }
}
