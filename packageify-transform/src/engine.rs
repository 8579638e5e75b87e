//! Reorganization Engine
//!
//! Orchestrates one run: input validation, mapping-file parsing, unit
//! placement with header rewriting, and the passthrough copy of
//! everything that is not a managed file.
//!
//! Every failure aborts the run. Files written before the failing step
//! stay on disk.

use crate::{
    config::{DirectoryPolicy, ReorganizerConfig},
    definitions::DefinitionTable,
    references::detect_references,
    types::{PassthroughAction, Placement, Record, ReorganizationPlan, RunSummary},
    PackageifyError, Result,
};
use chrono::Utc;
use packageify_utils::logging::{get_logger, Logger};
use packageify_utils::{copy_dir_recursive, copy_file_overwrite, has_extension, list_entries, read_text_file};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The three paths a run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub source_dir: PathBuf,
    pub mapping_file: PathBuf,
    pub dest_dir: PathBuf,
}

impl RunPaths {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        mapping_file: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            mapping_file: mapping_file.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Build from positional arguments: source dir, mapping file, dest dir
    ///
    /// Arguments past the third are ignored.
    pub fn from_args<I, P>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut args: Vec<PathBuf> = args.into_iter().map(Into::into).collect();
        if args.len() < 3 {
            return Err(PackageifyError::InvalidInput(format!(
                "Expected at least 3 arguments and received {}",
                args.len()
            )));
        }
        args.truncate(3);
        let dest_dir = args.pop().unwrap_or_default();
        let mapping_file = args.pop().unwrap_or_default();
        let source_dir = args.pop().unwrap_or_default();
        Ok(Self::new(source_dir, mapping_file, dest_dir))
    }
}

/// A unit read from the source directory, ready to be written
struct PreparedUnit<'a> {
    record: &'a Record,
    source: PathBuf,
    body: String,
    references: Vec<&'a Record>,
}

/// Runs the placement pipeline for one set of paths
#[derive(Debug)]
pub struct Reorganizer {
    paths: RunPaths,
    config: ReorganizerConfig,
    logger: Logger,
}

impl Reorganizer {
    /// Create a reorganizer; the configuration is validated here
    pub fn new(paths: RunPaths, config: ReorganizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            paths,
            config,
            logger: get_logger("packageify.engine"),
        })
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    pub fn config(&self) -> &ReorganizerConfig {
        &self.config
    }

    /// Execute the whole pipeline
    pub fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        let entries = self.validate_inputs()?;
        fs::create_dir_all(&self.paths.dest_dir)
            .map_err(PackageifyError::io_at(&self.paths.dest_dir))?;

        let table = self.load_definitions()?;
        let duplicate_units = self.report_duplicates(&table);

        self.logger.info(&format!(
            "Placing {} units from {} into {}",
            table.len(),
            self.paths.source_dir.display(),
            self.paths.dest_dir.display()
        ));

        let mut placements = Vec::with_capacity(table.len());
        for record in &table {
            placements.push(self.place_record(&table, record)?);
        }

        let unmapped_units = self.unmapped_units(&entries, &table);

        let mut passthrough = Vec::new();
        if self.config.copy_passthrough {
            for entry in list_entries(&self.paths.source_dir)
                .map_err(PackageifyError::util_at(&self.paths.source_dir))?
            {
                if has_extension(&entry, &self.config.managed_extension) {
                    continue;
                }
                let action = self.passthrough_action(&entry)?;
                self.execute_passthrough(&action)?;
                passthrough.push(action);
            }
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            placements,
            passthrough,
            unmapped_units,
            duplicate_units,
        };

        self.logger.info(&format!(
            "Run {} finished: {} units written, {} passthrough entries copied",
            summary.run_id,
            summary.units_written(),
            summary.entries_copied()
        ));

        Ok(summary)
    }

    /// Compute what `run` would do without writing anything
    ///
    /// Fails under the same conditions as `run`.
    pub fn plan(&self) -> Result<ReorganizationPlan> {
        let entries = self.validate_inputs()?;
        let table = self.load_definitions()?;
        let duplicate_units = self.report_duplicates(&table);

        let mut placements = Vec::with_capacity(table.len());
        for record in &table {
            let unit = self.prepare_unit(&table, record)?;
            placements.push(self.placement(&unit)?);
        }

        let mut passthrough = Vec::new();
        if self.config.copy_passthrough {
            for entry in entries
                .iter()
                .filter(|entry| !has_extension(entry, &self.config.managed_extension))
            {
                passthrough.push(self.passthrough_action(entry)?);
            }
        }

        Ok(ReorganizationPlan {
            placements,
            passthrough,
            unmapped_units: self.unmapped_units(&entries, &table),
            duplicate_units,
        })
    }

    /// Check the inputs in order and return the source directory's entries
    ///
    /// Nothing is written here.
    pub fn validate_inputs(&self) -> Result<Vec<PathBuf>> {
        let source_dir = &self.paths.source_dir;

        if !source_dir.is_dir() {
            return Err(PackageifyError::InvalidInput(format!(
                "source folder missing or not a directory: {}",
                source_dir.display()
            )));
        }

        let entries = list_entries(source_dir).map_err(PackageifyError::util_at(source_dir))?;
        if entries.is_empty() {
            return Err(PackageifyError::InvalidInput(format!(
                "source folder empty: {}",
                source_dir.display()
            )));
        }

        if !entries
            .iter()
            .any(|entry| has_extension(entry, &self.config.managed_extension))
        {
            return Err(PackageifyError::InvalidInput(format!(
                "no .{} files found in {}",
                self.config.managed_extension,
                source_dir.display()
            )));
        }

        if !self.paths.mapping_file.exists() {
            return Err(PackageifyError::InvalidInput(format!(
                "mapping file missing: {}",
                self.paths.mapping_file.display()
            )));
        }

        Ok(entries)
    }

    /// Parse the mapping file with the configured delimiter
    pub fn load_definitions(&self) -> Result<DefinitionTable> {
        DefinitionTable::from_file(&self.paths.mapping_file, self.config.delimiter)
    }

    /// Text written for a unit: header followed by the body
    pub fn render_unit(&self, record: &Record, body: &str, references: &[&Record]) -> String {
        let mut output = record.namespace_declaration(&self.config);
        output.push_str("\n\n");

        for reference in references {
            output.push_str(&reference.reference_line(&self.config));
            output.push('\n');
        }

        if self.config.legacy_body_layout {
            output.push('\n');
            for line in body.lines() {
                output.push_str(line);
                output.push('\n');
            }
        } else {
            if !references.is_empty() {
                output.push('\n');
            }
            let trimmed = body.trim_end_matches(['\n', '\r']);
            if !trimmed.is_empty() {
                output.push_str(trimmed);
                output.push('\n');
            }
        }

        output
    }

    fn place_record(&self, table: &DefinitionTable, record: &Record) -> Result<Placement> {
        let target_dir = self.paths.dest_dir.join(record.directory_path()?);
        fs::create_dir_all(&target_dir).map_err(PackageifyError::io_at(&target_dir))?;

        let unit = self.prepare_unit(table, record)?;
        let placement = self.placement(&unit)?;

        if self.config.rewrite_header {
            let contents = self.render_unit(record, &unit.body, &unit.references);
            fs::write(&placement.target, contents)
                .map_err(PackageifyError::io_at(&placement.target))?;
        } else {
            copy_file_overwrite(&unit.source, &placement.target)
                .map_err(PackageifyError::util_at(&placement.target))?;
        }

        self.logger.info(&format!(
            "{} -> {}",
            unit.source.display(),
            placement.target.display()
        ));
        Ok(placement)
    }

    fn prepare_unit<'a>(&self, table: &'a DefinitionTable, record: &'a Record) -> Result<PreparedUnit<'a>> {
        let source = self.paths.source_dir.join(record.file_name(&self.config)?);
        if !source.exists() {
            return Err(PackageifyError::MissingUnit {
                unit: record.unit_name.clone(),
                expected: source,
            });
        }

        // move-only runs copy bytes and never look at the text
        let body = if self.config.rewrite_header {
            read_text_file(&source).map_err(PackageifyError::util_at(&source))?
        } else {
            String::new()
        };

        let references = if self.config.rewrite_header && self.config.inject_references {
            detect_references(&body, table, record)
        } else {
            Vec::new()
        };

        for reference in &references {
            tracing::debug!(
                unit = %record.unit_name,
                reference = %reference.qualified_name(),
                "detected reference"
            );
        }

        Ok(PreparedUnit {
            record,
            source,
            body,
            references,
        })
    }

    fn placement(&self, unit: &PreparedUnit<'_>) -> Result<Placement> {
        let target = self
            .paths
            .dest_dir
            .join(unit.record.directory_path()?)
            .join(unit.record.file_name(&self.config)?);

        Ok(Placement {
            unit_name: unit.record.unit_name.clone(),
            namespace_path: unit.record.namespace_path.clone(),
            source: unit.source.clone(),
            target,
            references: unit.references.iter().map(|r| r.qualified_name()).collect(),
        })
    }

    fn passthrough_action(&self, entry: &Path) -> Result<PassthroughAction> {
        let source = entry.to_path_buf();
        let Some(name) = entry.file_name() else {
            return Ok(PassthroughAction::Skip {
                source,
                reason: "entry has no file name".to_string(),
            });
        };
        let target = self.paths.dest_dir.join(name);

        if self.contains_destination(entry) {
            return Ok(PassthroughAction::Skip {
                source,
                reason: "entry contains the destination directory".to_string(),
            });
        }

        if entry.is_file() {
            return Ok(PassthroughAction::Copy { source, target });
        }

        if entry.is_dir() {
            return match self.config.directory_policy {
                DirectoryPolicy::Skip => {
                    self.logger.warning(&format!(
                        "Skipping subdirectory {} during passthrough",
                        entry.display()
                    ));
                    Ok(PassthroughAction::Skip {
                        source,
                        reason: "subdirectory".to_string(),
                    })
                }
                DirectoryPolicy::Error => Err(PackageifyError::IoAt {
                    path: source,
                    source: std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "passthrough entry is a directory",
                    ),
                }),
                DirectoryPolicy::Recursive => Ok(PassthroughAction::CopyTree { source, target }),
            };
        }

        self.logger.warning(&format!(
            "Skipping special entry {} during passthrough",
            entry.display()
        ));
        Ok(PassthroughAction::Skip {
            source,
            reason: "not a regular file".to_string(),
        })
    }

    fn execute_passthrough(&self, action: &PassthroughAction) -> Result<()> {
        match action {
            PassthroughAction::Copy { source, target } => {
                let bytes = copy_file_overwrite(source, target)
                    .map_err(PackageifyError::util_at(target))?;
                self.logger.info(&format!(
                    "Copied {} ({} bytes) -> {}",
                    source.display(),
                    bytes,
                    target.display()
                ));
            }
            PassthroughAction::CopyTree { source, target } => {
                let files = copy_dir_recursive(source, target)
                    .map_err(PackageifyError::util_at(target))?;
                self.logger.info(&format!(
                    "Copied tree {} ({} files) -> {}",
                    source.display(),
                    files,
                    target.display()
                ));
            }
            PassthroughAction::Skip { .. } => {}
        }
        Ok(())
    }

    /// Whether `entry` is the destination directory or one of its ancestors
    fn contains_destination(&self, entry: &Path) -> bool {
        match (entry.canonicalize(), resolve_path(&self.paths.dest_dir)) {
            (Ok(entry), Some(dest)) => dest.starts_with(entry),
            _ => false,
        }
    }

    fn report_duplicates(&self, table: &DefinitionTable) -> Vec<String> {
        let duplicates: Vec<String> = table.duplicate_units().into_iter().map(String::from).collect();
        for unit in &duplicates {
            self.logger.warning(&format!(
                "Unit {} is listed more than once; the last record's output wins",
                unit
            ));
        }
        duplicates
    }

    fn unmapped_units(&self, entries: &[PathBuf], table: &DefinitionTable) -> Vec<String> {
        let suffix = format!(".{}", self.config.managed_extension);
        let unmapped: Vec<String> = entries
            .iter()
            .filter(|entry| entry.is_file() && has_extension(entry, &self.config.managed_extension))
            .filter_map(|entry| entry.file_name())
            .filter_map(|name| name.to_string_lossy().strip_suffix(&suffix).map(String::from))
            .filter(|unit| !table.contains_unit(unit))
            .collect();

        for unit in &unmapped {
            self.logger.warning(&format!(
                "{}{} has no record in {} and is left out of the destination",
                unit,
                suffix,
                self.paths.mapping_file.display()
            ));
        }
        unmapped
    }
}

/// Canonical form of a path that may not exist yet
///
/// The nearest existing ancestor is canonicalized and the missing
/// components are appended back onto it.
fn resolve_path(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(mut resolved) = existing.canonicalize() {
            resolved.extend(missing.iter().rev());
            return Some(resolved);
        }
        missing.push(existing.file_name()?);
        existing = match existing.parent()? {
            parent if parent.as_os_str().is_empty() => Path::new("."),
            parent => parent,
        };
    }
}
