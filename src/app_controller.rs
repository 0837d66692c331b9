use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SaveOptions, SubtitleCollection, TimeShift};
use crate::timing::fix_overlapping_subtitles;
use crate::validation::{ValidationError, ValidationService};

// @module: Application controller for subtitle processing

// @struct: Validation result for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileCheck {
    pub path: PathBuf,
    // @field: Set when the file could not be read or parsed at all
    pub parse_error: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl FileCheck {
    pub fn is_valid(&self) -> bool {
        self.parse_error.is_none() && self.errors.is_empty()
    }
}

// @struct: Result of a `check` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub files: Vec<FileCheck>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|file| !file.is_valid())
    }

    pub fn error_count(&self) -> usize {
        self.files
            .iter()
            .map(|file| file.errors.len() + usize::from(file.parse_error.is_some()))
            .sum()
    }
}

// @struct: Result of a run that writes files
#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
    pub outputs: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl ProcessSummary {
    /// Whether any input in a folder run was skipped after an error
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Main application controller for subtitle files
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn open(&self, path: &Path) -> Result<SubtitleCollection> {
        let options = self.config.parse_options()?;
        SubtitleCollection::open(path, &options)
            .with_context(|| format!("Failed to parse subtitle file: {:?}", path))
    }

    fn write(&self, collection: &SubtitleCollection, path: &Path, options: &SaveOptions) -> Result<()> {
        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent)?;
        }
        collection
            .save_with(path, options)
            .with_context(|| format!("Failed to write subtitle file: {:?}", path))
    }

    // Runs `action` over every input; folder runs log per-file failures and
    // carry on, a single-file run propagates the failure.
    fn for_each_input<F>(&self, input: &Path, verb: &str, mut action: F) -> Result<ProcessSummary>
    where
        F: FnMut(&Path) -> Result<PathBuf>,
    {
        let inputs = FileManager::collect_inputs(input)?;
        if inputs.is_empty() {
            warn!("No subtitle files found in {:?}", input);
        }

        let single = input.is_file();
        let mut summary = ProcessSummary::default();
        for file in &inputs {
            match action(file) {
                Ok(output) => {
                    info!("{} {:?} -> {:?}", verb, file, output);
                    summary.outputs.push(output);
                }
                Err(e) if single => return Err(e),
                Err(e) => {
                    error!("Error processing file {:?}: {:#}", file, e);
                    summary.failed.push(file.clone());
                }
            }
        }

        debug!(
            "{}: {} written, {} failed",
            verb,
            summary.outputs.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Parse and validate a file or every subtitle file under a directory
    pub fn run_check(&self, input: &Path) -> Result<CheckReport> {
        let service = ValidationService::with_options(self.config.validation.clone());
        let mut report = CheckReport::default();

        for file in FileManager::collect_inputs(input)? {
            let check = match self.open(&file) {
                Ok(collection) => FileCheck {
                    errors: service.validate(&collection),
                    parse_error: None,
                    path: file,
                },
                Err(e) => FileCheck {
                    path: file,
                    parse_error: Some(format!("{:#}", e)),
                    errors: Vec::new(),
                },
            };

            if check.is_valid() {
                debug!("{:?} is valid", check.path);
            } else {
                warn!("{:?} has problems", check.path);
            }
            report.files.push(check);
        }

        Ok(report)
    }

    /// Repair overlaps and renumber entries
    pub fn run_fix(&self, input: &Path, output: Option<&Path>) -> Result<ProcessSummary> {
        let save_options = self.config.save_options()?;
        self.for_each_input(input, "Fixed", |file| {
            let mut collection = self.open(file)?;
            let adjustments = fix_overlapping_subtitles(&mut collection, &self.config.overlap);
            for adjustment in adjustments.iter().filter(|a| a.lengthened()) {
                warn!(
                    "Entry #{} in {:?} was lengthened to its minimum duration and may still overlap",
                    adjustment.position + 1,
                    file
                );
            }
            collection.clean_indexes();

            let target = FileManager::resolve_output(file, input, output, "fixed");
            self.write(&collection, &target, &save_options)?;
            Ok(target)
        })
    }

    /// Move or rescale every timing
    pub fn run_shift(&self, input: &Path, shift: &TimeShift, output: Option<&Path>) -> Result<ProcessSummary> {
        let save_options = self.config.save_options()?;
        self.for_each_input(input, "Shifted", |file| {
            let mut collection = self.open(file)?;
            collection.shift(shift);

            let target = FileManager::resolve_output(file, input, output, "shifted");
            self.write(&collection, &target, &save_options)?;
            Ok(target)
        })
    }

    /// Re-encode files with a different encoding, newline or BOM
    pub fn run_convert(&self, input: &Path, save_options: &SaveOptions, output: Option<&Path>) -> Result<ProcessSummary> {
        self.for_each_input(input, "Converted", |file| {
            let collection = self.open(file)?;
            let target = FileManager::resolve_output(file, input, output, "converted");
            self.write(&collection, &target, save_options)?;
            Ok(target)
        })
    }
}
