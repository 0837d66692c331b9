use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extension of subtitle files picked up from directories
pub const SUBTITLE_EXTENSION: &str = "srt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Sibling output path `<stem>.<suffix>.srt`
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(suffix);
        output_filename.push('.');
        output_filename.push_str(SUBTITLE_EXTENSION);

        input_file.with_file_name(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand a command-line path into the subtitle files to process
    pub fn collect_inputs<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            Ok(vec![path.to_path_buf()])
        } else if Self::dir_exists(path) {
            Self::find_files(path, SUBTITLE_EXTENSION)
        } else {
            Err(anyhow!("Input path does not exist: {:?}", path))
        }
    }

    /// Resolve where a processed file goes.
    ///
    /// With no explicit output the file lands next to its input as
    /// `<stem>.<suffix>.srt`. For a single input an explicit output is the
    /// target file; for a directory run it is a directory that mirrors the
    /// input tree.
    pub fn resolve_output(
        input_file: &Path,
        input_root: &Path,
        output: Option<&Path>,
        suffix: &str,
    ) -> PathBuf {
        match output {
            None => Self::generate_output_path(input_file, suffix),
            Some(output) if input_root.is_file() => output.to_path_buf(),
            Some(output) => {
                let relative = input_file.strip_prefix(input_root).unwrap_or(input_file);
                output.join(relative)
            }
        }
    }
}
