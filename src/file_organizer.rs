/// Sort pipeline: moves directory entries into nested classification folders.
///
/// Each entry of the source directory runs through the steps of a
/// [`SortPlan`]. Every step contributes one path segment (a date bucket, an
/// extension or a content type). Missing segment directories are created and
/// marked with the sentinel file, then the entry is moved into the innermost one.
use crate::config::CompiledFilters;
use crate::file_category::{FileMapper, classify_by_extension};
use crate::period::{period_label, period_label_local};
use crate::plan::{Period, PlanError, SortPlan, SortStep};
use crate::sentinel;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during sorting.
#[derive(Debug)]
pub enum OrganizeError {
    /// The sort plan or period is invalid.
    InvalidPlan(PlanError),
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath { path: PathBuf, source: io::Error },
    /// The base directory could not be listed.
    ReadDirFailed { path: PathBuf, source: io::Error },
    /// The entry's creation time cannot be read on this platform or filesystem.
    TimestampUnavailable { path: PathBuf, source: io::Error },
    /// Something with the same name already exists at the destination.
    DestinationConflict {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Failed to create a destination directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to write the marker file into a new directory.
    MarkerCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move an entry into its destination directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// Failed to write the JSON run report.
    ReportWriteFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPlan(e) => write!(f, "Invalid sort settings: {}", e),
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::TimestampUnavailable { path, source } => {
                write!(
                    f,
                    "Creation time unavailable for {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DestinationConflict {
                source,
                destination,
            } => {
                write!(
                    f,
                    "Cannot move {}: {} already exists",
                    source.display(),
                    destination.display()
                )
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::MarkerCreationFailed { path, source } => {
                write!(f, "Failed to mark directory {}: {}", path.display(), source)
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::ReportWriteFailed { path, source } => {
                write!(f, "Failed to write report {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

impl From<PlanError> for OrganizeError {
    fn from(e: PlanError) -> Self {
        Self::InvalidPlan(e)
    }
}

/// Result type for sort operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// An entry of the source directory, captured when the listing is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// The name exactly as stored on disk. Moves keep it unchanged.
    pub file_name: OsString,
    /// Lossy UTF-8 form of `file_name`, used for filtering and classification.
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// A single move performed (or planned, on a dry run).
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    /// The original path of the entry.
    pub original_path: PathBuf,
    /// The path of the entry after the move.
    pub new_path: PathBuf,
    /// The folder names between the root and the entry, outermost first.
    pub segments: Vec<String>,
}

impl Operation {
    /// The destination folder relative to the sorted root, e.g. `Images/jpg`.
    pub fn destination_label(&self) -> String {
        self.segments.join("/")
    }
}

/// An entry that could not be sorted when running with continue-on-error.
#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-entry result log of a sort run.
#[derive(Debug, Clone, Serialize)]
pub struct SortReport {
    /// RFC 3339 time the run started.
    pub timestamp: String,
    pub base_path: PathBuf,
    pub dry_run: bool,
    pub moved: Vec<Operation>,
    pub failed: Vec<FailedEntry>,
    /// Directories created (or that would be created) by this run.
    pub created_dirs: Vec<PathBuf>,
}

impl SortReport {
    fn new(base_path: PathBuf, dry_run: bool) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            base_path,
            dry_run,
            moved: Vec::new(),
            failed: Vec::new(),
            created_dirs: Vec::new(),
        }
    }

    /// Returns true if no entry failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of entries moved into each destination folder.
    pub fn destination_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for op in &self.moved {
            *counts.entry(op.destination_label()).or_insert(0) += 1;
        }
        counts
    }

    /// Writes the report as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::ReportWriteFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            }
        })?;

        fs::write(path, json).map_err(|e| OrganizeError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// What happened to one entry, passed to the observer of [`FolderSorter::sort_entries`].
#[derive(Debug)]
pub enum EntryOutcome<'a> {
    Moved(&'a Operation),
    Failed {
        entry: &'a SourceEntry,
        error: &'a OrganizeError,
    },
}

/// Reads the creation ("birth") time of `path` as Unix seconds.
///
/// Modification time is never substituted: filesystems without a birth time
/// produce [`OrganizeError::TimestampUnavailable`].
pub fn creation_timestamp(path: &Path) -> OrganizeResult<i64> {
    let created = fs::metadata(path)
        .and_then(|m| m.created())
        .map_err(|e| OrganizeError::TimestampUnavailable {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(DateTime::<Utc>::from(created).timestamp())
}

/// Sorts the entries of one directory.
///
/// # Examples
///
/// ```no_run
/// use dirsort::file_organizer::FolderSorter;
///
/// let report = FolderSorter::new("/home/user/Downloads")
///     .sort_by_extension()
///     .expect("sort failed");
/// println!("moved {} entries", report.moved.len());
/// ```
#[derive(Debug, Clone)]
pub struct FolderSorter {
    root: PathBuf,
    mapper: FileMapper,
    filters: CompiledFilters,
    utc_offset: Option<FixedOffset>,
    continue_on_error: bool,
    dry_run: bool,
    detect_by_content: bool,
}

impl FolderSorter {
    /// Creates a sorter for `root` with default settings: local time zone,
    /// abort on first error, no filters beyond skipping hidden entries.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mapper: FileMapper::default(),
            filters: CompiledFilters::default(),
            utc_offset: None,
            continue_on_error: false,
            dry_run: false,
            detect_by_content: false,
        }
    }

    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_mapper(mut self, mapper: FileMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Compute date buckets in a fixed offset instead of the local time zone.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn detect_by_content(mut self, enabled: bool) -> Self {
        self.detect_by_content = enabled;
        self
    }

    /// Sorts every entry into a creation-date bucket folder.
    pub fn sort_by_date(&self, period: Period) -> OrganizeResult<SortReport> {
        self.sort(&SortPlan::single(SortStep::Date, period))
    }

    /// Sorts every entry into a content-type folder.
    pub fn sort_by_type(&self) -> OrganizeResult<SortReport> {
        self.sort(&SortPlan::single(SortStep::Type, Period::default()))
    }

    /// Sorts every entry into a folder named after its extension.
    pub fn sort_by_extension(&self) -> OrganizeResult<SortReport> {
        self.sort(&SortPlan::single(SortStep::Extension, Period::default()))
    }

    /// Lists the root once and runs `plan` over the listing.
    pub fn sort(&self, plan: &SortPlan) -> OrganizeResult<SortReport> {
        let entries = self.collect_entries()?;
        self.sort_entries(&entries, plan, |_| {})
    }

    /// Lists the entries of the root that are candidates for sorting.
    ///
    /// Hidden entries, entries rejected by the filters and directories created
    /// by an earlier run are left out. Entries come back ordered by name.
    pub fn collect_entries(&self) -> OrganizeResult<Vec<SourceEntry>> {
        if !self.root.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: self.root.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "not an existing directory"),
            });
        }

        let listing = fs::read_dir(&self.root).map_err(|e| OrganizeError::ReadDirFailed {
            path: self.root.clone(),
            source: e,
        })?;

        let mut entries = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|e| OrganizeError::ReadDirFailed {
                path: self.root.clone(),
                source: e,
            })?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().to_string();
            if !self.filters.should_include(&name) {
                continue;
            }
            let path = entry.path();
            let is_dir = path.is_dir();
            if is_dir && sentinel::is_system_managed(&path) {
                continue;
            }
            entries.push(SourceEntry {
                file_name,
                name,
                path,
                is_dir,
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    /// Runs `plan` over an already collected listing.
    ///
    /// `observer` is called once per entry. Without continue-on-error the first
    /// failure is returned immediately and later entries are not touched.
    pub fn sort_entries<F>(
        &self,
        entries: &[SourceEntry],
        plan: &SortPlan,
        mut observer: F,
    ) -> OrganizeResult<SortReport>
    where
        F: FnMut(EntryOutcome<'_>),
    {
        let mut report = SortReport::new(self.root.clone(), self.dry_run);

        for entry in entries {
            match self.sort_entry(entry, plan, &mut report) {
                Ok(operation) => {
                    observer(EntryOutcome::Moved(&operation));
                    report.moved.push(operation);
                }
                Err(error) => {
                    if !self.continue_on_error {
                        return Err(error);
                    }
                    observer(EntryOutcome::Failed {
                        entry,
                        error: &error,
                    });
                    report.failed.push(FailedEntry {
                        path: entry.path.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Computes the destination folder names for `entry` without creating or
    /// moving anything.
    ///
    /// Reads the entry's metadata for a date step, and its leading bytes when
    /// content detection is on.
    pub fn destination_segments(
        &self,
        entry: &SourceEntry,
        plan: &SortPlan,
    ) -> OrganizeResult<Vec<String>> {
        let mut created = None;
        plan.steps()
            .iter()
            .map(|step| match step {
                SortStep::Date => {
                    let timestamp = match created {
                        Some(ts) => ts,
                        None => *created.insert(creation_timestamp(&entry.path)?),
                    };
                    self.date_label(timestamp, plan.period())
                        .map_err(|e| OrganizeError::TimestampUnavailable {
                            path: entry.path.clone(),
                            source: io::Error::other(e),
                        })
                }
                SortStep::Extension => Ok(classify_by_extension(&entry.name, entry.is_dir)),
                SortStep::Type => Ok(self
                    .mapper
                    .categorize(&entry.path, self.detect_by_content)
                    .dir_name()
                    .to_string()),
            })
            .collect()
    }

    fn sort_entry(
        &self,
        entry: &SourceEntry,
        plan: &SortPlan,
        report: &mut SortReport,
    ) -> OrganizeResult<Operation> {
        let segments = self.destination_segments(entry, plan)?;

        let mut current = self.root.clone();
        for segment in &segments {
            current.push(segment);
            self.ensure_segment(&current, report)?;
        }

        let destination = current.join(&entry.file_name);
        if destination.starts_with(&entry.path) {
            return Err(OrganizeError::FileMoveFailure {
                source: entry.path.clone(),
                destination,
                source_error: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "cannot move a directory into itself",
                ),
            });
        }
        if destination.exists() {
            return Err(OrganizeError::DestinationConflict {
                source: entry.path.clone(),
                destination,
            });
        }

        if !self.dry_run {
            fs::rename(&entry.path, &destination).map_err(|e| OrganizeError::FileMoveFailure {
                source: entry.path.clone(),
                destination: destination.clone(),
                source_error: e,
            })?;
        }

        Ok(Operation {
            original_path: entry.path.clone(),
            new_path: destination,
            segments,
        })
    }

    /// Makes sure `dir` exists, creating and marking it when it is new.
    fn ensure_segment(&self, dir: &Path, report: &mut SortReport) -> OrganizeResult<()> {
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(OrganizeError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a non-directory entry has the same name",
                ),
            });
        }

        if self.dry_run {
            if !report.created_dirs.iter().any(|d| d == dir) {
                report.created_dirs.push(dir.to_path_buf());
            }
            return Ok(());
        }

        fs::create_dir(dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        sentinel::mark(dir).map_err(|e| OrganizeError::MarkerCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        report.created_dirs.push(dir.to_path_buf());
        Ok(())
    }

    fn date_label(&self, timestamp: i64, period: Period) -> Result<String, PlanError> {
        match &self.utc_offset {
            Some(offset) => period_label(timestamp, &period, offset),
            None => period_label_local(timestamp, &period),
        }
    }
}
