//! dirsort - sort the entries of a directory into subfolders
//!
//! Entries can be grouped by content type, by extension or by creation date
//! bucketed into days, weeks or months, and the three can be chained to build
//! nested folders such as `Images/jpg` or `Text/March 2024`. Folders created by
//! dirsort carry a marker file so later runs leave them alone.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod period;
pub mod plan;
pub mod sentinel;

pub use config::{CompiledFilters, ConfigError, SortConfig};
pub use file_category::{Category, FileMapper, classify_by_extension, classify_by_type};
pub use file_organizer::{FolderSorter, OrganizeError, OrganizeResult, SortReport};
pub use period::{period_label, period_label_local};
pub use plan::{Period, PeriodKind, PlanError, SortPlan, SortStep};
pub use sentinel::{MARKER_FILE_NAME, is_system_managed, mark};

pub use cli::{RunOptions, SortCommand, run_cli, run_cli_with_config};
