//! Sort defaults and entry filtering configuration.
//!
//! Settings are loaded from a TOML file. The `[sort]` table holds the default
//! plan used when the command line does not override it, and the `[filters]`
//! table excludes entries from sorting:
//! - Exact filename matching
//! - Glob pattern matching
//! - File extension matching
//! - Regex pattern matching
//! - Include (whitelist) rules that override exclude rules
//!
//! Hidden entries (names starting with `.`) are never sorted, whatever the
//! filters say.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sort]
//! steps = ["type", "date"]
//! period = "month"
//! amount = 1
//! continue_on_error = false
//! detect_by_content = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.part", "~*"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::plan::{Period, PeriodKind, PlanError, SortPlan, SortStep};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_NAME: &str = ".dirsortrc.toml";

/// Errors that can occur during configuration loading and filtering.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// The `[sort]` table describes an impossible plan.
    InvalidSortSettings(PlanError),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidSortSettings(e) => write!(f, "Invalid [sort] settings: {}", e),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub sort: SortSettings,

    #[serde(default)]
    pub filters: FilterRules,
}

/// Default sort behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSettings {
    /// Steps applied in order by a chained sort.
    #[serde(default = "default_steps")]
    pub steps: Vec<SortStep>,

    /// Unit of date buckets.
    #[serde(default = "default_period")]
    pub period: PeriodKind,

    /// Number of units per date bucket.
    #[serde(default = "default_amount")]
    pub amount: u32,

    /// Record per-entry failures and keep going instead of aborting.
    #[serde(default)]
    pub continue_on_error: bool,

    /// Sniff file contents when the name does not reveal a type.
    #[serde(default)]
    pub detect_by_content: bool,
}

fn default_steps() -> Vec<SortStep> {
    vec![SortStep::Type]
}

fn default_period() -> PeriodKind {
    PeriodKind::Month
}

fn default_amount() -> u32 {
    1
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            period: default_period(),
            amount: default_amount(),
            continue_on_error: false,
            detect_by_content: false,
        }
    }
}

impl SortSettings {
    /// The configured date period.
    pub fn period(&self) -> Result<Period, PlanError> {
        Period::new(self.period, self.amount)
    }

    /// The configured chained plan.
    pub fn plan(&self) -> Result<SortPlan, PlanError> {
        SortPlan::new(self.steps.clone(), self.period()?)
    }
}

/// Entry filter rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Rules for excluding entries.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding entries from sorting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact names to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the entry name (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "tmp"), case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries, overriding exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl SortConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::InvalidSortSettings` if the `[sort]` table is unusable.
    /// Returns `ConfigError::IoError` if file cannot be read.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config
            .sort
            .plan()
            .map_err(ConfigError::InvalidSortSettings)?;
        Ok(config)
    }

    /// Compile the filter rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if an entry name should be sorted.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Hidden entry - always skipped
    /// 2. Include patterns (whitelist) - if matched, include
    /// 3. Exact filename match - if matched, exclude
    /// 4. Extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, name: &str) -> bool {
        if name.starts_with('.') {
            return false;
        }

        if self.include_patterns.iter().any(|p| p.matches(name)) {
            return true;
        }

        if self.exclude_filenames.contains(name) {
            return false;
        }

        if let Some(ext) = Path::new(name).extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches(name)) {
            return false;
        }

        if self.exclude_regexes.iter().any(|r| r.is_match(name)) {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(exclude: ExcludeRules, include: IncludeRules) -> CompiledFilters {
        CompiledFilters::new(&FilterRules { exclude, include }).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let config = SortConfig::default();
        assert_eq!(config.sort.steps, vec![SortStep::Type]);
        assert_eq!(config.sort.period, PeriodKind::Month);
        assert_eq!(config.sort.amount, 1);
        assert!(!config.sort.continue_on_error);
        assert!(config.sort.plan().is_ok());
    }

    #[test]
    fn test_parse_sort_table() {
        let config = SortConfig::from_toml(
            r#"
            [sort]
            steps = ["t", "date"]
            period = "w"
            amount = 2
            continue_on_error = true
            "#,
        )
        .unwrap();

        let plan = config.sort.plan().unwrap();
        assert_eq!(plan.steps(), &[SortStep::Type, SortStep::Date]);
        assert_eq!(plan.period().kind(), PeriodKind::Week);
        assert_eq!(plan.period().amount(), 2);
        assert!(config.sort.continue_on_error);
    }

    #[test]
    fn test_unknown_period_kind_is_rejected() {
        let result = SortConfig::from_toml("[sort]\nperiod = \"y\"\n");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let result = SortConfig::from_toml("[sort]\nsteps = [\"x\"]\n");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let result = SortConfig::from_toml("[sort]\namount = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSortSettings(PlanError::ZeroAmount))
        ));
    }

    #[test]
    fn test_empty_steps_are_rejected() {
        let result = SortConfig::from_toml("[sort]\nsteps = []\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSortSettings(PlanError::EmptySteps))
        ));
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = SortConfig::load(Some(Path::new("/non/existent/dirsort.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_hidden_entries_always_excluded() {
        let filters = compiled(
            ExcludeRules::default(),
            IncludeRules {
                patterns: vec![".env".to_string(), "*".to_string()],
            },
        );
        assert!(!filters.should_include(".env"));
        assert!(!filters.should_include(".DS_Store"));
        assert!(filters.should_include("visible.txt"));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let filters = compiled(
            ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                ..Default::default()
            },
            IncludeRules::default(),
        );
        assert!(!filters.should_include("Thumbs.db"));
        assert!(filters.should_include("image.jpg"));
    }

    #[test]
    fn test_exclude_extensions() {
        let filters = compiled(
            ExcludeRules {
                extensions: vec!["bak".to_string(), ".tmp".to_string()],
                ..Default::default()
            },
            IncludeRules::default(),
        );
        assert!(!filters.should_include("file.bak"));
        assert!(!filters.should_include("file.tmp"));
        assert!(!filters.should_include("file.BAK"));
        assert!(filters.should_include("file.txt"));
    }

    #[test]
    fn test_exclude_glob_patterns() {
        let filters = compiled(
            ExcludeRules {
                patterns: vec!["*.part".to_string(), "file?.txt".to_string()],
                ..Default::default()
            },
            IncludeRules::default(),
        );
        assert!(!filters.should_include("movie.mkv.part"));
        assert!(!filters.should_include("file1.txt"));
        assert!(filters.should_include("file12.txt"));
        assert!(filters.should_include("movie.mkv"));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let filters = compiled(
            ExcludeRules {
                extensions: vec!["log".to_string()],
                ..Default::default()
            },
            IncludeRules {
                patterns: vec!["important*".to_string()],
            },
        );
        assert!(filters.should_include("important.log"));
        assert!(!filters.should_include("debug.log"));
    }

    #[test]
    fn test_exclude_regex() {
        let filters = compiled(
            ExcludeRules {
                regex: vec![r"^test_.*\.txt$".to_string()],
                ..Default::default()
            },
            IncludeRules::default(),
        );
        assert!(!filters.should_include("test_file.txt"));
        assert!(filters.should_include("file.txt"));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let result = CompiledFilters::new(&FilterRules {
            exclude: ExcludeRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            include: IncludeRules::default(),
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_glob_pattern_returns_error() {
        let result = CompiledFilters::new(&FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            include: IncludeRules::default(),
        });
        assert!(matches!(result, Err(ConfigError::InvalidGlobPattern(_))));
    }
}
