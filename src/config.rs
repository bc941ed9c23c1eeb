//! Configuration system for the roster manager
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (ROSTER_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::roster::{Direction, Filter, ImageLayout, SortKey, SortSpec, DEFAULT_MAX_SEARCH_LEN};
use crate::source::Location;

/// Main roster configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Where the student and family documents come from
    pub source: SourceSettings,

    /// Initial listing configuration
    pub view: ViewSettings,

    /// Portrait and crest images
    pub images: ImageSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Document locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Student list: http(s) URL, file:// URL or path
    pub students_url: String,

    /// Family lists: http(s) URL, file:// URL or path
    pub families_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Listing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Filter criterion applied at startup
    pub filter: String,

    /// Sort key applied at startup
    pub sort: String,

    /// Sort direction: asc or desc
    pub direction: String,

    /// Quiet period before a shell search runs, in milliseconds
    pub search_debounce_ms: u64,

    /// Longest accepted search term
    pub max_search_len: usize,
}

/// Image paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Directory holding portraits and crests
    pub dir: String,

    /// File shown when a portrait is missing, relative to `dir`
    pub placeholder: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            students_url: "https://petlatkea.dk/2021/hogwarts/students.json".to_string(),
            families_url: "https://petlatkea.dk/2021/hogwarts/families.json".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            filter: "all".to_string(),
            sort: "last-name".to_string(),
            direction: "asc".to_string(),
            search_debounce_ms: 300,
            max_search_len: DEFAULT_MAX_SEARCH_LEN,
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            dir: "images".to_string(),
            placeholder: "default_placeholder.png".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_file_size_mb: 10,
            max_files: 3,
            json_format: false,
        }
    }
}

impl RosterConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            Some(PathBuf::from("hogwarts-roster.toml")),
            // User config directory
            dirs::config_dir().map(|p| p.join("hogwarts").join("roster.toml")),
            // Home directory
            dirs::home_dir().map(|p| p.join(".hogwarts").join("roster.toml")),
            // System config (Linux)
            Some(PathBuf::from("/etc/hogwarts/roster.toml")),
        ];

        for path in search_paths.iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Source settings
        if let Ok(val) = std::env::var("ROSTER_STUDENTS_URL") {
            self.source.students_url = val;
        }
        if let Ok(val) = std::env::var("ROSTER_FAMILIES_URL") {
            self.source.families_url = val;
        }
        if let Ok(val) = std::env::var("ROSTER_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.source.timeout_secs = n;
            }
        }

        // View settings
        if let Ok(val) = std::env::var("ROSTER_FILTER") {
            self.view.filter = val;
        }
        if let Ok(val) = std::env::var("ROSTER_SORT") {
            self.view.sort = val;
        }
        if let Ok(val) = std::env::var("ROSTER_DIRECTION") {
            self.view.direction = val;
        }
        if let Ok(val) = std::env::var("ROSTER_SEARCH_DEBOUNCE_MS") {
            if let Ok(n) = val.parse() {
                self.view.search_debounce_ms = n;
            }
        }
        if let Ok(val) = std::env::var("ROSTER_MAX_SEARCH_LEN") {
            if let Ok(n) = val.parse() {
                self.view.max_search_len = n;
            }
        }

        // Image settings
        if let Ok(val) = std::env::var("ROSTER_IMAGE_DIR") {
            self.images.dir = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("ROSTER_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("ROSTER_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("ROSTER_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.images.dir = expand_path(&self.images.dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Source locations must be fetchable
        for (field, value) in [
            ("source.students_url", &self.source.students_url),
            ("source.families_url", &self.source.families_url),
        ] {
            Location::parse(value)
                .map_err(|e| Error::config_field_invalid(field, e.to_string()))?;
        }

        if self.source.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "source.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        // View settings must name a known key and direction
        self.view
            .sort
            .parse::<SortKey>()
            .map_err(|e| Error::config_field_invalid("view.sort", e.to_string()))?;
        self.view
            .direction
            .parse::<Direction>()
            .map_err(|e| Error::config_field_invalid("view.direction", e.to_string()))?;

        if self.view.max_search_len == 0 {
            return Err(Error::config_field_invalid(
                "view.max_search_len",
                "max_search_len must be at least 1",
            ));
        }
        if self.view.search_debounce_ms > 10_000 {
            return Err(Error::config_field_invalid(
                "view.search_debounce_ms",
                "search_debounce_ms must be at most 10000",
            ));
        }

        if self.images.placeholder.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "images.placeholder",
                "placeholder cannot be empty",
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Initial filter criterion
    pub fn filter(&self) -> Filter {
        Filter::parse(&self.view.filter)
    }

    /// Initial sort key and direction. Falls back to the default on values
    /// that slipped past validation.
    pub fn sort_spec(&self) -> SortSpec {
        let defaults = SortSpec::default();
        SortSpec::new(
            self.view.sort.parse().unwrap_or(defaults.key),
            self.view.direction.parse().unwrap_or(defaults.direction),
        )
    }

    pub fn image_layout(&self) -> ImageLayout {
        ImageLayout::new(self.images.dir.clone())
    }

    /// Full path of the placeholder portrait
    pub fn placeholder_path(&self) -> String {
        self.image_layout().resolve(&self.images.placeholder)
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".hogwarts")
                .join("roster.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Hogwarts Roster Configuration

[source]
# Student list: http(s) URL, file:// URL or local path
students_url = "https://petlatkea.dk/2021/hogwarts/students.json"

# Family lists used to derive blood status
families_url = "https://petlatkea.dk/2021/hogwarts/families.json"

# Request timeout in seconds
timeout_secs = 30

[view]
# Initial filter: all, expelled, prefects, inquisitorialsquad, a house or a blood status
filter = "all"

# Initial sort key: first-name, middle-name, last-name, nick-name, house, blood-status, gender
sort = "last-name"

# Sort direction: asc or desc
direction = "asc"

# Quiet period before a shell search runs (milliseconds)
search_debounce_ms = 300

# Longest accepted search term
max_search_len = 50

[images]
# Directory holding portraits and house crests
dir = "images"

# Shown when a portrait file is missing
placeholder = "default_placeholder.png"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.hogwarts/logs/roster.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 10

# Number of rotated log files to keep
max_files = 3

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
