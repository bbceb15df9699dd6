use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use moviescope_cli::Args;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string with comments.
    /// All fields are commented out so defaults are used, but users can uncomment to override.
    pub fn generate_default_config(&self) -> String {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .unwrap_or_else(|e| panic!("Failed to serialize default config: {}", e));

        Self::comment_all_fields(toml_str, Self::collect_all_comments())
    }

    /// Collect all field comments from the per-section constants into a map keyed by dotted path
    fn collect_all_comments() -> HashMap<String, String> {
        let mut comments = HashMap::new();

        for (field, comment) in APP_COMMENTS {
            comments.insert(field.to_string(), comment.to_string());
        }
        for (field, comment) in SERVER_COMMENTS {
            comments.insert(format!("server.{}", field), comment.to_string());
        }
        for (field, comment) in STORE_COMMENTS {
            comments.insert(format!("store.{}", field), comment.to_string());
        }
        for (field, comment) in CHART_COMMENTS {
            comments.insert(format!("chart.{}", field), comment.to_string());
        }
        for (field, comment) in DEBUG_COMMENTS {
            comments.insert(format!("debug.{}", field), comment.to_string());
        }

        comments
    }

    /// Comment out all fields in TOML and add comments.
    /// Also adds unset Option fields as commented-out `# field = null`.
    fn comment_all_fields(toml: String, comments: HashMap<String, String>) -> String {
        let mut result = String::new();
        result.push_str("# moviescope configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();
        let mut seen_fields: HashSet<String> = HashSet::new();

        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                current_section = section.clone();

                if let Some(header) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                    result.push_str(header.1);
                    result.push('\n');
                }

                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                if let Some(comment) = comments.get(&field_path) {
                    for comment_line in comment.lines() {
                        result.push_str("# ");
                        result.push_str(comment_line);
                        result.push('\n');
                    }
                }
                seen_fields.insert(field_path);

                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        Self::add_missing_option_fields(result, &comments, &seen_fields)
    }

    /// Add Option fields that weren't serialized (because they're None)
    fn add_missing_option_fields(
        mut result: String,
        comments: &HashMap<String, String>,
        seen_fields: &HashSet<String>,
    ) -> String {
        let option_fields = ["store.auth_token"];

        for field_path in option_fields {
            if seen_fields.contains(field_path) || !comments.contains_key(field_path) {
                continue;
            }
            let Some((section, field_name)) = field_path.split_once('.') else {
                continue;
            };
            let section_header = format!("# [{}]", section);
            let Some(section_pos) = result.find(&section_header) else {
                continue;
            };
            let after_header_start = section_pos + section_header.len();
            let newline_pos = result[after_header_start..].find('\n').unwrap_or(0);
            let insert_pos = after_header_start + newline_pos + 1;

            let mut new_content = String::new();
            if let Some(comment) = comments.get(field_path) {
                for comment_line in comment.lines() {
                    new_content.push_str("# ");
                    new_content.push_str(comment_line);
                    new_content.push('\n');
                }
            }
            new_content.push_str(&format!("# {} = null\n", field_name));

            result.insert_str(insert_pos, &new_content);
        }

        result
    }

    /// Extract section name from TOML line like "[store]"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            None
        }
    }

    /// Extract dotted field path from an assignment line
    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }

        let eq_pos = trimmed.find('=')?;
        let field_name = trimmed[..eq_pos].trim();
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;

        let template = self.generate_default_config();
        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub chart: ChartConfig,
    pub debug: DebugConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "server",
        "# ============================================================================\n# Web Server\n# ============================================================================",
    ),
    (
        "store",
        "# ============================================================================\n# Record Store\n# ============================================================================\n# Where the movie records are fetched from on every page load.",
    ),
    (
        "chart",
        "# ============================================================================\n# Chart\n# ============================================================================",
    ),
    (
        "debug",
        "# ============================================================================\n# Debug Settings\n# ============================================================================",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

const SERVER_COMMENTS: &[(&str, &str)] = &[
    (
        "host",
        "Address the web server binds to. Use \"0.0.0.0\" to listen on all interfaces.",
    ),
    ("port", "Port the web server listens on"),
];

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Default record store endpoint.
pub const DEFAULT_STORE_URL: &str = "https://api.easybase.io";
/// Collection holding the movie ratings.
pub const DEFAULT_COLLECTION_ID: &str = "Dt-p-a0jVTBSVQji";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub collection_id: String,
    pub offset: usize,
    pub limit: usize,
    /// Opaque credential passed through as `authentication`. None = not sent.
    pub auth_token: Option<String>,
    /// Request timeout in seconds (0 = transport default).
    pub timeout_secs: u64,
}

const STORE_COMMENTS: &[(&str, &str)] = &[
    ("base_url", "Base URL of the record store service"),
    (
        "collection_id",
        "Collection (integration) id holding the movie records",
    ),
    ("offset", "Index of the first record to fetch"),
    ("limit", "Maximum number of records fetched per page load"),
    (
        "auth_token",
        "Authentication string passed through to the record store.\nnull = no authentication sent",
    ),
    (
        "timeout_secs",
        "Request timeout in seconds. 0 = no explicit timeout",
    ),
];

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            collection_id: DEFAULT_COLLECTION_ID.to_string(),
            offset: 0,
            limit: 2000,
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
    /// Fill color of every point, "#rrggbb".
    pub point_color: String,
    pub x_label: String,
    pub y_label: String,
}

const CHART_COMMENTS: &[(&str, &str)] = &[
    ("width", "Chart width in pixels"),
    ("height", "Chart height in pixels"),
    ("point_size", "Radius of each plotted movie in pixels"),
    ("point_color", "Point color as hex (#rrggbb)"),
    ("x_label", "X axis title"),
    ("y_label", "Y axis title"),
];

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 600,
            point_size: 5,
            point_color: "#FF9900".to_string(),
            x_label: "IMDB Rating".to_string(),
            y_label: "Rotten Tomatoes Rating".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

const DEBUG_COMMENTS: &[(&str, &str)] = &[(
    "enabled",
    "Enable debug logging by default (same as --debug)",
)];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            chart: ChartConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load configuration from the given config directory (default → user)
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        let config_path = config_manager.config_path("config.toml");

        if config_path.exists() {
            let user_config = Self::load_user_config(&config_path)?;
            config.merge(user_config);
        }

        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_path.display(), e))?;

        Ok(config)
    }

    fn load_user_config(config_path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence where it differs from defaults)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.server.merge(other.server);
        self.store.merge(other.store);
        self.chart.merge(other.chart);
        self.debug.merge(other.debug);
    }

    /// Apply command-line overrides (highest precedence layer)
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(url) = &args.store_url {
            self.store.base_url = url.clone();
        }
        if let Some(collection) = &args.collection {
            self.store.collection_id = collection.clone();
        }
        if let Some(token) = &args.auth_token {
            self.store.auth_token = Some(token.clone());
        }
        if let Some(limit) = args.limit {
            self.store.limit = limit;
        }
        if args.debug {
            self.debug.enabled = true;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.server.port == 0 {
            return Err(eyre!("server.port must be greater than 0"));
        }

        if self.store.base_url.trim().is_empty() {
            return Err(eyre!("store.base_url must not be empty"));
        }
        if self.store.collection_id.trim().is_empty() {
            return Err(eyre!("store.collection_id must not be empty"));
        }
        if self.store.limit == 0 {
            return Err(eyre!("store.limit must be greater than 0"));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(eyre!(
                "chart.width and chart.height must be greater than 0, got {}x{}",
                self.chart.width,
                self.chart.height
            ));
        }
        if self.chart.point_size == 0 {
            return Err(eyre!("chart.point_size must be greater than 0"));
        }
        parse_hex(&self.chart.point_color)?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ServerConfig::default();
        if other.host != default.host {
            self.host = other.host;
        }
        if other.port != default.port {
            self.port = other.port;
        }
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    pub fn merge(&mut self, other: Self) {
        let default = StoreConfig::default();
        if other.base_url != default.base_url {
            self.base_url = other.base_url;
        }
        if other.collection_id != default.collection_id {
            self.collection_id = other.collection_id;
        }
        if other.offset != default.offset {
            self.offset = other.offset;
        }
        if other.limit != default.limit {
            self.limit = other.limit;
        }
        if other.auth_token.is_some() {
            self.auth_token = other.auth_token;
        }
        if other.timeout_secs != default.timeout_secs {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
        if other.point_size != default.point_size {
            self.point_size = other.point_size;
        }
        if other.point_color != default.point_color {
            self.point_color = other.point_color;
        }
        if other.x_label != default.x_label {
            self.x_label = other.x_label;
        }
        if other.y_label != default.y_label {
            self.y_label = other.y_label;
        }
    }

    /// Point color as RGB components. Falls back to the default color if unparsable.
    pub fn point_rgb(&self) -> (u8, u8, u8) {
        parse_hex(&self.point_color).unwrap_or((0xFF, 0x99, 0x00))
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Parse hex color string (#ff0000) to RGB components
pub fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.is_ascii() || !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}
