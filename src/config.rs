//! Configuration management for the JSX editor server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional project configuration file (`.jsx-editor.toml`)
//! - Global fallback configuration in the user's config directory

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-project configuration file, looked up in the root
pub const PROJECT_CONFIG_FILE: &str = ".jsx-editor.toml";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5179;
pub const DEFAULT_HOLD_MS: u64 = 1000;

/// Extensions watched for reload notifications unless configured otherwise
pub fn default_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Command-line arguments for the JSX editor server
#[derive(Debug, Parser)]
#[command(name = "jsxed")]
#[command(about = "Writes visual-editor prop changes back into JSX source files")]
#[command(version)]
pub struct Args {
    /// Project root containing the JSX sources
    #[arg(long, default_value = ".", help = "Project root containing the JSX sources")]
    pub root: PathBuf,

    /// Address to bind the RPC server to
    #[arg(long, help = "Address to bind (default 127.0.0.1)")]
    pub host: Option<String>,

    /// Port to bind the RPC server to
    #[arg(long, help = "Port to bind (default 5179)")]
    pub port: Option<u16>,

    /// How long a programmatic edit suppresses the watcher
    #[arg(long, help = "Self-edit hold duration in milliseconds (default 1000)")]
    pub hold_ms: Option<u64>,

    /// Explicit configuration file
    #[arg(long, help = "Config file (default <root>/.jsx-editor.toml)")]
    pub config: Option<PathBuf>,

    /// Log level for the server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Project configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    pub server: Option<ServerSection>,
    pub editor: Option<EditorSection>,
    pub watch: Option<WatchSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorSection {
    pub hold_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    pub extensions: Option<Vec<String>>,
}

/// Combined configuration from all sources (CLI over file over defaults)
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonicalized project root
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    /// How long a programmatic edit suppresses the watcher, in milliseconds
    pub hold_ms: u64,
    /// File extensions forwarded as reload notifications
    pub watch_extensions: Vec<String>,
    /// Log level string, applied by the binary before startup
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let root = std::fs::canonicalize(&args.root)
            .with_context(|| format!("project root does not exist: {}", args.root.display()))?;

        let file = Self::load_project_config(&root, args.config.as_deref())?;
        let server = file.server.unwrap_or_default();
        let editor = file.editor.unwrap_or_default();
        let watch = file.watch.unwrap_or_default();

        Ok(Config {
            host: args
                .host
                .or(server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(server.port).unwrap_or(DEFAULT_PORT),
            hold_ms: args.hold_ms.or(editor.hold_ms).unwrap_or(DEFAULT_HOLD_MS),
            watch_extensions: watch.extensions.unwrap_or_else(default_extensions),
            log_level: args.log_level,
            root,
        })
    }

    /// Load the project config file, if any
    ///
    /// An explicitly passed path must exist; otherwise the project file in
    /// the root wins over the user's global config directory, and a missing
    /// file just means defaults.
    fn load_project_config(root: &Path, explicit: Option<&Path>) -> Result<ProjectConfig> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            return Self::parse_config(&content, path);
        }

        let mut candidates = vec![root.join(PROJECT_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("jsx-editor").join("config.toml"));
        }

        for path in candidates {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file: {}", path.display()))?;
                return Self::parse_config(&content, &path);
            }
        }

        Ok(ProjectConfig::default())
    }

    fn parse_config(content: &str, path: &Path) -> Result<ProjectConfig> {
        toml::from_str(content)
            .with_context(|| format!("failed to parse config TOML: {}", path.display()))
    }

    /// Socket address the RPC server binds to
    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}
