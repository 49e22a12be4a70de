use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

/// Port used when neither the command line nor the config file names one.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid port {0:?}: expected a number from 1 to 65535")]
    InvalidPort(String),
    #[error("invalid document root {}: {source}", .path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document root {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Command line of the server binary.
#[derive(Parser, Debug, Default)]
#[command(name = "staticd", version, about = "Serve a directory over HTTP/1.0")]
pub struct Cli {
    /// Document root to serve (defaults to the current directory)
    #[arg(short = 'r', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// TCP port to listen on
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<String>,

    /// Config file with `root=` and `port=` lines
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Values read from a `key=value` config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub root: Option<PathBuf>,
    pub port: Option<String>,
}

impl FileConfig {
    /// Parses config file contents.
    ///
    /// Blank lines, `#` comments and lines without `=` are skipped. Keys are
    /// matched case-insensitively; the last occurrence of a key wins.
    pub fn parse(contents: &str) -> Self {
        let mut cfg = FileConfig::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.eq_ignore_ascii_case("root") {
                cfg.root = Some(PathBuf::from(value));
            } else if key.eq_ignore_ascii_case("port") {
                cfg.port = Some(value.to_string());
            } else {
                tracing::warn!(key, "ignoring unknown config key");
            }
        }

        cfg
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }
}

/// Server settings, fixed once constructed.
///
/// Shared read-only by every connection task; there are no setters.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    root_requested: PathBuf,
    root_canonical: PathBuf,
    port: u16,
}

impl ServerConfig {
    /// Validates `port` and canonicalizes `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>, port: u16) -> Result<Self, ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort(port.to_string()));
        }

        let root_requested = root.into();
        let root_canonical =
            std::fs::canonicalize(&root_requested).map_err(|source| ConfigError::InvalidRoot {
                path: root_requested.clone(),
                source,
            })?;

        if !root_canonical.is_dir() {
            return Err(ConfigError::RootNotDirectory(root_canonical));
        }

        Ok(Self {
            root_requested,
            root_canonical,
            port,
        })
    }

    /// Builds the config from the command line.
    ///
    /// Precedence, highest first: command line, config file, defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let root = match cli.root.clone().or(file.root) {
            Some(root) => root,
            None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let port = match cli.port.as_deref().or(file.port.as_deref()) {
            Some(port) => parse_port(port)?,
            None => DEFAULT_PORT,
        };

        Self::new(root, port)
    }

    /// The document root as it was given.
    pub fn root_requested(&self) -> &Path {
        &self.root_requested
    }

    /// The absolute, symlink-free document root used for containment checks.
    pub fn root_canonical(&self) -> &Path {
        &self.root_canonical
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Parses a port number in the range 1-65535.
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(value.to_string())),
    }
}
