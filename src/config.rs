//! Project configuration for ts-analyzer.
//!
//! An optional YAML file supplies defaults for the command-line flags:
//!
//! ```yaml
//! code_block: 'using\s+\w+\s+=\s+getContext\(\)'
//! regex: true
//! fn_types: [exported, internal]
//! file_glob: "src/**/*.ts"
//! excluded_paths:
//!   - "**/generated/**"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names looked up in the target directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &[".ts-analyzer.yaml", "ts-analyzer.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Code block to check for.
    #[serde(default)]
    pub code_block: Option<String>,
    /// Treat `code_block` as a regular expression.
    #[serde(default)]
    pub regex: Option<bool>,
    /// Report functions that DO contain the code block.
    #[serde(default)]
    pub invert: Option<bool>,
    #[serde(default)]
    pub file_glob: Option<String>,
    /// Function types to check: exported, internal, callback.
    #[serde(default)]
    pub fn_types: Vec<String>,
    /// Glob patterns for paths to skip (e.g., "**/generated/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Look for a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// `fn_types` as the comma-separated form the CLI takes.
    pub fn fn_types_list(&self) -> Option<String> {
        if self.fn_types.is_empty() {
            None
        } else {
            Some(self.fn_types.join(","))
        }
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Validate a config before use.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if let (Some(code_block), Some(true)) = (&config.code_block, config.regex) {
        regex::Regex::new(code_block)
            .map_err(|e| anyhow::anyhow!("invalid code_block regex {:?}: {}", code_block, e))?;
    }

    if let Some(glob) = &config.file_glob {
        globset::Glob::new(glob)
            .map_err(|e| anyhow::anyhow!("invalid file_glob {:?}: {}", glob, e))?;
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
