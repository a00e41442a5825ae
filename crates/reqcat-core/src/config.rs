//! Configuration for discovery, resolution, and output.
//!
//! Load order: `.reqcat/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level reqcat configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub resolve: ResolveConfig,
    pub output: OutputConfig,
}

/// Which files count as documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Document file extension, without the leading dot.
    pub extension: String,
    /// Glob patterns (relative to the root) a document must match.
    pub include: Vec<String>,
    /// Glob patterns (relative to the root) that exclude a document.
    pub exclude: Vec<String>,
    /// Descend into hidden files and directories.
    pub hidden: bool,
    /// Honor `.gitignore`, `.ignore` and `.reqcatignore` files.
    pub respect_ignore_files: bool,
}

/// How raw references become document identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Directory references are joined against. Relative paths are taken
    /// relative to the root; unset means the root itself.
    pub base_dir: Option<PathBuf>,
}

/// Where and how the concatenated artifact is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file, relative to the root unless absolute.
    pub path: PathBuf,
    /// Written after every document.
    pub separator: String,
    /// Fail the run when a document requires an undiscovered document,
    /// instead of sorting the target as a leaf and skipping it.
    pub strict_missing: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            hidden: false,
            respect_ignore_files: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("result.txt"),
            separator: "\n\n".to_string(),
            strict_missing: false,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl Config {
    /// Path of the config file for a given root.
    pub fn path(root: &Path) -> PathBuf {
        root.join(".reqcat").join("config.toml")
    }

    /// Load config from `.reqcat/config.toml` under `root`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = Self::path(root);

        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        env_override("REQCAT_EXTENSION", &mut config.discovery.extension);
        env_override("REQCAT_OUTPUT", &mut config.output.path);
        env_override("REQCAT_SEPARATOR", &mut config.output.separator);
        env_override("REQCAT_STRICT_MISSING", &mut config.output.strict_missing);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ext = &self.discovery.extension;
        if ext.is_empty() {
            anyhow::bail!("discovery.extension must not be empty");
        }
        if ext.starts_with('.') {
            anyhow::bail!(
                "discovery.extension ({:?}) must not start with a dot; use {:?}",
                ext,
                ext.trim_start_matches('.')
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.discovery.extension, "txt");
        assert!(config.discovery.include.is_empty());
        assert!(config.discovery.respect_ignore_files);
        assert!(!config.discovery.hidden);
        assert!(config.resolve.base_dir.is_none());
        assert_eq!(config.output.path, PathBuf::from("result.txt"));
        assert_eq!(config.output.separator, "\n\n");
        assert!(!config.output.strict_missing);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[discovery]
extension = "md"
exclude = ["drafts/**"]

[resolve]
base_dir = "parts"

[output]
path = "dist/book.md"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.discovery.extension, "md");
        assert_eq!(config.discovery.exclude, vec!["drafts/**".to_string()]);
        assert_eq!(config.resolve.base_dir, Some(PathBuf::from("parts")));
        assert_eq!(config.output.path, PathBuf::from("dist/book.md"));
        // Defaults for unspecified fields
        assert_eq!(config.output.separator, "\n\n");
        assert!(config.discovery.respect_ignore_files);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = Config::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.discovery.extension, "txt");
    }

    #[test]
    fn test_load_rejects_dotted_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".reqcat");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[discovery]\nextension = \".txt\"\n").unwrap();

        let err = Config::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("must not start with a dot"));
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".reqcat");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[output\n").unwrap();

        let err = Config::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
