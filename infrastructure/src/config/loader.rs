//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["capdispatch.toml", ".capdispatch.toml"];

/// Prefix of environment variable overrides (`CAPDISPATCH_DISPATCH__TIMEOUT_SECS=5`)
const ENV_PREFIX: &str = "CAPDISPATCH_";

/// One place configuration may come from, as shown by `capdispatch config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided; must exist)
    /// 2. `CAPDISPATCH_*` environment variables (`__` separates sections)
    /// 3. Project root: `./capdispatch.toml` or `./.capdispatch.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/capdispatch/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path)?.extract().map_err(Box::new)
    }

    /// The merged figment, for callers that want provenance or raw values.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment, Box<figment::Error>> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        Self::build(global.as_deref(), project.as_deref(), config_path)
    }

    fn build(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<Figment, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = explicit {
            // Toml::file silently skips missing files; an explicit path must exist.
            if !path.is_file() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/capdispatch/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("capdispatch").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Configuration sources in priority order, highest first.
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.is_file(),
            });
        }

        sources.push(ConfigSource {
            label: "Env",
            location: format!("{}*", ENV_PREFIX),
            found: std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)),
        });

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: format!("./{} or ./{}", PROJECT_FILES[0], PROJECT_FILES[1]),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn extract(figment: Figment) -> FileConfig {
        figment.extract().unwrap()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.dispatch.timeout_secs, 30);
        assert!(config.builtin.enabled);
        assert!(config.capabilities.command.is_empty());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("capdispatch"));
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let global = toml_file("[dispatch]\ntimeout_secs = 10\n[output]\ncolor = false\n");
        let project = toml_file("[dispatch]\ntimeout_secs = 20\n");
        let explicit = toml_file("[builtin]\nenabled = false\n");

        let config = extract(
            ConfigLoader::build(
                Some(global.path()),
                Some(project.path()),
                Some(explicit.path()),
            )
            .unwrap(),
        );

        assert_eq!(config.dispatch.timeout_secs, 20);
        assert!(!config.output.color);
        assert!(!config.builtin.enabled);
    }

    #[test]
    fn test_command_capabilities_merge_across_files() {
        let global = toml_file(
            "[capabilities.command.uptime]\ncommand = \"uptime\"\n",
        );
        let project = toml_file(
            "[capabilities.command.disk_usage]\ncommand = \"du -sh {path}\"\n",
        );

        let config = extract(ConfigLoader::build(Some(global.path()), Some(project.path()), None).unwrap());
        let names: Vec<&String> = config.capabilities.command.keys().collect();
        assert_eq!(names, vec!["disk_usage", "uptime"]);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = ConfigLoader::build(None, None, Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let broken = toml_file("[dispatch]\ntimeout_secs = \"soon\"\n");
        let figment = ConfigLoader::build(None, None, Some(broken.path())).unwrap();
        assert!(figment.extract::<FileConfig>().is_err());
    }

    #[test]
    fn test_sources_end_with_defaults() {
        let sources = ConfigLoader::sources(Some(Path::new("/definitely/not/here.toml")));
        assert_eq!(sources[0].label, "Explicit");
        assert!(!sources[0].found);
        let last = sources.last().unwrap();
        assert_eq!(last.label, "Default");
        assert!(last.found);
    }
}
