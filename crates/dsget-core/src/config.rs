use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// URL groups. `common` is the full dataset; `demo` is the small subset
/// additionally fetched when a demo run is requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlGroups {
    #[serde(default)]
    pub demo: Vec<String>,
    #[serde(default)]
    pub common: Vec<String>,
}

/// Dataset configuration loaded from `~/.config/dsget/datasets.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub urls: UrlGroups,
}

impl DatasetConfig {
    /// Groups to fetch for this run, in declared order. A demo run fetches
    /// the demo subset first and then the common files; a full run fetches
    /// the common files only.
    pub fn selected_groups(&self, demo: bool) -> Vec<(&'static str, &[String])> {
        let mut groups: Vec<(&'static str, &[String])> = Vec::new();
        if demo {
            groups.push(("demo", self.urls.demo.as_slice()));
        }
        groups.push(("common", self.urls.common.as_slice()));
        groups
    }
}

const TEMPLATE: &str = r#"# dsget dataset configuration.
#
# Each group lists source URLs in download order. A SHA256SUMS.txt manifest
# is expected in the same remote directory as the data files.

[urls]
demo = []
common = []
"#;

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsget")?;
    Ok(xdg_dirs.place_config_file("datasets.toml")?)
}

/// Load configuration from `path`, or from the XDG default location,
/// writing a commented template there first if none exists yet.
pub fn load_or_init(path: Option<&Path>) -> Result<DatasetConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, TEMPLATE)
            .with_context(|| format!("write config template {}", path.display()))?;
        tracing::info!("created config template at {}", path.display());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: DatasetConfig = toml::from_str(&data)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DatasetConfig {
        DatasetConfig {
            urls: UrlGroups {
                demo: vec!["http://example.com/demo.csv".to_string()],
                common: vec!["http://example.com/common.csv".to_string()],
            },
        }
    }

    #[test]
    fn template_parses_to_empty_groups() {
        let cfg: DatasetConfig = toml::from_str(TEMPLATE).unwrap();
        assert!(cfg.urls.demo.is_empty());
        assert!(cfg.urls.common.is_empty());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = sample();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DatasetConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.urls.demo, cfg.urls.demo);
        assert_eq!(parsed.urls.common, cfg.urls.common);
    }

    #[test]
    fn demo_run_selects_demo_then_common() {
        let cfg = sample();
        let groups = cfg.selected_groups(true);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "demo");
        assert_eq!(groups[1].0, "common");
    }

    #[test]
    fn full_run_selects_common_only() {
        let cfg = sample();
        let groups = cfg.selected_groups(false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "common");
    }

    #[test]
    fn load_or_init_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasets.toml");
        let cfg = load_or_init(Some(&path)).unwrap();
        assert!(path.exists());
        assert!(cfg.urls.common.is_empty());

        // Second load reads the existing file rather than rewriting it.
        fs::write(
            &path,
            "[urls]\ndemo = []\ncommon = [\"http://example.com/a.csv\"]\n",
        )
        .unwrap();
        let cfg = load_or_init(Some(&path)).unwrap();
        assert_eq!(cfg.urls.common, vec!["http://example.com/a.csv"]);
    }
}
