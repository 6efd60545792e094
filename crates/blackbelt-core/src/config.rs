use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use blackbelt_shared::{DuplicateNotice, NameMatch};
use tracing::{debug, info, trace, warn};

/// Environment variable naming the rc file. `/dev/null` disables loading.
pub const RC_ENV: &str = "BLACKBELTRC";

#[derive(Debug, Clone)]
pub struct Config {
    map: BTreeMap<String, String>,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let map = [
            ("data.location", "~/.blackbelt"),
            ("default.command", "list"),
            ("color", "on"),
            ("duplicate.notice", "alert"),
            ("lookup.normalized", "off"),
            ("welcome", "on"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            map,
            loaded_files: vec![],
        }
    }
}

impl Config {
    #[tracing::instrument(skip(rc_override))]
    pub fn load(rc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Config::default();

        if let Some(path) = resolve_rc_path(rc_override)? {
            info!(rc = %path.display(), "loading rc file");
            cfg.load_file(&path, &mut Vec::new())?;
        } else {
            debug!("no rc file found; using defaults");
        }

        Ok(cfg)
    }

    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in overrides {
            let key = k.strip_prefix("rc.").unwrap_or(&k).to_string();
            debug!(key = %key, value = %v, "applying override");
            self.map.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).map(|v| parse_bool(v))
    }

    pub fn duplicate_notice(&self) -> anyhow::Result<DuplicateNotice> {
        match self.get("duplicate.notice") {
            Some(raw) => raw.parse().map_err(|e: String| anyhow!(e)),
            None => Ok(DuplicateNotice::default()),
        }
    }

    pub fn name_match(&self) -> NameMatch {
        if self.get_bool("lookup.normalized").unwrap_or(false) {
            NameMatch::Normalized
        } else {
            NameMatch::Exact
        }
    }

    pub fn welcome_enabled(&self) -> bool {
        self.get_bool("welcome").unwrap_or(true)
    }

    #[tracing::instrument(skip(self))]
    /// Reads one rc file. `chain` holds the canonical paths of the files
    /// currently being included, outermost first.
    fn load_file(&mut self, path: &Path, chain: &mut Vec<PathBuf>) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let canonical = fs::canonicalize(&path)
            .with_context(|| format!("failed to resolve {}", path.display()))?;
        if chain.contains(&canonical) {
            return Err(anyhow!("include cycle at {}", path.display()));
        }
        chain.push(canonical);

        self.loaded_files.push(path.clone());

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        for (line_num, raw_line) in text.lines().enumerate() {
            let line = raw_line
                .split_once('#')
                .map_or(raw_line, |(before, _)| before)
                .trim();
            if line.is_empty() {
                continue;
            }

            if let Some(include_rest) = line.strip_prefix("include ") {
                let include_path = resolve_include_path(&base_dir, include_rest.trim())?;
                debug!(
                    file = %path.display(),
                    include = %include_path.display(),
                    line = line_num + 1,
                    "processing include"
                );

                if include_path.exists() {
                    self.load_file(&include_path, chain)?;
                } else {
                    warn!(include = %include_path.display(), "include file does not exist; skipping");
                }
                continue;
            }

            let (k, v) = line.split_once('=').ok_or_else(|| {
                anyhow!(
                    "invalid config line {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    raw_line
                )
            })?;

            let key = k.trim().to_string();
            let value = v.trim().to_string();
            trace!(key = %key, value = %value, "loaded config key");
            self.map.insert(key, value);
        }

        chain.pop();
        Ok(())
    }
}

#[tracing::instrument(skip(cfg, override_dir))]
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = if let Some(path) = override_dir {
        path.to_path_buf()
    } else if let Some(cfg_value) = cfg.get("data.location") {
        expand_tilde(Path::new(&cfg_value))
    } else {
        default_data_dir()?
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

fn resolve_rc_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(rc_env) = std::env::var(RC_ENV) {
        if rc_env == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(rc_env)));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    let candidate = home.join(".blackbeltrc");
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(".blackbelt"))
}

fn resolve_include_path(base_dir: &Path, include: &str) -> anyhow::Result<PathBuf> {
    if include.trim().is_empty() {
        return Err(anyhow!("include path cannot be empty"));
    }

    let expanded = expand_tilde(Path::new(include));
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base_dir.join(expanded))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "true"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_known_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("default.command").as_deref(), Some("list"));
        assert_eq!(cfg.get_bool("color"), Some(true));
        assert_eq!(cfg.name_match(), NameMatch::Exact);
        assert_eq!(cfg.duplicate_notice().expect("notice"), DuplicateNotice::Alert);
        assert!(cfg.welcome_enabled());
    }

    #[test]
    fn rc_file_with_include_and_comments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let extra = dir.path().join("extra.rc");
        fs::write(&extra, "duplicate.notice = inline\n").expect("write include");
        let rc = dir.path().join("blackbeltrc");
        fs::write(
            &rc,
            "# quests\ncolor = off  # no ansi\ninclude extra.rc\ninclude missing.rc\n\nlookup.normalized=yes\n",
        )
        .expect("write rc");

        let cfg = Config::load(Some(rc.as_path())).expect("load");
        assert_eq!(cfg.get_bool("color"), Some(false));
        assert_eq!(cfg.duplicate_notice().expect("notice"), DuplicateNotice::Inline);
        assert_eq!(cfg.name_match(), NameMatch::Normalized);
        assert_eq!(cfg.loaded_files.len(), 2);
    }

    #[test]
    fn self_include_is_reported_as_a_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rc = dir.path().join("blackbeltrc");
        fs::write(&rc, "color = off\ninclude blackbeltrc\n").expect("write rc");

        let err = Config::load(Some(rc.as_path())).expect_err("cycle");
        assert!(err.to_string().contains("include cycle"), "{err:#}");
    }

    #[test]
    fn mutual_includes_are_reported_as_a_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.rc"), "include b.rc\n").expect("write a");
        fs::write(dir.path().join("b.rc"), "welcome = off\ninclude a.rc\n").expect("write b");

        let rc = dir.path().join("a.rc");
        assert!(Config::load(Some(rc.as_path())).is_err());
    }

    #[test]
    fn same_file_may_be_included_twice_without_a_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("common.rc"), "color = off\n").expect("write common");
        fs::write(dir.path().join("side.rc"), "include common.rc\n").expect("write side");
        let rc = dir.path().join("blackbeltrc");
        fs::write(&rc, "include common.rc\ninclude side.rc\n").expect("write rc");

        let cfg = Config::load(Some(rc.as_path())).expect("load");
        assert_eq!(cfg.get_bool("color"), Some(false));
        assert_eq!(cfg.loaded_files.len(), 4);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rc = dir.path().join("blackbeltrc");
        fs::write(&rc, "color on\n").expect("write rc");
        assert!(Config::load(Some(rc.as_path())).is_err());
    }

    #[test]
    fn overrides_strip_rc_prefix() {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![
            ("rc.welcome".to_string(), "off".to_string()),
            ("duplicate.notice".to_string(), "bogus".to_string()),
        ]);
        assert!(!cfg.welcome_enabled());
        assert!(cfg.duplicate_notice().is_err());
    }
}
