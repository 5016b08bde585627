use log::warn;
use serde::{Deserialize, Serialize};
use sm83emu_core::cpu::StubPolicy;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StubMode {
    #[default]
    Abort,
    Warn,
}

impl From<StubMode> for StubPolicy {
    fn from(mode: StubMode) -> Self {
        match mode {
            StubMode::Abort => StubPolicy::Abort,
            StubMode::Warn => StubPolicy::Warn,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunnerConfig {
    /// Instruction budget for one run.
    pub max_steps: u64,
    /// Start from the register state the boot ROM leaves behind.
    pub post_boot: bool,
    /// DMG revision for `post_boot` (`0`, `a`, `b` or `c`).
    pub revision: String,
    pub stubs: StubMode,
    /// Print the CPU state every N instructions; 0 disables.
    pub trace_every: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            post_boot: false,
            revision: "c".to_string(),
            stubs: StubMode::Abort,
            trace_every: 0,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("sm83emu").join("runner.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("sm83emu").join("runner.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("sm83emu")
            .join("runner.toml");
    }

    PathBuf::from("runner.toml")
}

pub fn parse(text: &str, origin: &Path) -> RunnerConfig {
    match toml::from_str::<RunnerConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse runner config {}: {e}; using defaults",
                origin.display()
            );
            RunnerConfig::default()
        }
    }
}

pub fn load_from_file(path: &Path) -> RunnerConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return RunnerConfig::default(),
    };
    parse(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> RunnerConfig {
        parse(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse_str(""), RunnerConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse_str("max-steps = 42\nstubs = \"warn\"\n");
        assert_eq!(cfg.max_steps, 42);
        assert_eq!(cfg.stubs, StubMode::Warn);
        assert!(!cfg.post_boot);
        assert_eq!(cfg.revision, "c");
    }

    #[test]
    fn full_file() {
        let cfg = parse_str(
            "max-steps = 10\npost-boot = true\nrevision = \"0\"\nstubs = \"abort\"\ntrace-every = 5\n",
        );
        assert_eq!(
            cfg,
            RunnerConfig {
                max_steps: 10,
                post_boot: true,
                revision: "0".to_string(),
                stubs: StubMode::Abort,
                trace_every: 5,
            }
        );
    }

    #[test]
    fn malformed_file_falls_back() {
        assert_eq!(parse_str("max-steps = \"lots\""), RunnerConfig::default());
        assert_eq!(parse_str("not toml ["), RunnerConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = load_from_file(Path::new("/nonexistent/sm83emu/runner.toml"));
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn serializes_round_trip() {
        let cfg = RunnerConfig {
            trace_every: 100,
            ..RunnerConfig::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("trace-every = 100"));
        assert_eq!(parse_str(&text), cfg);
    }

    #[test]
    fn stub_mode_maps_to_policy() {
        assert_eq!(StubPolicy::from(StubMode::Warn), StubPolicy::Warn);
        assert_eq!(StubPolicy::from(StubMode::default()), StubPolicy::Abort);
    }
}
