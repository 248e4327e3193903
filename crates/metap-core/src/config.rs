//! Pipeline configuration.
//!
//! A config file is TOML with a single `[metap]` table:
//!
//! ```toml
//! [metap]
//! passes = ["log_returns", "compile"]
//! range = [3, [10, 20]]
//! include_fname = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::range::RangeSelection;

/// Name of the project-level config file searched by [`Config::load_from_project`].
pub const CONFIG_FILE_NAME: &str = "metap.toml";

/// metap configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub metap: PipelineConfig,
}

/// Which passes run, in order, and how they are parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Passes to run, in order
    #[serde(default)]
    pub passes: Vec<PassName>,

    /// Lines the instrumentation passes may rewrite; empty means all
    #[serde(default)]
    pub range: RangeSelection,

    /// Prefix log tags with the input's file name
    #[serde(default)]
    pub include_fname: bool,

    /// Use the indenting variant of function-entry logging
    #[serde(default)]
    pub indent: bool,

    /// How break/continue logging inserts its print
    #[serde(default)]
    pub break_strategy: BreakStrategy,

    /// Indentation unit of the emitted program
    #[serde(default = "default_indent_unit")]
    pub indent_unit: String,
}

fn default_indent_unit() -> String {
    "  ".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            passes: Vec::new(),
            range: RangeSelection::default(),
            include_fname: false,
            indent: false,
            break_strategy: BreakStrategy::default(),
            indent_unit: default_indent_unit(),
        }
    }
}

/// A selectable pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassName {
    LogReturns,
    LogBreaks,
    LogContinues,
    LogCalls,
    LogCallsStartEnd,
    LogFuncDefs,
    LogIfs,
    Compile,
    DynTypecheck,
}

impl PassName {
    pub const ALL: [PassName; 9] = [
        PassName::LogReturns,
        PassName::LogBreaks,
        PassName::LogContinues,
        PassName::LogCalls,
        PassName::LogCallsStartEnd,
        PassName::LogFuncDefs,
        PassName::LogIfs,
        PassName::Compile,
        PassName::DynTypecheck,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PassName::LogReturns => "log_returns",
            PassName::LogBreaks => "log_breaks",
            PassName::LogContinues => "log_continues",
            PassName::LogCalls => "log_calls",
            PassName::LogCallsStartEnd => "log_calls_start_end",
            PassName::LogFuncDefs => "log_func_defs",
            PassName::LogIfs => "log_ifs",
            PassName::Compile => "compile",
            PassName::DynTypecheck => "dyn_typecheck",
        }
    }
}

impl fmt::Display for PassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PassName::ALL
            .into_iter()
            .find(|p| p.as_str() == s || p.as_str().replace('_', "-") == s)
            .ok_or_else(|| ConfigError::UnknownPass(s.to_string()))
    }
}

/// Break/continue logging strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStrategy {
    /// Splice the print directly before the statement.
    #[default]
    Splice,
    /// Wrap print and statement in a synthetic `if True:` block.
    Wrap,
}

impl FromStr for BreakStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "splice" => Ok(BreakStrategy::Splice),
            "wrap" => Ok(BreakStrategy::Wrap),
            other => Err(ConfigError::UnknownBreakStrategy(other.to_string())),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::debug!(path = %path.display(), passes = config.metap.passes.len(), "loaded config");
        Ok(config)
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load `metap.toml` from the given project root, or defaults if absent
    pub fn load_from_project(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Selector;

    #[test]
    fn defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.metap, PipelineConfig::default());
        assert_eq!(config.metap.indent_unit, "  ");
        assert_eq!(config.metap.break_strategy, BreakStrategy::Splice);
    }

    #[test]
    fn full_table() {
        let config = Config::parse(
            r#"
[metap]
passes = ["log_returns", "dyn_typecheck"]
range = [3, [10, 20]]
include_fname = true
indent = true
break_strategy = "wrap"
"#,
        )
        .unwrap();
        let metap = config.metap;
        assert_eq!(metap.passes, vec![PassName::LogReturns, PassName::DynTypecheck]);
        assert_eq!(
            metap.range.selectors(),
            &[Selector::Line(3), Selector::Interval(10, 20)]
        );
        assert!(metap.include_fname);
        assert!(metap.indent);
        assert_eq!(metap.break_strategy, BreakStrategy::Wrap);
    }

    #[test]
    fn unknown_pass_is_rejected() {
        assert!(Config::parse("[metap]\npasses = [\"log_everything\"]\n").is_err());
        assert!("log_everything".parse::<PassName>().is_err());
    }

    #[test]
    fn pass_names_parse_both_spellings() {
        assert_eq!("log_func_defs".parse::<PassName>().unwrap(), PassName::LogFuncDefs);
        assert_eq!("log-func-defs".parse::<PassName>().unwrap(), PassName::LogFuncDefs);
        for pass in PassName::ALL {
            assert_eq!(pass.to_string().parse::<PassName>().unwrap(), pass);
        }
    }

    #[test]
    fn reversed_range_selects_nothing() {
        let config = Config::parse("[metap]\nrange = [[9, 2]]\n").unwrap();
        assert!(!config.metap.range.is_empty());
        assert!(!(0..=10).any(|line| config.metap.range.contains(line)));
    }
}
