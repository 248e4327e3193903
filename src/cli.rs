//! Command-line front end.
//!
//! ```bash
//! # Log every return, write prog.metap.py
//! metap prog.py --pass log_returns
//!
//! # Expand macros, then log calls on lines 10-20, JSON summary on stdout
//! metap prog.py --pass compile,log_calls --range 10-20 --json
//! ```
//!
//! Pass parameters come from `metap.toml` (next to the input, or `--config`)
//! and are overridden by flags.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use metap_core::{BreakStrategy, Config, PassName, PipelineConfig, RangeSelection};

use crate::driver::MetaP;
use crate::error::{MetapError, MetapResult};
use crate::output::TransformResponse;

/// Instrument and expand macros in a Python program.
#[derive(Parser, Debug)]
#[command(name = "metap", version, about = "Instrument and expand macros in a Python program")]
pub struct Cli {
    /// Python file to transform.
    pub file: PathBuf,

    /// Passes to run, in order (comma separated or repeated).
    #[arg(short, long = "pass", value_delimiter = ',')]
    pub passes: Vec<PassName>,

    /// Lines to instrument, e.g. `3,7-9` (default: all).
    #[arg(long)]
    pub range: Option<RangeSelection>,

    /// Prefix log tags with the input's file name.
    #[arg(long)]
    pub include_fname: bool,

    /// Indent output printed inside logged functions.
    #[arg(long)]
    pub indent: bool,

    /// How break/continue logging inserts its print.
    #[arg(long, value_enum)]
    pub break_strategy: Option<StrategyArg>,

    /// Config file (default: metap.toml next to the input).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output file (default: <stem>.metap.py next to the input).
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the transformed program instead of writing a file.
    #[arg(long)]
    pub stdout: bool,

    /// Print a JSON summary on stdout.
    #[arg(long, conflicts_with = "stdout")]
    pub json: bool,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Print directly before the statement.
    Splice,
    /// Wrap print and statement in `if True:`.
    Wrap,
}

impl From<StrategyArg> for BreakStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Splice => BreakStrategy::Splice,
            StrategyArg::Wrap => BreakStrategy::Wrap,
        }
    }
}

impl Cli {
    /// The config file's pipeline with flags applied on top.
    pub fn pipeline_config(&self) -> MetapResult<PipelineConfig> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_from_project(project_root(&self.file))?,
        };
        let mut pipeline = config.metap;
        if !self.passes.is_empty() {
            pipeline.passes = self.passes.clone();
        }
        if let Some(range) = &self.range {
            pipeline.range = range.clone();
        }
        pipeline.include_fname |= self.include_fname;
        pipeline.indent |= self.indent;
        if let Some(strategy) = self.break_strategy {
            pipeline.break_strategy = strategy.into();
        }
        if pipeline.indent_unit.is_empty() || pipeline.indent_unit.chars().any(|c| c != ' ' && c != '\t') {
            return Err(MetapError::invalid_arguments(format!(
                "indent_unit must be spaces or tabs, got {:?}",
                pipeline.indent_unit
            )));
        }
        Ok(pipeline)
    }
}

fn project_root(file: &Path) -> &Path {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Run the pipeline described by `cli`. The transformed program is written
/// to a file, or to `out` with `--stdout`.
pub fn run(cli: &Cli, out: &mut impl Write) -> MetapResult<TransformResponse> {
    let pipeline = cli.pipeline_config()?;
    let mut mp = MetaP::from_file(&cli.file)?;
    mp.run_config(&pipeline)?;

    if cli.stdout {
        out.write_all(mp.render(&pipeline.indent_unit).as_bytes())
            .map_err(|e| MetapError::io("write", "<stdout>", e))?;
        return Ok(TransformResponse::new(&mp, None));
    }
    let written = mp.dump(cli.output.as_deref(), &pipeline.indent_unit)?;
    Ok(TransformResponse::new(&mp, Some(&written)))
}

/// Run with stdout as the program sink.
pub fn run_to_stdout(cli: &Cli) -> MetapResult<TransformResponse> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    let response = run(cli, &mut lock)?;
    lock.flush()
        .map_err(|e| MetapError::io("write", "<stdout>", e))?;
    Ok(response)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use metap_core::Selector;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("metap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn passes_accept_lists_and_repeats() {
        let cli = parse(&["prog.py", "--pass", "compile,log-returns", "-p", "log_ifs"]);
        assert_eq!(
            cli.passes,
            vec![PassName::Compile, PassName::LogReturns, PassName::LogIfs]
        );
    }

    #[test]
    fn unknown_pass_is_a_usage_error() {
        let err = Cli::try_parse_from(["metap", "prog.py", "--pass", "log_everything"]).unwrap_err();
        assert!(err.to_string().contains("log_everything"), "{}", err);
    }

    #[test]
    fn range_parses() {
        let cli = parse(&["prog.py", "--range", "3,7-9"]);
        let range = cli.range.unwrap();
        assert_eq!(range.selectors(), &[Selector::Line(3), Selector::Interval(7, 9)]);
        assert!(Cli::try_parse_from(["metap", "prog.py", "--range", "9-3"]).is_err());
    }

    #[test]
    fn output_conflicts_with_stdout() {
        assert!(Cli::try_parse_from(["metap", "prog.py", "-o", "x.py", "--stdout"]).is_err());
    }

    #[test]
    fn flags_default_to_config_values() {
        let cli = parse(&["definitely/not/here/prog.py"]);
        let pipeline = cli.pipeline_config().unwrap();
        assert_eq!(pipeline, PipelineConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "definitely/not/here/prog.py",
            "--pass",
            "log_breaks",
            "--break-strategy",
            "wrap",
            "--include-fname",
        ]);
        let pipeline = cli.pipeline_config().unwrap();
        assert_eq!(pipeline.passes, vec![PassName::LogBreaks]);
        assert_eq!(pipeline.break_strategy, BreakStrategy::Wrap);
        assert!(pipeline.include_fname);
        assert!(!pipeline.indent);
    }

    #[test]
    fn project_root_of_bare_file_is_cwd() {
        assert_eq!(project_root(Path::new("prog.py")), Path::new("."));
        assert_eq!(project_root(Path::new("src/prog.py")), Path::new("src"));
    }
}
