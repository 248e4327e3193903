//! The pipeline driver.
//!
//! [`MetaP`] owns one parsed program. Pass methods rewrite it in place and
//! accumulate a [`PassReport`]; [`MetaP::render`] and [`MetaP::dump`] turn
//! the result back into source.
//!
//! ```
//! use metap::MetaP;
//! use metap::range::RangeSelection;
//!
//! let mut mp = MetaP::from_source("def add_one(n):\n  return n + 1\n", "add.py").unwrap();
//! mp.log_returns(&RangeSelection::all(), false).unwrap();
//! assert_eq!(
//!     mp.render("  "),
//!     "import metap\n\n\ndef add_one(n):\n  return metap.log_ret(n + 1, 'metap::Return(ln=2)')\n"
//! );
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use metap_ast::{parse_module, render_module_with_indent, Alias, Module, Stmt, StmtKind};
use metap_core::runtime::names;
use metap_core::{BreakStrategy, PassName, PipelineConfig, RangeSelection};
use metap_passes::ops::{self, LogOptions};
use metap_passes::typecheck::dyn_typecheck;
use metap_passes::{PassReport, PassResult};

use crate::error::{MetapError, MetapResult};

/// Suffix that replaces everything after the first `.` of the input name.
pub const OUTPUT_SUFFIX: &str = ".metap.py";

/// One program moving through the pipeline.
#[derive(Debug)]
pub struct MetaP {
    label: String,
    path: Option<PathBuf>,
    module: Module,
    report: PassReport,
    passes_run: Vec<PassName>,
}

impl MetaP {
    /// Read and parse `path`.
    pub fn from_file(path: impl AsRef<Path>) -> MetapResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| MetapError::io("read", path, e))?;
        let mut mp = Self::from_source(&text, &path.display().to_string())?;
        mp.path = Some(path.to_path_buf());
        Ok(mp)
    }

    /// Parse `text`. `label` names the input in log tags and error messages.
    pub fn from_source(text: &str, label: &str) -> MetapResult<Self> {
        let module = parse_module(text).map_err(|error| MetapError::Parse {
            label: label.to_string(),
            text: text.to_string(),
            error: Box::new(error),
        })?;
        tracing::debug!(input = label, statements = module.body.len(), "parsed");
        Ok(MetaP {
            label: label.to_string(),
            path: None,
            module,
            report: PassReport::default(),
            passes_run: Vec::new(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Everything the passes have done so far.
    pub fn report(&self) -> &PassReport {
        &self.report
    }

    /// Passes run so far, in order.
    pub fn passes_run(&self) -> &[PassName] {
        &self.passes_run
    }

    /// Base name of the input, used as the log tag prefix.
    fn fname(&self) -> String {
        Path::new(&self.label)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.label.clone())
    }

    fn log_options(&self, range: &RangeSelection, include_fname: bool) -> LogOptions {
        let fname = include_fname.then(|| self.fname());
        LogOptions::new(range.clone(), fname)
    }

    fn record(&mut self, pass: PassName, result: PassResult<PassReport>) -> MetapResult<PassReport> {
        let report = result?;
        for advisory in &report.advisories {
            tracing::warn!(input = %self.label, "{}", advisory);
        }
        tracing::info!(
            pass = pass.as_str(),
            rewrites = report.rewrites,
            uses_runtime = report.uses_runtime,
            "pass finished"
        );
        self.passes_run.push(pass);
        self.report.merge(report.clone());
        Ok(report)
    }

    pub fn log_returns(&mut self, range: &RangeSelection, include_fname: bool) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_returns(&mut self.module, &opts);
        self.record(PassName::LogReturns, result)
    }

    pub fn log_breaks(
        &mut self,
        range: &RangeSelection,
        include_fname: bool,
        strategy: BreakStrategy,
    ) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_breaks(&mut self.module, &opts, strategy);
        self.record(PassName::LogBreaks, result)
    }

    pub fn log_continues(
        &mut self,
        range: &RangeSelection,
        include_fname: bool,
        strategy: BreakStrategy,
    ) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_continues(&mut self.module, &opts, strategy);
        self.record(PassName::LogContinues, result)
    }

    pub fn log_calls(&mut self, range: &RangeSelection, include_fname: bool) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_calls(&mut self.module, &opts);
        self.record(PassName::LogCalls, result)
    }

    /// Log calls when they start and when they return, with elapsed time.
    pub fn log_calls_start_end(
        &mut self,
        range: &RangeSelection,
        include_fname: bool,
    ) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_calls_start_end(&mut self.module, &opts);
        self.record(PassName::LogCallsStartEnd, result)
    }

    /// Log function entries. With `indent`, output printed inside the
    /// function is indented one level per active call.
    pub fn log_func_defs(
        &mut self,
        range: &RangeSelection,
        include_fname: bool,
        indent: bool,
    ) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_func_defs(&mut self.module, &opts, indent);
        self.record(PassName::LogFuncDefs, result)
    }

    pub fn log_ifs(&mut self, range: &RangeSelection, include_fname: bool) -> MetapResult<PassReport> {
        let opts = self.log_options(range, include_fname);
        let result = ops::log_ifs(&mut self.module, &opts);
        self.record(PassName::LogIfs, result)
    }

    /// Expand every macro form. Leftover macros are an error.
    pub fn compile(&mut self) -> MetapResult<PassReport> {
        let result = ops::compile(&mut self.module);
        self.record(PassName::Compile, result)
    }

    pub fn dyn_typecheck(&mut self) -> MetapResult<PassReport> {
        let result = dyn_typecheck(&mut self.module);
        self.record(PassName::DynTypecheck, result)
    }

    /// Run one pass with the parameters in `config`.
    pub fn run_pass(&mut self, pass: PassName, config: &PipelineConfig) -> MetapResult<PassReport> {
        let range = &config.range;
        let fname = config.include_fname;
        match pass {
            PassName::LogReturns => self.log_returns(range, fname),
            PassName::LogBreaks => self.log_breaks(range, fname, config.break_strategy),
            PassName::LogContinues => self.log_continues(range, fname, config.break_strategy),
            PassName::LogCalls => self.log_calls(range, fname),
            PassName::LogCallsStartEnd => self.log_calls_start_end(range, fname),
            PassName::LogFuncDefs => self.log_func_defs(range, fname, config.indent),
            PassName::LogIfs => self.log_ifs(range, fname),
            PassName::Compile => self.compile(),
            PassName::DynTypecheck => self.dyn_typecheck(),
        }
    }

    /// Run every pass of `config`, in order. Stops at the first failure.
    pub fn run_config(&mut self, config: &PipelineConfig) -> MetapResult<&PassReport> {
        if config.passes.is_empty() {
            tracing::warn!(input = %self.label, "no passes selected");
        }
        for &pass in &config.passes {
            let _span = tracing::debug_span!("pass", name = pass.as_str()).entered();
            self.run_pass(pass, config)?;
        }
        Ok(&self.report)
    }

    /// Render the program. `import metap` is added when a pass emitted
    /// runtime calls, after the module docstring and any `__future__`
    /// imports.
    pub fn render(&self, indent_unit: &str) -> String {
        if !self.report.uses_runtime {
            return render_module_with_indent(&self.module, indent_unit);
        }
        let mut body = self.module.body.clone();
        let import = Alias {
            name: names::MODULE.to_string(),
            asname: None,
        };
        body.insert(
            import_position(&body),
            Stmt::new(StmtKind::Import(vec![import]), None),
        );
        render_module_with_indent(&Module { body }, indent_unit)
    }

    /// Where [`MetaP::dump`] writes when no output path is given:
    /// `<stem>.metap.py` next to the input, where the stem ends at the
    /// first `.` of the file name.
    pub fn default_output_path(&self) -> PathBuf {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.label));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = name.split('.').next().unwrap_or_default();
        path.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX))
    }

    /// Write the rendered program to `output`, or to
    /// [`MetaP::default_output_path`]. Returns the path written.
    pub fn dump(&self, output: Option<&Path>, indent_unit: &str) -> MetapResult<PathBuf> {
        let target = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output_path());
        fs::write(&target, self.render(indent_unit))
            .map_err(|e| MetapError::io("write", &target, e))?;
        tracing::info!(output = %target.display(), "wrote transformed program");
        Ok(target)
    }
}

/// Index of the first statement that may follow `import metap`.
fn import_position(body: &[Stmt]) -> usize {
    let skip = usize::from(body.first().is_some_and(Stmt::is_docstring));
    let futures = body[skip..]
        .iter()
        .take_while(|stmt| is_future_import(stmt))
        .count();
    skip + futures
}

fn is_future_import(stmt: &Stmt) -> bool {
    matches!(
        &stmt.kind,
        StmtKind::ImportFrom { module: Some(module), level: 0, .. } if module == "__future__"
    )
}

// ============================================================================
// Tests
// ============================================================================
