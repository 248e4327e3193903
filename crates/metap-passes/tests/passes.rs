//! Pass combinations over whole programs.

use metap_ast::{parse_module, render_module, Module};
use metap_core::BreakStrategy;
use metap_passes::ops::{compile, log_breaks, log_calls, log_func_defs, log_ifs, log_returns};
use metap_passes::typecheck::dyn_typecheck;
use metap_passes::{LogOptions, PassReport};

fn parse(src: &str) -> Module {
    parse_module(src).unwrap_or_else(|e| panic!("parse error: {}\n{}", e, src))
}

#[test]
fn add_one_return_logger_end_to_end() {
    let mut module = parse("def add_one(n):\n  return n + 1\n");
    log_returns(&mut module, &LogOptions::default()).unwrap();
    assert_eq!(
        render_module(&module),
        "def add_one(n):\n  return metap.log_ret(n + 1, 'metap::Return(ln=2)')\n"
    );
}

#[test]
fn instrumentation_passes_compose() {
    let src = "\
def is_prime(num):
  if num <= 1:
    return False
  i = 5
  while i * i <= num:
    if num % i == 0:
      break
    i += 6
  return True
";
    let mut module = parse(src);
    let opts = LogOptions::default();
    let mut report = PassReport::default();
    report.merge(log_func_defs(&mut module, &opts, false).unwrap());
    report.merge(log_ifs(&mut module, &opts).unwrap());
    report.merge(log_breaks(&mut module, &opts, BreakStrategy::Splice).unwrap());
    report.merge(log_returns(&mut module, &opts).unwrap());
    assert_eq!(report.rewrites, 6);
    assert!(report.uses_runtime);
    assert_eq!(
        render_module(&module),
        "\
def is_prime(num):
  print('metap::FuncDef(ln=1,func=is_prime)')
  if num <= 1:
    print('metap::If(ln=2)')
    return metap.log_ret(False, 'metap::Return(ln=3)')
  i = 5
  while i * i <= num:
    if num % i == 0:
      print('metap::If(ln=6)')
      print('metap::Break(ln=7)')
      break
    i += 6
  return metap.log_ret(True, 'metap::Return(ln=9)')
"
    );
}

#[test]
fn call_logging_after_compile_skips_runtime_calls() {
    let mut module = parse("if _cvar(line.startswith('# '), c):\n  x = c\n");
    compile(&mut module).unwrap();
    let report = log_calls(&mut module, &LogOptions::default()).unwrap();
    assert_eq!(report.rewrites, 1);
    assert_eq!(
        render_module(&module),
        "if metap._cvar_always(metap.log_call(lambda: line.startswith('# '), \"metap::Call(ln=1,call=line.startswith('# '))\"), metap.relay, 'relay_c'):\n  c = metap.relay['relay_c']\n  x = c\n"
    );
}

#[test]
fn cvar_with_terminal_else() {
    let src = "\
line = '### test'
if _cvar(line.startswith('# '), hlvl, 1):
  x = hlvl
elif _cvar(line.startswith('## '), hlvl, 2):
  x = hlvl
else:
  x = 'hlvl' not in globals()
";
    let mut module = parse(src);
    compile(&mut module).unwrap();
    assert_eq!(
        render_module(&module),
        "\
line = '### test'
if metap._cvar(line.startswith('# '), metap.relay, 'relay_hlvl', 1):
  if 'relay_hlvl' in metap.relay:
    hlvl = metap.relay['relay_hlvl']
  x = hlvl
else:
  if 'relay_hlvl' in metap.relay:
    hlvl = metap.relay['relay_hlvl']
  if metap._cvar(line.startswith('## '), metap.relay, 'relay_hlvl', 2):
    if 'relay_hlvl' in metap.relay:
      hlvl = metap.relay['relay_hlvl']
    x = hlvl
  else:
    if 'relay_hlvl' in metap.relay:
      hlvl = metap.relay['relay_hlvl']
    x = 'hlvl' not in globals()
"
    );
}

#[test]
fn typecheck_then_compile() {
    let src = "\
from typing import Optional, Tuple

def foo(s: int) -> Optional[Tuple[str, int]]:
  if s == 2:
    return '1', 2
  return 4
";
    let mut module = parse(src);
    let report = dyn_typecheck(&mut module).unwrap();
    assert!(report.advisories.is_empty());
    compile(&mut module).unwrap();
    let out = render_module(&module);
    assert!(out.contains("  def _metap_foo(s):\n    if not isinstance(s, int):\n"), "{}", out);
    assert!(
        out.contains("  if not (_metap_ret is None or isinstance(_metap_ret, tuple) and len(_metap_ret) == 2 and isinstance(_metap_ret[0], str) and isinstance(_metap_ret[1], int)):\n"),
        "{}",
        out
    );
}

#[test]
fn reports_serialize() {
    let mut module = parse("d['k']: int = 1\n");
    let report = dyn_typecheck(&mut module).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["advisories"][0]["pass"], "dyn_typecheck");
    assert_eq!(json["advisories"][0]["line"], 1);
}
