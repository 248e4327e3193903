// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests for the metap-ast parser and code generator.
//!
//! Fixtures in `tests/fixtures/` are already in normalized form (two-space
//! indent, single-quoted strings, canonical blank lines), so for them
//! `render(parse(code)) == code`. For arbitrary input the weaker property
//! holds: rendering is idempotent after one normalization.

use difference::assert_diff;
use itertools::Itertools;
use metap_ast::{parse_module, prettify_error, render_module};
use std::path::PathBuf;

/// Helper to visualize whitespace differences in test output
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

fn render(input: &str, label: &str) -> String {
    match parse_module(input) {
        Ok(m) => render_module(&m),
        Err(e) => panic!("{}", prettify_error(&e, input, label)),
    }
}

fn assert_roundtrip(input: &str, label: &str) {
    let generated = render(input, label);
    if generated != input {
        let got = visualize(&generated);
        let expected = visualize(input);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

fn assert_normalizes_stably(input: &str, label: &str) {
    let once = render(input, label);
    let twice = render(&once, label);
    if once != twice {
        let first = visualize(&once);
        let second = visualize(&twice);
        assert_diff!(first.as_ref(), second.as_ref(), "", 0);
    }
}

fn assert_roundtrip_fixture(fixture_name: &str) {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(fixture_name);

    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", fixture_name, e));

    assert_roundtrip(&contents, fixture_name);
}

// =============================================================================
// Fixture-based round-trip tests
// =============================================================================

#[test]
fn roundtrip_fixture_markdown_headings() {
    assert_roundtrip_fixture("markdown_headings.py");
}

#[test]
fn roundtrip_fixture_control_flow() {
    assert_roundtrip_fixture("control_flow.py");
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn normalize_four_space_indent_and_comments() {
    let src = "# header comment\n\n\nimport os  # trailing\n\n\n\ndef f(x):\n    \"\"\"Doc.\"\"\"\n    return x  # done\n";
    assert_eq!(
        render(src, "norm.py"),
        "import os\n\n\ndef f(x):\n  'Doc.'\n  return x\n"
    );
    assert_normalizes_stably(src, "norm.py");
}

#[test]
fn normalize_redundant_parentheses() {
    let src = "x = ((a + b))\ny = (yield)\nz = not (a)\n";
    assert_eq!(render(src, "parens.py"), "x = a + b\ny = yield\nz = not a\n");
}

#[test]
fn normalize_line_continuations() {
    let src = "total = first + \\\n  second\nitems = [\n  1,\n  2,\n]\n";
    assert_eq!(render(src, "cont.py"), "total = first + second\nitems = [1, 2]\n");
}

#[test]
fn normalize_is_stable_for_many_snippets() {
    let snippets = [
        "a = b = c = 0\n",
        "x: int\n",
        "d['k']: int = 2\n",
        "from . import a as b, c\nfrom ..pkg.mod import *\n",
        "global g\nnonlocal_name = 1\n",
        "if (n := len(a)) > 10:\n  pass\n",
        "print(*args, sep='', **kw)\n",
        "x = a if b else c if d else e\n",
        "y = -(-x) ** 2\n",
        "z = s[::2], s[1:-1], s[i]\n",
        "@decorator(arg)\nclass C(Base, metaclass=Meta):\n  pass\n",
        "for k, v in d.items():\n  pass\nelse:\n  pass\n",
        "w = r'\\d+' 'tail'\n",
        "raise ValueError('x') from err\n",
    ];
    for (i, src) in snippets.iter().enumerate() {
        assert_normalizes_stably(src, &format!("snippet_{}.py", i));
    }
}

#[test]
fn line_numbers_survive_normalization() {
    let src = "\n\nx = 1\n\nif x:\n\n  y = 2\n";
    let module = parse_module(src).expect("parse error");
    let lines = module
        .body
        .iter()
        .map(|s| s.line.unwrap_or_default())
        .collect_vec();
    assert_eq!(lines, vec![3, 5]);
}
