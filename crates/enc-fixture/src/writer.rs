//! Renders fixtures in the layout the histogram producers write.

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::fixture::{Fixture, HIST_KEY};
use crate::format::format_general;
use crate::value::Value;

/// Significant digits written for edges, centers and metadata.
pub const AXIS_PRECISION: usize = 6;
/// Significant digits written for histogram values.
pub const HIST_PRECISION: usize = 10;

const RULE: &str = "# ==================================";

/// Target syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Importable Python module using numpy's `np.inf`.
    Python,
    /// Whitespace separated arrays under `(* name *)` markers.
    Mathematica,
}

impl OutputFormat {
    /// Conventional file extension, with the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Python => ".py",
            OutputFormat::Mathematica => ".txt",
        }
    }

    fn number(&self, value: f64, precision: usize) -> String {
        match self {
            OutputFormat::Python => {
                if value.is_nan() {
                    "np.nan".into()
                } else if value == f64::INFINITY {
                    "np.inf".into()
                } else if value == f64::NEG_INFINITY {
                    "-np.inf".into()
                } else {
                    format_general(value, precision)
                }
            }
            OutputFormat::Mathematica => {
                if value.is_nan() {
                    "Indeterminate".into()
                } else if value == f64::INFINITY {
                    "Infinity".into()
                } else if value == f64::NEG_INFINITY {
                    "-Infinity".into()
                } else {
                    format_general(value, precision)
                }
            }
        }
    }

    fn delimiter(&self) -> &'static str {
        match self {
            OutputFormat::Python => ", ",
            OutputFormat::Mathematica => " ",
        }
    }
}

/// Renders a complete fixture file.
pub fn render_fixture(fixture: &Fixture, format: OutputFormat) -> String {
    match format {
        OutputFormat::Python => render_python(fixture),
        OutputFormat::Mathematica => render_mathematica(fixture),
    }
}

/// Renders an axis' edge and center arrays, separated by a blank line.
pub fn render_axis(axis: &Axis, format: OutputFormat) -> String {
    let mut out = String::new();
    match format {
        OutputFormat::Python => {
            python_array(&mut out, &axis.edges_key(), &axis.edges, AXIS_PRECISION);
            out.push('\n');
            python_array(&mut out, &axis.centers_key(), &axis.centers, AXIS_PRECISION);
        }
        OutputFormat::Mathematica => {
            out.push_str(&format!("(* {} *)\n", axis.edges_key()));
            out.push_str(&numbers(&axis.edges, format, AXIS_PRECISION));
            out.push_str(&format!("\n\n(* {} *)\n", axis.centers_key()));
            out.push_str(&numbers(&axis.centers, format, AXIS_PRECISION));
            out.push('\n');
        }
    }
    out
}

fn python_literal(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => python_float(*v),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        Value::Str(s) => python_string(s),
        Value::Tuple(items) if items.len() == 1 => format!("({},)", python_literal(&items[0])),
        Value::Tuple(items) => format!("({})", join(items.iter().map(python_literal), ", ")),
        Value::List(items) => format!("[{}]", join(items.iter().map(python_literal), ", ")),
    }
}

/// Shortest literal that reads back to the same `f64`.
fn python_float(value: f64) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        OutputFormat::Python.number(value, AXIS_PRECISION)
    }
}

fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn join(parts: impl Iterator<Item = String>, sep: &str) -> String {
    parts.collect::<Vec<_>>().join(sep)
}

fn numbers(values: &[f64], format: OutputFormat, precision: usize) -> String {
    join(
        values.iter().map(|v| format.number(*v, precision)),
        format.delimiter(),
    )
}

/// Weights are written `(1)` for a single exponent, as the producers do.
fn weight_literal(weights: &[f64]) -> String {
    format!("({})", numbers(weights, OutputFormat::Python, AXIS_PRECISION))
}

fn python_array(out: &mut String, name: &str, values: &[f64], precision: usize) {
    out.push_str(&format!("{name} = [\n"));
    out.push('\t');
    out.push_str(&numbers(values, OutputFormat::Python, precision));
    out.push_str("\n]\n");
}

fn python_nested(out: &mut String, name: &str, shape: &[usize], values: &[f64]) {
    if shape.len() <= 1 {
        python_array(out, name, values, HIST_PRECISION);
        return;
    }
    out.push_str(&format!("{name} = [\n"));
    let row = values.len() / shape[0].max(1);
    let rows: Vec<String> = values
        .chunks(row.max(1))
        .map(|chunk| format!("\t{}", nested_literal(&shape[1..], chunk)))
        .collect();
    out.push_str(&rows.join(",\n"));
    out.push_str("\n]\n");
}

fn nested_literal(shape: &[usize], values: &[f64]) -> String {
    if shape.len() <= 1 {
        return format!("[{}]", numbers(values, OutputFormat::Python, HIST_PRECISION));
    }
    let row = values.len() / shape[0].max(1);
    format!(
        "[{}]",
        join(
            values.chunks(row.max(1)).map(|chunk| nested_literal(&shape[1..], chunk)),
            ", "
        )
    )
}

fn render_python(fixture: &Fixture) -> String {
    let meta = &fixture.metadata;
    let mut out = String::new();
    out.push_str("import numpy as np\n\n");
    out.push_str(&format!("{RULE}\n# Information\n{RULE}\n"));
    if let Some(invocation) = &fixture.invocation {
        out.push_str(&format!(
            "# Function call ```{} ```\n",
            invocation.to_command_line()
        ));
    }
    out.push('\n');
    out.push_str(&format!("# Number of events:\nn_events = {}\n", meta.n_events));
    out.push_str(&format!(
        "# Process\nenergy = {}\n",
        OutputFormat::Python.number(meta.energy, AXIS_PRECISION)
    ));
    out.push_str(&format!("level = {}\n", python_string(&meta.level)));
    out.push_str(&format!("pid_1, pid_2 = {}, {}\n", meta.pid_1, meta.pid_2));
    out.push_str(&format!(
        "outstate_str = {}\n",
        python_string(&meta.outstate_str)
    ));
    out.push_str(&format!(
        "# Weight information:\nweight = {}\n",
        weight_literal(&meta.weight)
    ));
    let opendata = fixture
        .invocation
        .as_ref()
        .is_some_and(|invocation| invocation.flag("use_opendata"));
    out.push_str(if opendata {
        "# CMS 2011A Jet Dataset:\n"
    } else {
        "# Jet information:\n"
    });
    out.push_str(&format!("jet_alg = {}\n", python_string(&meta.jet_alg)));
    out.push_str(&format!("jet_scheme = {}\n", python_string(&meta.jet_scheme)));
    out.push_str(&format!(
        "jet_rad = {}\n",
        OutputFormat::Python.number(meta.jet_rad, AXIS_PRECISION)
    ));

    if !fixture.extras.is_empty() {
        out.push_str("# Additional information:\n");
        for (name, value) in &fixture.extras {
            out.push_str(&format!("{name} = {}\n", python_literal(value)));
        }
    }

    out.push_str(&format!("\n{RULE}\n# Output Histogram:\n{RULE}\n"));
    for axis in &fixture.axes {
        out.push_str(&render_axis(axis, OutputFormat::Python));
        out.push('\n');
    }
    python_nested(&mut out, HIST_KEY, &fixture.hist.shape, &fixture.hist.values);
    out
}

fn render_mathematica(fixture: &Fixture) -> String {
    let meta = &fixture.metadata;
    let format = OutputFormat::Mathematica;
    let mut out = String::new();
    if let Some(invocation) = &fixture.invocation {
        out.push_str(&format!(
            "(* Function call: {} *)\n",
            invocation.to_command_line()
        ));
    }
    let scalars = [
        ("n_events", meta.n_events.to_string()),
        ("energy", format.number(meta.energy, AXIS_PRECISION)),
        ("level", meta.level.clone()),
        ("pid_1", meta.pid_1.to_string()),
        ("pid_2", meta.pid_2.to_string()),
        ("outstate_str", meta.outstate_str.clone()),
        ("weight", numbers(&meta.weight, format, AXIS_PRECISION)),
        ("jet_alg", meta.jet_alg.clone()),
        ("jet_scheme", meta.jet_scheme.clone()),
        ("jet_rad", format.number(meta.jet_rad, AXIS_PRECISION)),
    ];
    for (name, value) in scalars {
        out.push_str(&format!("(* {name} = {value} *)\n"));
    }
    for axis in &fixture.axes {
        out.push('\n');
        out.push_str(&render_axis(axis, format));
    }
    out.push_str(&format!("\n(* {HIST_KEY} *)\n"));
    let row = fixture.hist.shape.last().copied().unwrap_or(0).max(1);
    for chunk in fixture.hist.values.chunks(row) {
        out.push_str(&numbers(chunk, format, HIST_PRECISION));
        out.push('\n');
    }
    out
}
