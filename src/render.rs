//! Chat text for validated salt-api responses.
//!
//! Templates live under `templates/` and are compiled in by askama.

use askama::Template;
use serde_json::Value;

use crate::salt::{CommandArgs, TargetKind, ValidatedResponse};

/// One minion's output, flattened to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutput {
    pub name: String,
    pub output: String,
}

#[derive(Template)]
#[template(path = "minions.txt", escape = "none")]
struct MinionsTemplate {
    minions: Vec<String>,
}

#[derive(Template)]
#[template(path = "glob.txt", escape = "none")]
struct GlobTemplate<'a> {
    minions: Vec<String>,
    data: Vec<NodeOutput>,
    command: &'a str,
    target: &'a str,
}

#[derive(Template)]
#[template(path = "grain.txt", escape = "none")]
struct GrainTemplate<'a> {
    minions: Vec<String>,
    data: Vec<NodeOutput>,
    command: &'a str,
    target: &'a str,
}

/// Render the minion list for `minions`.
pub fn render_minions(response: &ValidatedResponse) -> Result<String, askama::Error> {
    MinionsTemplate {
        minions: response.minions(),
    }
    .render()
}

/// Render per-minion command output for a glob or grain run.
pub fn render_run(
    kind: TargetKind,
    response: &ValidatedResponse,
    args: &CommandArgs,
) -> Result<String, askama::Error> {
    let minions = response.minions();
    let data = node_outputs(response);

    match kind {
        TargetKind::Glob => GlobTemplate {
            minions,
            data,
            command: args.command(),
            target: args.target(),
        }
        .render(),
        TargetKind::Grain => GrainTemplate {
            minions,
            data,
            command: args.command(),
            target: args.target(),
        }
        .render(),
    }
}

/// Minion outputs in minion-id order.
pub fn node_outputs(response: &ValidatedResponse) -> Vec<NodeOutput> {
    response
        .minions()
        .into_iter()
        .map(|name| {
            let output = response
                .data()
                .get(&name)
                .map(output_text)
                .unwrap_or_default();
            NodeOutput { name, output }
        })
        .collect()
}

/// Strings render as-is; anything structured is pretty-printed JSON.
fn output_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
