//! Commands that never touch the network

use crate::Context;
use anyhow::Context as _;
use fb_core::{LintSeverity, PALETTE, decode_fields, lint_fields};
use serde::Serialize;

pub fn palette(ctx: &Context) -> anyhow::Result<()> {
    ctx.format.print(&PALETTE, |item| {
        vec![item.kind.as_str().to_string(), item.label.to_string()]
    });
    Ok(())
}

#[derive(Serialize)]
struct LintRow {
    field: Option<String>,
    severity: &'static str,
    rule: &'static str,
    message: String,
}

pub fn lint(ctx: &Context, file: &str) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let fields = decode_fields(&raw).with_context(|| format!("parsing {file}"))?;
    let rows: Vec<LintRow> = lint_fields(&fields)
        .into_iter()
        .map(|d| LintRow {
            field: d.field_id.map(|id| id.to_string()),
            severity: match d.severity {
                LintSeverity::Warning => "warning",
                LintSeverity::Info => "info",
            },
            rule: d.rule,
            message: d.message,
        })
        .collect();

    if rows.is_empty() {
        log::info!("{file}: {} fields, no findings", fields.len());
    }
    ctx.format.print(&rows, |r| {
        vec![
            r.field.clone().unwrap_or_else(|| "-".into()),
            r.severity.to_string(),
            r.rule.to_string(),
            r.message.clone(),
        ]
    });
    Ok(())
}

#[derive(Serialize)]
struct ConfigRow {
    base_url: String,
    timeout_secs: u64,
    token: Option<String>,
}

pub fn show_config(ctx: &Context) -> anyhow::Result<()> {
    let row = ConfigRow {
        base_url: ctx.config.base_url.clone(),
        timeout_secs: ctx.config.timeout_secs,
        token: ctx.token.as_deref().map(mask),
    };
    ctx.format.print(std::slice::from_ref(&row), |r| {
        vec![
            r.base_url.clone(),
            r.timeout_secs.to_string(),
            r.token.clone().unwrap_or_else(|| "(not logged in)".into()),
        ]
    });
    Ok(())
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".into();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
