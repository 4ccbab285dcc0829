//! Lint diagnostics for field sequences.
//!
//! Reports structural issues without modifying the form. Findings are
//! advisory: the collection manager logs them before a save but never
//! blocks it.

use crate::id::FieldId;
use crate::model::{Field, FieldKind};
use crate::sequence::FieldSequence;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely a mistake; should be fixed.
    Warning,
    /// Style suggestion.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The field this diagnostic refers to, if any.
    pub field_id: Option<FieldId>,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "empty-label", "duplicate-option").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the sequence and return diagnostics.
#[must_use]
pub fn lint_fields(fields: &FieldSequence) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    for field in fields {
        lint_empty_label(field, &mut diags);
        lint_options(field, &mut diags);
    }
    lint_missing_submit(fields, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_empty_label(field: &Field, diags: &mut Vec<LintDiagnostic>) {
    if field.label.trim().is_empty() {
        diags.push(LintDiagnostic {
            field_id: Some(field.id),
            message: format!("The {} field {} has no label.", field.kind(), field.id),
            severity: LintSeverity::Warning,
            rule: "empty-label",
        });
    }
}

/// Choice fields need options, and each option should be distinct and
/// non-blank.
fn lint_options(field: &Field, diags: &mut Vec<LintDiagnostic>) {
    let Some(options) = field.options() else {
        return;
    };
    if options.is_empty() {
        diags.push(LintDiagnostic {
            field_id: Some(field.id),
            message: format!(
                "`{}` is a {} with nothing to choose from; add an option.",
                field.label,
                field.kind()
            ),
            severity: LintSeverity::Warning,
            rule: "missing-options",
        });
        return;
    }

    let mut seen = HashSet::new();
    for option in options {
        if option.trim().is_empty() {
            diags.push(LintDiagnostic {
                field_id: Some(field.id),
                message: format!("`{}` has a blank option.", field.label),
                severity: LintSeverity::Info,
                rule: "blank-option",
            });
        } else if !seen.insert(option.as_str()) {
            diags.push(LintDiagnostic {
                field_id: Some(field.id),
                message: format!(
                    "`{}` lists option `{option}` more than once.",
                    field.label
                ),
                severity: LintSeverity::Warning,
                rule: "duplicate-option",
            });
        }
    }
}

fn lint_missing_submit(fields: &FieldSequence, diags: &mut Vec<LintDiagnostic>) {
    if !fields.is_empty() && !fields.iter().any(|f| f.kind() == FieldKind::Button) {
        diags.push(LintDiagnostic {
            field_id: None,
            message: "The form has no submit button.".to_string(),
            severity: LintSeverity::Info,
            rule: "missing-submit",
        });
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldShape;

    fn fields(list: Vec<Field>) -> FieldSequence {
        FieldSequence::from_fields(list).unwrap()
    }

    #[test]
    fn lint_empty_label() {
        let mut f = Field::new(FieldId::new(1), FieldKind::Text);
        f.label = "  ".into();
        let diags = lint_fields(&fields(vec![f]));
        assert!(
            diags.iter().any(|d| d.rule == "empty-label"),
            "expected empty-label diagnostic"
        );
    }

    #[test]
    fn lint_missing_and_duplicate_options() {
        let mut empty = Field::new(FieldId::new(1), FieldKind::Radio);
        empty.shape = FieldShape::Radio {
            options: Default::default(),
        };
        let mut dup = Field::new(FieldId::new(2), FieldKind::Select);
        if let FieldShape::Select { options, .. } = &mut dup.shape {
            options.push("Option 1".into());
        }
        let diags = lint_fields(&fields(vec![empty, dup]));
        assert!(diags.iter().any(|d| d.rule == "missing-options"));
        assert!(
            diags
                .iter()
                .any(|d| d.rule == "duplicate-option" && d.field_id == Some(FieldId::new(2)))
        );
    }

    #[test]
    fn lint_missing_submit() {
        let diags = lint_fields(&fields(vec![Field::new(FieldId::new(1), FieldKind::Date)]));
        assert!(diags.iter().any(|d| d.rule == "missing-submit"));
    }

    #[test]
    fn lint_clean_form_no_diags() {
        let diags = lint_fields(&fields(vec![
            Field::new(FieldId::new(1), FieldKind::Text),
            Field::new(FieldId::new(2), FieldKind::Radio),
            Field::new(FieldId::new(3), FieldKind::Button),
        ]));
        assert!(diags.is_empty(), "clean form should have no diagnostics");
    }
}
