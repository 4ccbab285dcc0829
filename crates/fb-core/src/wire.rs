//! Wire format: fields as `{ id, type, properties }` records.
//!
//! On the way out every field is flattened into its open property mapping.
//! On the way in the mapping is read back into the typed shape for the
//! field's kind; keys the kind does not own are kept in `Field::extra`.
//! Older documents used `defaultProps` or `props` for the mapping and those
//! names are accepted on input.
//!
//! A form's field sequence travels either as a JSON array under `fields`
//! or as a string-encoded JSON array under `form_data`.

use crate::id::{FieldId, FormId};
use crate::model::{Field, FieldKind, FieldShape, Options, ValidationRule};
use crate::sequence::{FieldSequence, SequenceError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Errors produced while reading or writing the wire format.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("property `{key}` must be {expected}")]
    InvalidProperty { key: String, expected: &'static str },
    #[error("field data must be an array or a string-encoded array")]
    NotAnArray,
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

// Keys every kind owns.
const LABEL: &str = "label";
const REQUIRED: &str = "required";
const VALIDATION_RULE: &str = "validationRule";
// Kind-specific keys.
const PLACEHOLDER: &str = "placeholder";
const OPTIONS: &str = "options";
const FULL_WIDTH: &str = "fullWidth";
/// Legacy name for the option list of a select dropdown.
const DATA: &str = "data";

// ─── Field ⇄ property mapping ────────────────────────────────────────────

impl Field {
    /// The field's configuration as an open key/value mapping.
    pub fn properties(&self) -> Map<String, Value> {
        let mut props = self.extra.clone();
        props.insert(LABEL.into(), Value::String(self.label.clone()));
        props.insert(REQUIRED.into(), Value::Bool(self.required));
        if let Some(rule) = self.validation_rule {
            props.insert(VALIDATION_RULE.into(), Value::String(rule.as_str().into()));
        }
        if let Some(placeholder) = self.placeholder() {
            props.insert(PLACEHOLDER.into(), Value::String(placeholder.into()));
        }
        if let Some(options) = self.options() {
            props.insert(
                OPTIONS.into(),
                Value::Array(options.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(full_width) = self.full_width() {
            props.insert(FULL_WIDTH.into(), Value::Bool(full_width));
        }
        props
    }

    /// Read a field of `kind` back from its property mapping.
    /// Missing keys take empty/false values.
    pub fn from_properties(
        id: FieldId,
        kind: FieldKind,
        mut props: Map<String, Value>,
    ) -> Result<Self, WireError> {
        let label = take_string(&mut props, LABEL)?;
        let required = take_bool(&mut props, REQUIRED)?;
        let validation_rule = take_rule(&mut props)?;

        let shape = match kind {
            FieldKind::Text => FieldShape::Text {
                placeholder: take_string(&mut props, PLACEHOLDER)?,
            },
            FieldKind::Textarea => FieldShape::Textarea {
                placeholder: take_string(&mut props, PLACEHOLDER)?,
            },
            FieldKind::Checkbox => FieldShape::Checkbox,
            FieldKind::Radio => FieldShape::Radio {
                options: take_options(&mut props)?,
            },
            FieldKind::Select => FieldShape::Select {
                placeholder: take_string(&mut props, PLACEHOLDER)?,
                options: take_options(&mut props)?,
            },
            FieldKind::Date => FieldShape::Date {
                placeholder: take_string(&mut props, PLACEHOLDER)?,
            },
            FieldKind::Button => FieldShape::Button {
                full_width: take_bool(&mut props, FULL_WIDTH)?,
            },
        };

        Ok(Self {
            id,
            label,
            required,
            validation_rule,
            shape,
            extra: props,
        })
    }
}

fn take_string(props: &mut Map<String, Value>, key: &str) -> Result<String, WireError> {
    match props.remove(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(key, "a string")),
    }
}

fn take_bool(props: &mut Map<String, Value>, key: &str) -> Result<bool, WireError> {
    match props.remove(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(_) => Err(invalid(key, "a boolean")),
    }
}

fn take_rule(props: &mut Map<String, Value>) -> Result<Option<ValidationRule>, WireError> {
    match props.remove(VALIDATION_RULE) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| invalid(VALIDATION_RULE, "one of none|email|numeric|custom")),
        Some(_) => Err(invalid(VALIDATION_RULE, "a string")),
    }
}

fn take_options(props: &mut Map<String, Value>) -> Result<Options, WireError> {
    let legacy = props.remove(DATA);
    let value = match props.remove(OPTIONS) {
        Some(v) => Some(v),
        None => legacy,
    };
    match value {
        None | Some(Value::Null) => Ok(Options::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(invalid(OPTIONS, "an array of strings")),
            })
            .collect(),
        Some(_) => Err(invalid(OPTIONS, "an array of strings")),
    }
}

fn invalid(key: &str, expected: &'static str) -> WireError {
    WireError::InvalidProperty {
        key: key.to_string(),
        expected,
    }
}

// ─── Serde for Field ─────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct WireField {
    id: FieldId,
    #[serde(rename = "type")]
    kind: FieldKind,
    #[serde(default, alias = "defaultProps", alias = "props")]
    properties: Map<String, Value>,
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireField {
            id: self.id,
            kind: self.kind(),
            properties: self.properties(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireField::deserialize(deserializer)?;
        Field::from_properties(wire.id, wire.kind, wire.properties).map_err(D::Error::custom)
    }
}

// ─── Field sequence encoding ─────────────────────────────────────────────

/// Encode a sequence as the string stored in a form's `form_data`.
pub fn encode_fields(fields: &FieldSequence) -> Result<String, WireError> {
    Ok(serde_json::to_string(fields)?)
}

/// Decode a `form_data` string. An empty string is an empty sequence.
pub fn decode_fields(text: &str) -> Result<FieldSequence, WireError> {
    if text.trim().is_empty() {
        return Ok(FieldSequence::new());
    }
    fields_from_value(serde_json::from_str(text)?)
}

/// Read a sequence from either an array or a string-encoded array.
pub fn fields_from_value(value: Value) -> Result<FieldSequence, WireError> {
    match value {
        Value::Null => Ok(FieldSequence::new()),
        Value::String(text) => decode_fields(&text),
        Value::Array(items) => {
            let fields = items
                .into_iter()
                .map(serde_json::from_value::<Field>)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FieldSequence::from_fields(fields)?)
        }
        _ => Err(WireError::NotAnArray),
    }
}

// ─── Forms ───────────────────────────────────────────────────────────────

/// A persisted, named form document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<FormId>,
    pub title: String,
    pub fields: FieldSequence,
}

impl Form {
    pub fn new(title: impl Into<String>, fields: FieldSequence) -> Self {
        Self {
            id: None,
            title: title.into(),
            fields,
        }
    }
}

/// Server representation; the title and field data have gone by several
/// names.
#[derive(Deserialize)]
struct RawForm {
    #[serde(default)]
    id: Option<FormId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    form_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    fields: Option<Value>,
    #[serde(default)]
    form_data: Option<Value>,
}

impl RawForm {
    fn title(&mut self) -> String {
        [self.title.take(), self.form_name.take(), self.name.take()]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .unwrap_or_default()
    }

    fn into_form(mut self) -> Result<Form, WireError> {
        let title = self.title();
        let data = self.form_data.or(self.fields).unwrap_or(Value::Null);
        Ok(Form {
            id: self.id,
            title,
            fields: fields_from_value(data)?,
        })
    }
}

impl<'de> Deserialize<'de> for Form {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawForm::deserialize(deserializer)?
            .into_form()
            .map_err(D::Error::custom)
    }
}

/// Read a form listing.
///
/// One unreadable entry does not cost the others: an entry whose field data
/// fails to decode is listed by id and title with no fields (fetching it on
/// its own reports the error), and an entry that is not a form at all is
/// skipped.
pub fn forms_from_value(value: Value) -> Result<Vec<Form>, WireError> {
    let Value::Array(items) = value else {
        return Err(WireError::NotAnArray);
    };
    let mut forms = Vec::with_capacity(items.len());
    for item in items {
        let mut raw = match serde_json::from_value::<RawForm>(item) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("skipping unreadable form entry: {e}");
                continue;
            }
        };
        let id = raw.id;
        let title = raw.title();
        raw.title = Some(title.clone());
        match raw.into_form() {
            Ok(form) => forms.push(form),
            Err(e) => {
                log::warn!("form {id:?}: field data unreadable: {e}");
                forms.push(Form {
                    id,
                    title,
                    fields: FieldSequence::new(),
                });
            }
        }
    }
    Ok(forms)
}

/// Body of a save request.
#[derive(Debug, Serialize)]
pub struct SaveRequest<'a> {
    pub title: &'a str,
    pub fields: &'a FieldSequence,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unknown_property_keys_survive() {
        let value = json!({
            "id": 3,
            "type": "text",
            "properties": {"label": "Name", "required": true, "helpText": "as on passport"}
        });
        let field: Field = serde_json::from_value(value).unwrap();
        assert_eq!(field.extra.get("helpText"), Some(&json!("as on passport")));
        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["properties"]["helpText"], json!("as on passport"));
    }

    #[test]
    fn legacy_default_props_and_empty_rule() {
        let value = json!({
            "id": 1700000000000u64,
            "type": "select",
            "defaultProps": {
                "label": "Pick",
                "placeholder": "",
                "required": false,
                "validationRule": "",
                "options": ["a", "b"]
            }
        });
        let field: Field = serde_json::from_value(value).unwrap();
        assert_eq!(field.kind(), FieldKind::Select);
        assert_eq!(field.validation_rule, None);
        assert_eq!(field.options(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn legacy_data_key_reads_as_options() {
        let value = json!({"id": 1, "type": "select", "props": {"data": ["x"]}});
        let field: Field = serde_json::from_value(value).unwrap();
        assert_eq!(field.options(), Some(&["x".to_string()][..]));
    }

    #[test]
    fn bad_property_types_are_rejected() {
        let value = json!({"id": 1, "type": "text", "properties": {"required": "yes"}});
        assert!(serde_json::from_value::<Field>(value).is_err());
        let value = json!({"id": 1, "type": "text", "properties": {"validationRule": "phone"}});
        assert!(serde_json::from_value::<Field>(value).is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let value = json!({"id": 1, "type": "slider", "properties": {}});
        assert!(serde_json::from_value::<Field>(value).is_err());
    }

    #[test]
    fn form_reads_string_encoded_form_data() {
        let value = json!({
            "id": 9,
            "form_name": "Signup",
            "form_data": "[{\"id\":1,\"type\":\"checkbox\",\"properties\":{\"label\":\"Agree\",\"required\":true}}]"
        });
        let form: Form = serde_json::from_value(value).unwrap();
        assert_eq!(form.id, Some(FormId::new(9)));
        assert_eq!(form.title, "Signup");
        assert_eq!(form.fields.len(), 1);
        assert!(form.fields.get(0).unwrap().required);
    }

    #[test]
    fn form_without_field_data_is_empty() {
        let form: Form = serde_json::from_value(json!({"id": 2, "title": "Blank"})).unwrap();
        assert!(form.fields.is_empty());
        let form: Form =
            serde_json::from_value(json!({"id": 2, "title": "Blank", "form_data": ""})).unwrap();
        assert!(form.fields.is_empty());
    }

    #[test]
    fn duplicate_ids_on_the_wire_are_rejected() {
        let text = r#"[{"id":1,"type":"text"},{"id":1,"type":"date"}]"#;
        assert!(matches!(
            decode_fields(text),
            Err(WireError::Sequence(SequenceError::DuplicateId(_)))
        ));
    }

    #[test]
    fn one_bad_form_does_not_hide_the_listing() {
        let listing = json!([
            {"id": 1, "title": "Good", "form_data": "[{\"id\":5,\"type\":\"text\"}]"},
            {"id": 2, "title": "Clashing", "form_data": "[{\"id\":7,\"type\":\"text\"},{\"id\":7,\"type\":\"date\"}]"},
            "not a form"
        ]);
        assert!(serde_json::from_value::<Vec<Form>>(listing.clone()).is_err());

        let forms = forms_from_value(listing).unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].fields.len(), 1);
        assert_eq!(forms[1].id, Some(FormId::new(2)));
        assert_eq!(forms[1].title, "Clashing");
        assert!(forms[1].fields.is_empty());
    }

    #[test]
    fn non_array_field_data_is_rejected() {
        assert!(matches!(
            fields_from_value(json!({"id": 1})),
            Err(WireError::NotAnArray)
        ));
    }
}
