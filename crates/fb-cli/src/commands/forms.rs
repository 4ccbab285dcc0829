//! Form collection commands

use super::{parse_form_id, report};
use crate::{Context, FormCommands};
use anyhow::Context as _;
use fb_client::RestBackend;
use fb_core::{Field, Form, decode_fields};
use fb_editor::FormCollection;
use serde::Serialize;

#[derive(Serialize)]
struct FormRow {
    id: Option<String>,
    title: String,
    fields: usize,
}

impl From<&Form> for FormRow {
    fn from(form: &Form) -> Self {
        Self {
            id: form.id.map(|id| id.to_string()),
            title: form.title.clone(),
            fields: form.fields.len(),
        }
    }
}

#[derive(Serialize)]
struct FieldRow {
    id: String,
    kind: &'static str,
    label: String,
    required: bool,
    validation: Option<&'static str>,
}

impl From<&Field> for FieldRow {
    fn from(field: &Field) -> Self {
        Self {
            id: field.id.to_string(),
            kind: field.kind().as_str(),
            label: field.display_label(),
            required: field.required,
            validation: field.validation_rule.map(|r| r.as_str()),
        }
    }
}

pub async fn handle(action: FormCommands, ctx: &Context) -> anyhow::Result<()> {
    let backend = ctx.backend()?;
    let mut session = ctx.session(&backend).await?;
    let mut forms = FormCollection::new(backend);

    match action {
        FormCommands::List => {
            let ok = forms.load(&mut session).await;
            report(forms.notifications_mut(), ok)?;
            let rows: Vec<FormRow> = forms.forms().iter().map(FormRow::from).collect();
            ctx.format.print(&rows, |r| {
                vec![
                    r.id.clone().unwrap_or_else(|| "-".into()),
                    r.title.clone(),
                    r.fields.to_string(),
                ]
            });
        }
        FormCommands::Show { id } => {
            let id = parse_form_id(&id)?;
            let ok = forms.select_form(&mut session, id).await;
            report(forms.notifications_mut(), ok)?;
            println!("# {}", forms.title());
            print_fields(ctx, &forms);
        }
        FormCommands::New => {
            let created = forms.add_form(&mut session).await;
            report(forms.notifications_mut(), created.is_some())?;
            if let Some(id) = created {
                println!("{id}\t{}", forms.title());
            }
        }
        FormCommands::Save { id, file, title } => {
            let id = parse_form_id(&id)?;
            let raw = std::fs::read_to_string(&file).with_context(|| format!("reading {file}"))?;
            let fields = decode_fields(&raw).with_context(|| format!("parsing {file}"))?;

            let ok = forms.select_form(&mut session, id).await;
            report(forms.notifications_mut(), ok)?;
            forms.canvas_mut().load(fields);
            if let Some(title) = title {
                forms.rename_selected(title);
            }
            let ok = forms.save_form(&mut session).await;
            report(forms.notifications_mut(), ok)?;
        }
        FormCommands::Delete { id } => {
            let id = parse_form_id(&id)?;
            let ok = forms.remove_form(&mut session, id).await;
            report(forms.notifications_mut(), ok)?;
        }
    }
    Ok(())
}

fn print_fields(ctx: &Context, forms: &FormCollection<RestBackend>) {
    let rows: Vec<FieldRow> = forms.fields().iter().map(FieldRow::from).collect();
    ctx.format.print(&rows, |r| {
        vec![
            r.id.clone(),
            r.kind.to_string(),
            r.label.clone(),
            if r.required { "required".into() } else { String::new() },
            r.validation.unwrap_or_default().to_string(),
        ]
    });
}
