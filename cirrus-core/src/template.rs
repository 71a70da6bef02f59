//! Identifier templating: `{{field}}` substitution into URL templates.

use crate::attrs::AttributeSet;
use crate::error::{ReconcileError, Result};
use crate::schema::ResourceSchema;

/// Substitute every `{{field}}` placeholder in `template` with the
/// field's value from `attrs`, falling back to the schema default.
///
/// Substitution is a single left-to-right pass: placeholders introduced
/// by field values are copied through literally, never re-expanded.
///
/// Fails with `MissingField` when a referenced path is absent and has
/// no default, and with `Validation` when the value is not a scalar.
pub fn render(template: &str, schema: &ResourceSchema, attrs: &AttributeSet) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or_else(|| {
            ReconcileError::Validation(format!("unclosed placeholder in template `{template}`"))
        })?;
        let path = after[..close].trim();
        let value = match attrs.get(path) {
            Some(v) => v.clone(),
            None => schema
                .spec_for_path(path)
                .and_then(|s| s.default.clone())
                .ok_or_else(|| ReconcileError::MissingField {
                    path: path.to_string(),
                    context: format!("identifier template `{template}`"),
                })?,
        };
        let rendered = value.render().ok_or_else(|| {
            ReconcileError::Validation(format!(
                "field `{path}` is a {} and cannot appear in an identifier",
                value.kind_name()
            ))
        })?;
        out.push_str(&rendered);
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
