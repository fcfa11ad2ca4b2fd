//! Bundled templates and `{{variable}}` rendering

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Template for the service configuration file; `json` is the effective config
pub const PREVIEW_CONF: &str = "preview.conf";

const PREVIEW_CONF_SOURCE: &str = "{{json}}\n";

/// Source text of a bundled template
pub fn source(name: &str) -> Option<&'static str> {
    match name {
        PREVIEW_CONF => Some(PREVIEW_CONF_SOURCE),
        _ => None,
    }
}

/// Render a bundled template by name
pub fn render(name: &str, variables: &BTreeMap<String, String>) -> Result<String> {
    let text = source(name).ok_or_else(|| Error::UnknownTemplate(name.to_string()))?;
    render_str(name, text, variables)
}

/// Substitute `{{name}}` placeholders in `text`
///
/// Whitespace inside the braces is ignored. An unterminated `{{` is copied
/// through literally.
pub fn render_str(
    template: &str,
    text: &str,
    variables: &BTreeMap<String, String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);

        let name = rest[start + 2..start + 2 + len].trim();
        let value = variables
            .get(name)
            .ok_or_else(|| Error::TemplateVariableMissing {
                template: template.to_string(),
                variable: name.to_string(),
            })?;
        out.push_str(value);

        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    Ok(out)
}
