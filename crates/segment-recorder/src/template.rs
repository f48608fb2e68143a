//! `{name}` placeholder substitution for external command arguments.

/// Replace every `{name}` in `template` with its value from `values`.
///
/// Returns the first unknown placeholder name as the error. Text without
/// braces passes through unchanged, and an unterminated `{` is kept
/// literally.
pub(crate) fn render(template: &str, values: &[(&str, &str)]) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };

        let name = &after[..close];
        let value = values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| name.to_string())?;
        out.push_str(value);
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Render every argument of a template list.
pub(crate) fn render_all(
    templates: &[String],
    values: &[(&str, &str)],
) -> Result<Vec<String>, String> {
    templates.iter().map(|t| render(t, values)).collect()
}
