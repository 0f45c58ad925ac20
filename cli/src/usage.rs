//! Usage text for a schema.

use std::fmt::Write as _;

use switchbind_core::{ParserSettings, Schema};

/// Renders a usage block listing each bindable field as `-name:[example]`.
///
/// Secure fields are left out so their switches are never advertised.
pub fn render_usage(schema: &Schema, settings: &ParserSettings) -> String {
    let id = settings.primary_identifier();
    let mut rows: Vec<(String, String)> = schema
        .bindable_fields(settings.allow_all_properties)
        .filter(|field| !field.kind.is_secure())
        .map(|field| {
            let mut switch = format!("{id}{}", field.switch_name());
            if let Some(example) = &field.example {
                let _ = write!(switch, ":[{example}]");
            }
            let mut about = field.description.clone().unwrap_or_default();
            if field.required {
                if !about.is_empty() {
                    about.push(' ');
                }
                about.push_str("(required)");
            }
            (switch, about)
        })
        .collect();

    let help = settings
        .help_tokens
        .iter()
        .map(|token| format!("{id}{token}"))
        .collect::<Vec<_>>()
        .join(" | ");
    rows.push((help, "Show this help".to_string()));

    let width = rows.iter().map(|(switch, _)| switch.len()).max().unwrap_or(0);
    let mut out = format!("Usage: {} [switches]\n", schema.name);
    if let Some(help_text) = &schema.help_text {
        let _ = writeln!(out, "\n{help_text}");
    }
    out.push('\n');
    for (switch, about) in rows {
        let line = format!("  {switch:<width$}  {about}");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}
