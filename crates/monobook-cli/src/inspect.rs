//! One-shot inspection commands: run the extractor or the bootstrap reader
//! over saved input and print what the widget would show.

use std::path::Path;

use anyhow::Context;
use monobook_core::AppConfig;
use monobook_widget::render::render_payload;
use monobook_widget::{normalize, BootstrapSources, Extractor, PayloadSchema, Record};
use serde_json::Value;

fn extractor(config: &AppConfig, schema: PayloadSchema) -> Extractor {
    Extractor::new(schema).with_max_depth(config.max_extract_depth)
}

/// Extract a payload from a JSON file and print it with its rendered view.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON, or if
/// no payload for `schema` is found.
pub(crate) fn run_extract(
    config: &AppConfig,
    path: &Path,
    schema: PayloadSchema,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let record = extractor(config, schema)
        .extract(&value)
        .with_context(|| format!("no {schema} payload found in {}", path.display()))?;
    print_record(config, schema, &record)
}

/// Read a saved page's bootstrap sources and print the payload they carry.
///
/// # Errors
///
/// Returns an error if the page cannot be read or neither source carries a
/// payload for `schema`.
pub(crate) fn run_bootstrap(
    config: &AppConfig,
    html_path: &Path,
    query: Option<&str>,
    schema: PayloadSchema,
) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("failed to read {}", html_path.display()))?;
    let sources = BootstrapSources::from_html(&html, query);
    if sources.element_text.is_none() {
        tracing::info!(page = %html_path.display(), "page has no bootstrap element");
    }

    let record = sources
        .read(&extractor(config, schema))
        .with_context(|| format!("no {schema} payload in bootstrap element or query string"))?;
    print_record(config, schema, &record)
}

fn print_record(config: &AppConfig, schema: PayloadSchema, record: &Record) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    println!();
    print!(
        "{}",
        render_payload(&normalize(schema, record), &config.default_currency)
    );
    Ok(())
}
