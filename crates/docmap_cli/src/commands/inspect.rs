//! Inspect command implementation.

use docmap_document::{Document, Value};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Document inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// Detected file format (json, cbor).
    pub format: &'static str,
    /// File size in bytes.
    pub file_size: usize,
    /// Size of the canonical CBOR encoding.
    pub cbor_size: usize,
    /// Number of top-level fields.
    pub field_count: usize,
    /// Deepest nesting level, counting the document itself as 1.
    pub max_depth: usize,
    /// Per-field summary.
    pub fields: Vec<FieldSummary>,
}

/// Summary of a single top-level field.
#[derive(Debug, Serialize)]
pub struct FieldSummary {
    /// Field name.
    pub name: String,
    /// Value kind.
    pub kind: &'static str,
    /// Element or field count for arrays and documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub len: Option<usize>,
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Value::Document(doc) => document_depth(doc),
        _ => 0,
    }
}

fn document_depth(document: &Document) -> usize {
    1 + document.iter().map(|(_, v)| depth(v)).max().unwrap_or(0)
}

/// Builds the inspection result for a loaded document.
pub fn inspect(
    path: &Path,
    document: &Document,
    file_size: usize,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let fields = document
        .iter()
        .map(|(name, value)| FieldSummary {
            name: name.to_string(),
            kind: value.kind().name(),
            len: match value {
                Value::Array(items) => Some(items.len()),
                Value::Document(doc) => Some(doc.len()),
                _ => None,
            },
        })
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        format: if super::is_json(path) { "json" } else { "cbor" },
        file_size,
        cbor_size: docmap_document::to_cbor(document)?.len(),
        field_count: document.len(),
        max_depth: document_depth(document),
        fields,
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting {:?}", path);

    if !path.exists() {
        return Err(format!("No document found at {:?}", path).into());
    }

    let (document, file_size) = super::load_document(path)?;
    let result = inspect(path, &document, file_size)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => print_text(&result),
        other => return Err(format!("Unknown format {other:?}, expected text or json").into()),
    }
    Ok(())
}

fn print_text(result: &InspectResult) {
    println!("Document: {}", result.path);
    println!("Format: {}", result.format);
    println!("File size: {} bytes", result.file_size);
    println!("CBOR size: {} bytes", result.cbor_size);
    println!("Fields: {}", result.field_count);
    println!("Max depth: {}", result.max_depth);

    if !result.fields.is_empty() {
        println!();
        let width = result.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        for field in &result.fields {
            match field.len {
                Some(len) => println!("  {:width$}  {} ({len})", field.name, field.kind),
                None => println!("  {:width$}  {}", field.name, field.kind),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmap_document::doc;
    use tempfile::TempDir;

    #[test]
    fn summarizes_fields() {
        let document = doc! {
            "name" => "gizmo",
            "tags" => vec!["a", "b"],
            "child" => doc! { "inner" => doc! { "x" => 1i64 } },
        };
        let result = inspect(Path::new("widget.json"), &document, 10).unwrap();

        assert_eq!(result.format, "json");
        assert_eq!(result.field_count, 3);
        assert_eq!(result.max_depth, 3);
        assert_eq!(result.fields[0].kind, "text");
        assert_eq!(result.fields[1].len, Some(2));
        assert_eq!(result.fields[2].kind, "document");
    }

    #[test]
    fn empty_document_depth() {
        let result = inspect(Path::new("empty.cbor"), &Document::new(), 1).unwrap();
        assert_eq!(result.max_depth, 1);
        assert_eq!(result.format, "cbor");
        assert_eq!(result.cbor_size, 1);
    }

    #[test]
    fn missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir.path().join("missing.cbor"), "text").is_err());
    }

    #[test]
    fn unknown_format_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"a": 1}"#).unwrap();
        assert!(run(&path, "yaml").is_err());
        assert!(run(&path, "json").is_ok());
    }
}
