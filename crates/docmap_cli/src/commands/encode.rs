//! Encode command implementation.

use docmap_document::{to_cbor, Document};
use std::path::Path;
use tracing::info;

/// Converts JSON text to CBOR bytes.
pub fn encode_json(json: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let document: Document = serde_json::from_str(json)?;
    Ok(to_cbor(&document)?)
}

/// Runs the encode command.
pub fn run(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    info!("Encoding {:?}", input);

    let json = std::fs::read_to_string(input)?;
    let bytes = encode_json(&json)?;
    super::write_output(output, &bytes)?;

    if let Some(path) = output {
        info!("Wrote {} bytes to {:?}", bytes.len(), path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmap_document::{from_cbor, Value};
    use tempfile::TempDir;

    #[test]
    fn encodes_json_object() {
        let bytes = encode_json(r#"{"name": "gizmo", "n": 2}"#).unwrap();
        let document = from_cbor(&bytes).unwrap();
        assert_eq!(document.get("name"), Some(&Value::from("gizmo")));
        assert_eq!(document.get("n"), Some(&Value::Integer(2)));
    }

    #[test]
    fn rejects_non_object() {
        assert!(encode_json("[1, 2]").is_err());
        assert!(encode_json("not json").is_err());
    }

    #[test]
    fn writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.cbor");
        std::fs::write(&input, r#"{"_id": {"$oid": "507f1f77bcf86cd799439011"}}"#).unwrap();

        run(&input, Some(&output)).unwrap();

        let document = from_cbor(&std::fs::read(&output).unwrap()).unwrap();
        assert!(document.get("_id").and_then(Value::as_object_id).is_some());
    }
}
