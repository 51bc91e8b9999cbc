//! CLI command implementations.

pub mod decode;
pub mod encode;
pub mod inspect;

use docmap_document::Document;
use std::io::Write;
use std::path::Path;

/// Reads a document, as JSON if the file ends in `.json` and as CBOR
/// otherwise. Returns the document and the size of the file.
pub fn load_document(path: &Path) -> Result<(Document, usize), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let document = if is_json(path) {
        serde_json::from_slice(&bytes)?
    } else {
        docmap_document::from_cbor(&bytes)?
    };
    Ok((document, bytes.len()))
}

/// Returns true if `path` has a `.json` extension.
pub fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Writes `bytes` to `output`, or to stdout if no path is given.
pub fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
