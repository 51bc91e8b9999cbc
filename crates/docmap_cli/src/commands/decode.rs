//! Decode command implementation.

use docmap_document::from_cbor;
use std::path::Path;
use tracing::info;

/// Converts CBOR bytes to JSON text.
pub fn decode_to_json(bytes: &[u8], pretty: bool) -> Result<String, Box<dyn std::error::Error>> {
    let document = from_cbor(bytes)?;
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}

/// Runs the decode command.
pub fn run(
    input: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Decoding {:?}", input);

    let bytes = std::fs::read(input)?;
    let mut json = decode_to_json(&bytes, pretty)?;
    json.push('\n');
    super::write_output(output, json.as_bytes())
}
