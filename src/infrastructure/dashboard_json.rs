// Normalisation of dashboard JSON before it is written to disk
use serde_json::Value;

/// Remove the instance-specific numeric `id` and pretty print with two-space
/// indentation. Key order and number literals are kept as the server sent
/// them so diffs between pulls stay small.
pub fn normalize_dashboard(raw: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    let mut value: Value = serde_json::from_slice(raw)?;
    if let Value::Object(map) = &mut value {
        map.shift_remove("id");
    }

    let mut pretty = serde_json::to_vec_pretty(&value)?;
    pretty.push(b'\n');
    Ok(pretty)
}
