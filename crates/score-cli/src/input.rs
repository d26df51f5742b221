use std::io::{self, Read};
use std::path::Path;

/// Read report text from a file, or from stdin when the path is absent or
/// `-`.
pub fn read_text(source: Option<&Path>) -> io::Result<String> {
    match source {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parse a `FIELD=VALUE` command line answer. The value is kept raw and
/// parsed against the field's domain later.
pub fn parse_answer_arg(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field id in '{raw}'"));
    }
    Ok((field.to_string(), value.trim().to_string()))
}
