use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a front-matter block could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontMatterError {
    /// The first line is not `---`.
    #[error("no front matter: first line is not `---`")]
    MissingOpening,
    /// The opening `---` is never closed.
    #[error("front matter is never closed with `---`")]
    Unterminated,
    /// The block holds no lines.
    #[error("front matter block is empty")]
    Empty,
    /// The YAML failed to parse, or parsed to something other than a mapping.
    #[error("malformed front matter: {0}")]
    Malformed(String),
}

/// Extract YAML front matter from markdown content. The block closes at the
/// first `---` (or `...`) line.
pub fn extract_frontmatter(input: &str) -> Result<BTreeMap<String, Value>, FrontMatterError> {
    let mut lines = input.lines();

    // First line must be "---" (with optional BOM)
    let first = lines
        .next()
        .ok_or(FrontMatterError::MissingOpening)?
        .trim_start_matches('\u{feff}')
        .trim_end();
    if first != "---" {
        return Err(FrontMatterError::MissingOpening);
    }

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut closed = false;

    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml_lines.push(line);
    }

    if !closed {
        return Err(FrontMatterError::Unterminated);
    }
    if yaml_lines.iter().all(|line| line.trim().is_empty()) {
        return Err(FrontMatterError::Empty);
    }

    let raw_yaml = yaml_lines.join("\n");
    parse_yaml_to_json_map(&raw_yaml)
}

/// Parse a YAML string into a JSON-compatible BTreeMap.
fn parse_yaml_to_json_map(yaml: &str) -> Result<BTreeMap<String, Value>, FrontMatterError> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontMatterError::Malformed(e.to_string()))?;
    let json_value: Value =
        serde_json::to_value(yaml_value).map_err(|e| FrontMatterError::Malformed(e.to_string()))?;

    match json_value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(FrontMatterError::Malformed(format!(
            "expected a key/value mapping, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
