use serde_json::Value;
use std::io::{self, Read};

/// Structured input piped on stdin: a loan request, a quote pair, or a
/// client row exported from the backend.
///
/// JSON is tried first, then YAML. Returns None when stdin is a terminal
/// or nothing was piped.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;
    parse_piped(&piped)
}

fn parse_piped(piped: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let body = piped.trim();
    if body.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            log::debug!("stdin: {} bytes of JSON", body.len());
            Ok(Some(value))
        }
        Err(json_err) => {
            let value: Value = serde_yaml::from_str(body).map_err(|yaml_err| {
                format!("stdin is neither JSON ({json_err}) nor YAML ({yaml_err})")
            })?;
            // A bare word parses as a YAML string; that is not structured input.
            if !value.is_object() && !value.is_array() {
                return Err(format!("stdin is not JSON: {json_err}").into());
            }
            log::debug!("stdin: {} bytes of YAML", body.len());
            Ok(Some(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_absent() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let json = parse_piped(r#"{"principal": "1000", "term_months": 12}"#)
            .unwrap()
            .unwrap();
        let yaml = parse_piped("principal: \"1000\"\nterm_months: 12\n")
            .unwrap()
            .unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn test_plain_text_rejected() {
        assert!(parse_piped("hello").is_err());
    }
}
