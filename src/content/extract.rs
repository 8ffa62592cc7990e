//! Pull a JSON value out of free-form model output

use serde::de::DeserializeOwned;

use super::gemini::GeminiError;

/// Strip markdown fences, slice from the first `{`/`[` to the last matching
/// closer, and deserialize.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, GeminiError> {
    let cleaned = text.replace("```json", "").replace("```JSON", "").replace("```", "");
    let slice = json_slice(&cleaned)
        .ok_or_else(|| GeminiError::Parse("no JSON object or array found".to_string()))?;

    serde_json::from_str(slice).map_err(|e| GeminiError::Parse(e.to_string()))
}

fn json_slice(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        hook: String,
    }

    #[test]
    fn parses_bare_json() {
        let s: Sample = extract_json(r#"{"hook":"Stop scrolling"}"#).unwrap();
        assert_eq!(s.hook, "Stop scrolling");
    }

    #[test]
    fn strips_markdown_fences() {
        let text = "```json\n{\"hook\": \"Wait for it\"}\n```";
        let s: Sample = extract_json(text).unwrap();
        assert_eq!(s.hook, "Wait for it");
    }

    #[test]
    fn ignores_prose_around_json() {
        let text = "Sure! Here are your captions:\n[\"one\", \"two\"]\nLet me know if you need more.";
        let v: Vec<String> = extract_json(text).unwrap();
        assert_eq!(v, vec!["one", "two"]);
    }

    #[test]
    fn object_wins_when_it_comes_first() {
        let text = r#"{"hook":"[bracketed] idea"}"#;
        let s: Sample = extract_json(text).unwrap();
        assert_eq!(s.hook, "[bracketed] idea");
    }

    #[test]
    fn rejects_text_without_json() {
        let err = extract_json::<Sample>("I can't help with that.").unwrap_err();
        assert!(matches!(err, GeminiError::Parse(_)));
    }

    #[test]
    fn rejects_truncated_json() {
        let err = extract_json::<Sample>(r#"{"hook": "cut off"#).unwrap_err();
        assert!(matches!(err, GeminiError::Parse(_)));
    }
}
