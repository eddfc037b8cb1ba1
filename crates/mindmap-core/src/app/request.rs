//! 変換リクエストの検証
//!
//! ボディは手動で JSON として解釈する（不正な JSON も 400 `{error}` にするため）。
//! - `markdown`: 必須、文字列
//! - `title` / `filename`: 任意、文字列。空文字は未指定として扱う

use serde_json::Value;

use crate::domain::MindmapError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub markdown: String,
    pub title: Option<String>,
    pub filename: Option<String>,
}

impl ConvertRequest {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            title: None,
            filename: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// 生のリクエストボディを解釈して検証する
    pub fn from_json(body: &[u8]) -> Result<Self, MindmapError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| MindmapError::Validation(format!("invalid JSON body: {e}")))?;
        let Value::Object(fields) = value else {
            return Err(MindmapError::Validation(
                "request body must be a JSON object".to_string(),
            ));
        };

        let markdown = match fields.get("markdown") {
            Some(Value::String(markdown)) => markdown.clone(),
            Some(_) => {
                return Err(MindmapError::Validation(
                    "`markdown` must be a string".to_string(),
                ));
            }
            None => {
                return Err(MindmapError::Validation(
                    "missing required field `markdown`".to_string(),
                ));
            }
        };

        Ok(Self {
            markdown,
            title: optional_string(&fields, "title")?,
            filename: optional_string(&fields, "filename")?,
        })
    }
}

fn optional_string(
    fields: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<String>, MindmapError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(MindmapError::Validation(format!("`{key}` must be a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_all_fields() {
        let req =
            ConvertRequest::from_json(br##"{"markdown":"# A","title":"T","filename":"f"}"##)
                .unwrap();
        assert_eq!(
            req,
            ConvertRequest::new("# A").with_title("T").with_filename("f")
        );
    }

    #[test]
    fn empty_optional_strings_count_as_absent() {
        let req = ConvertRequest::from_json(br#"{"markdown":"x","title":"","filename":""}"#)
            .unwrap();
        assert_eq!(req.title, None);
        assert_eq!(req.filename, None);
    }

    #[test]
    fn empty_markdown_is_accepted() {
        let req = ConvertRequest::from_json(br#"{"markdown":""}"#).unwrap();
        assert_eq!(req.markdown, "");
    }

    #[rstest]
    #[case::not_json(b"not json".as_slice())]
    #[case::array(br#"["markdown"]"#.as_slice())]
    #[case::missing_markdown(br#"{"title":"t"}"#.as_slice())]
    #[case::markdown_not_string(br#"{"markdown":42}"#.as_slice())]
    #[case::title_not_string(br#"{"markdown":"x","title":1}"#.as_slice())]
    #[case::filename_not_string(br#"{"markdown":"x","filename":{"a":1}}"#.as_slice())]
    fn invalid_bodies_are_validation_errors(#[case] body: &[u8]) {
        let err = ConvertRequest::from_json(body).unwrap_err();
        assert!(matches!(err, MindmapError::Validation(_)));
    }
}
