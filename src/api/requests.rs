use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /analyze`.
///
/// `image` is `None` only when the key is absent. A present key keeps its raw
/// value, `null` included, so the handler can tell the two apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Photograph as a base64 data URI, `data:image/jpeg;base64,...`
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use crate::api::requests::AnalyzeRequest;

    #[test]
    fn test_absent_and_null_image_differ() {
        let absent: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(absent.image.is_none());

        let null: AnalyzeRequest = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(null.image, Some(Value::Null));

        let text: AnalyzeRequest = serde_json::from_str(r#"{"image": "data:image/png;base64,AAAA"}"#).unwrap();
        assert_eq!(text.image, Some(Value::String("data:image/png;base64,AAAA".to_string())));
    }
}
