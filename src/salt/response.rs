//! Shape check applied to every salt-api response before it is rendered.

use serde_json::{Map, Value};

use crate::error::SaltApiError;

/// Key salt-api puts its per-call results under.
const RESULTS_KEY: &str = "return";
/// Alternate spelling accepted for the results key.
const RESULTS_KEY_ALIAS: &str = "results";

/// A response whose first results entry is a non-empty minion mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    data: Map<String, Value>,
}

impl ValidatedResponse {
    /// Minion ids present in the response, in sorted order.
    pub fn minions(&self) -> Vec<String> {
        let mut minions: Vec<String> = self.data.keys().cloned().collect();
        minions.sort();
        minions
    }

    /// The first results mapping: minion id to that minion's output.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Check, in order: a results key exists; it holds a non-empty list; the
/// list's first element is a mapping with at least one key.
pub fn validate(response: &Value) -> Result<ValidatedResponse, SaltApiError> {
    let object = response
        .as_object()
        .ok_or_else(|| SaltApiError::response("response is not a JSON object"))?;

    let results = object
        .get(RESULTS_KEY)
        .or_else(|| object.get(RESULTS_KEY_ALIAS))
        .ok_or_else(|| SaltApiError::response("missing results key"))?;

    let list = results
        .as_array()
        .ok_or_else(|| SaltApiError::response("results is not a list"))?;

    let first = list
        .first()
        .ok_or_else(|| SaltApiError::response("results list is empty"))?;

    let data = first
        .as_object()
        .ok_or_else(|| SaltApiError::response("first result is not a mapping"))?;

    if data.is_empty() {
        return Err(SaltApiError::response("first result mapping is empty"));
    }

    Ok(ValidatedResponse { data: data.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(value: Value) -> String {
        match validate(&value) {
            Err(SaltApiError::Response { reason }) => reason,
            other => panic!("expected response error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_salt_api_and_results_spellings() {
        let salt = validate(&json!({"return": [{"docker01.local": "ok"}]})).unwrap();
        assert_eq!(salt.minions(), vec!["docker01.local".to_string()]);

        let alias = validate(&json!({"results": [{"docker01.local": "ignored"}]})).unwrap();
        assert_eq!(alias.minions(), vec!["docker01.local".to_string()]);
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert_eq!(reason(json!([1, 2])), "response is not a JSON object");
        assert_eq!(reason(json!({"jid": "123"})), "missing results key");
        assert_eq!(reason(json!({"return": null})), "results is not a list");
        assert_eq!(reason(json!({"return": {"a": 1}})), "results is not a list");
        assert_eq!(reason(json!({"return": "text"})), "results is not a list");
        assert_eq!(reason(json!({"return": []})), "results list is empty");
        assert_eq!(
            reason(json!({"return": ["docker01.local"]})),
            "first result is not a mapping"
        );
        assert_eq!(reason(json!({"return": [{}]})), "first result mapping is empty");
    }

    #[test]
    fn only_the_first_element_is_inspected() {
        let ok = validate(&json!({"return": [{"web01": "up"}, "trailing", 3]})).unwrap();
        assert_eq!(ok.data().get("web01"), Some(&json!("up")));
    }

    #[test]
    fn minions_are_sorted() {
        let ok = validate(&json!({"return": [{"web02": {}, "db01": {}, "web01": {}}]})).unwrap();
        assert_eq!(ok.minions(), vec!["db01", "web01", "web02"]);
    }
}
