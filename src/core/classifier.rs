use crate::domain::model::{AvailabilityPredicate, HttpResponse, ServiceDescriptor};
use crate::utils::error::ClassificationError;

pub fn classify(
    descriptor: &ServiceDescriptor,
    response: &HttpResponse,
) -> Result<bool, ClassificationError> {
    descriptor.is_available.evaluate(response)
}

/// 讀取 JSON 回應中 `pointer` 位置的欄位，與 `expected` 比較
pub fn json_field(pointer: impl Into<String>, expected: serde_json::Value) -> AvailabilityPredicate {
    let pointer = pointer.into();
    AvailabilityPredicate::new(move |response| {
        let json = response.json.as_ref().ok_or_else(|| {
            ClassificationError::new(format!(
                "response body is not JSON (status {})",
                response.status
            ))
        })?;
        let field = json.pointer(&pointer).ok_or_else(|| {
            ClassificationError::new(format!("response has no field at '{}'", pointer))
        })?;
        Ok(*field == expected)
    })
}

pub fn status_in(codes: Vec<u16>) -> AvailabilityPredicate {
    AvailabilityPredicate::new(move |response| Ok(codes.contains(&response.status)))
}

pub fn body_contains(text: impl Into<String>, negate: bool) -> AvailabilityPredicate {
    let text = text.into();
    AvailabilityPredicate::new(move |response| Ok(response.body.contains(&text) != negate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(predicate: AvailabilityPredicate) -> ServiceDescriptor {
        ServiceDescriptor::new("test", "https://example.com", predicate)
    }

    #[test]
    fn test_json_field_predicate() {
        let descriptor = descriptor(json_field("/available", json!(true)));

        let available = HttpResponse::from_json(200, json!({"available": true}));
        assert!(classify(&descriptor, &available).unwrap());

        let taken = HttpResponse::from_json(200, json!({"available": false}));
        assert!(!classify(&descriptor, &taken).unwrap());
    }

    #[test]
    fn test_json_field_missing_is_classification_error() {
        let descriptor = descriptor(json_field("/available", json!(true)));

        let err = classify(&descriptor, &HttpResponse::from_json(200, json!({}))).unwrap_err();
        assert!(err.message.contains("/available"));

        let err = classify(&descriptor, &HttpResponse::new(502, "bad gateway")).unwrap_err();
        assert!(err.message.contains("not JSON"));
    }

    #[test]
    fn test_nested_pointer() {
        let descriptor = descriptor(json_field("/data/user/exists", json!(false)));
        let response = HttpResponse::from_json(200, json!({"data": {"user": {"exists": false}}}));
        assert!(classify(&descriptor, &response).unwrap());
    }

    #[test]
    fn test_status_predicate() {
        let descriptor = descriptor(status_in(vec![404]));
        assert!(classify(&descriptor, &HttpResponse::new(404, "")).unwrap());
        assert!(!classify(&descriptor, &HttpResponse::new(200, "")).unwrap());
    }

    #[test]
    fn test_body_contains_predicate() {
        let descriptor = descriptor(body_contains("is taken", true));
        assert!(classify(&descriptor, &HttpResponse::new(200, "looks free")).unwrap());
        assert!(!classify(&descriptor, &HttpResponse::new(200, "name is taken")).unwrap());
    }
}
