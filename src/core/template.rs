use crate::domain::model::{BodyTemplate, ServiceDescriptor, Template};
use crate::utils::error::TemplateError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

pub const WORD_PLACEHOLDER: &str = "{word}";

fn unresolved_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[A-Za-z_][A-Za-z0-9_]*\}").expect("placeholder regex is valid"))
}

pub fn resolve_url(descriptor: &ServiceDescriptor, word: &str) -> Result<String, TemplateError> {
    descriptor.url.resolve(word)
}

/// 展開 body 模板。模板本身不會被修改，每次都產生新的 JSON 物件
pub fn resolve_body(
    descriptor: &ServiceDescriptor,
    word: &str,
) -> Result<Option<Value>, TemplateError> {
    descriptor
        .body
        .as_ref()
        .map(|fields| resolve_fields(fields, word).map(Value::Object))
        .transpose()
}

fn resolve_fields(
    fields: &std::collections::BTreeMap<String, BodyTemplate>,
    word: &str,
) -> Result<Map<String, Value>, TemplateError> {
    let mut resolved = Map::new();
    for (key, node) in fields {
        let value = match node {
            BodyTemplate::Leaf(template) => template.resolve(word).map_err(|e| {
                TemplateError::new(format!("body field '{}': {}", key, e.message))
            })?,
            BodyTemplate::Nested(children) => Value::Object(resolve_fields(children, word)?),
        };
        resolved.insert(key.clone(), value);
    }
    Ok(resolved)
}

/// 把字串中的 `{word}` 換成候選字；留下其他未知佔位符視為錯誤
pub fn render_placeholder(template: &str, word: &str) -> Result<String, TemplateError> {
    let rendered = template.replace(WORD_PLACEHOLDER, word);

    if let Some(leftover) = unresolved_placeholder().find(&rendered) {
        return Err(TemplateError::new(format!(
            "unresolved placeholder {} in '{}'",
            leftover.as_str(),
            template
        )));
    }

    Ok(rendered)
}

pub fn contains_placeholder(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains(WORD_PLACEHOLDER),
        Value::Array(items) => items.iter().any(contains_placeholder),
        _ => false,
    }
}

fn render_value(value: &Value, word: &str) -> Result<Value, TemplateError> {
    match value {
        Value::String(s) if s.contains(WORD_PLACEHOLDER) => {
            render_placeholder(s, word).map(Value::String)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, word))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// 由設定檔字串建立 URL 模板
pub fn url_template(raw: &str) -> Template<String> {
    if raw.contains(WORD_PLACEHOLDER) {
        let raw = raw.to_string();
        Template::derived(move |word: &str| render_placeholder(&raw, word))
    } else {
        Template::Constant(raw.to_string())
    }
}

/// 由設定檔的值建立 body 模板：table 變成巢狀節點，含 `{word}` 的字串或陣列變成 Derived
pub fn body_template(value: &Value) -> BodyTemplate {
    match value {
        Value::Object(map) => BodyTemplate::Nested(
            map.iter()
                .map(|(key, child)| (key.clone(), body_template(child)))
                .collect(),
        ),
        leaf if contains_placeholder(leaf) => {
            let leaf = leaf.clone();
            BodyTemplate::derived(move |word: &str| render_value(&leaf, word))
        }
        leaf => BodyTemplate::constant(leaf.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AvailabilityPredicate;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new(
            "test",
            "https://example.com",
            AvailabilityPredicate::new(|_| Ok(true)),
        )
    }

    #[test]
    fn test_resolve_url_constant_and_derived() {
        let constant = descriptor();
        assert_eq!(resolve_url(&constant, "ab").unwrap(), "https://example.com");

        let mut derived = descriptor();
        derived.url = Template::derived(|word: &str| Ok(format!("https://example.com/u/{}", word)));
        assert_eq!(resolve_url(&derived, "ab").unwrap(), "https://example.com/u/ab");
    }

    #[test]
    fn test_resolve_body_without_template_is_none() {
        assert_eq!(resolve_body(&descriptor(), "ab").unwrap(), None);
    }

    #[test]
    fn test_resolve_body_nested_leaves_and_template_untouched() {
        let mut inner = BTreeMap::new();
        inner.insert(
            "name".to_string(),
            BodyTemplate::derived(|word: &str| Ok(json!(word.to_uppercase()))),
        );
        inner.insert("tags".to_string(), BodyTemplate::constant(json!(["a", {"b": 1}])));

        let mut body = BTreeMap::new();
        body.insert(
            "username".to_string(),
            BodyTemplate::derived(|word: &str| Ok(json!([word]))),
        );
        body.insert("profile".to_string(), BodyTemplate::Nested(inner));
        body.insert("version".to_string(), BodyTemplate::constant(2));

        let descriptor = descriptor().with_body(body);

        let first = resolve_body(&descriptor, "ab").unwrap().unwrap();
        assert_eq!(
            first,
            json!({
                "username": ["ab"],
                "profile": {"name": "AB", "tags": ["a", {"b": 1}]},
                "version": 2
            })
        );

        // The template still holds functions and resolves freshly for a new word.
        let body = descriptor.body.as_ref().unwrap();
        assert!(matches!(
            body.get("username"),
            Some(BodyTemplate::Leaf(Template::Derived(_)))
        ));
        let second = resolve_body(&descriptor, "cd").unwrap().unwrap();
        assert_eq!(second["username"], json!(["cd"]));
        assert_eq!(second["profile"]["name"], json!("CD"));
    }

    #[test]
    fn test_resolve_body_propagates_template_error() {
        let mut body = BTreeMap::new();
        body.insert(
            "username".to_string(),
            BodyTemplate::derived(|_: &str| Err(TemplateError::new("boom"))),
        );
        let descriptor = descriptor().with_body(body);

        let err = resolve_body(&descriptor, "ab").unwrap_err();
        assert!(err.message.contains("username"));
        assert!(err.message.contains("boom"));
    }

    #[test]
    fn test_render_placeholder() {
        assert_eq!(
            render_placeholder("https://x.io/{word}?q={word}", "ab").unwrap(),
            "https://x.io/ab?q=ab"
        );
        assert!(render_placeholder("https://x.io/{user}", "ab").is_err());
    }

    #[test]
    fn test_body_template_from_config_value() {
        let raw = json!({
            "username": ["{word}"],
            "meta": {"source": "cli", "handle": "@{word}"},
            "limit": 1
        });
        let fields = match body_template(&raw) {
            BodyTemplate::Nested(fields) => fields,
            other => panic!("expected nested template, got {:?}", other),
        };
        assert!(matches!(
            fields.get("limit"),
            Some(BodyTemplate::Leaf(Template::Constant(_)))
        ));

        let descriptor = descriptor().with_body(fields);
        let resolved = resolve_body(&descriptor, "ab").unwrap().unwrap();
        assert_eq!(
            resolved,
            json!({
                "username": ["ab"],
                "meta": {"source": "cli", "handle": "@ab"},
                "limit": 1
            })
        );
    }

    #[test]
    fn test_url_template_from_config_string() {
        assert!(matches!(url_template("https://x.io"), Template::Constant(_)));
        let template = url_template("https://x.io/users/{word}");
        assert_eq!(template.resolve("ab").unwrap(), "https://x.io/users/ab");
    }
}
