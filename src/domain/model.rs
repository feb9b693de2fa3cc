use crate::utils::error::{CandidateError, ClassificationError, TemplateError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub type DeriveFn<V> = dyn Fn(&str) -> std::result::Result<V, TemplateError> + Send + Sync;
pub type PredicateFn =
    dyn Fn(&HttpResponse) -> std::result::Result<bool, ClassificationError> + Send + Sync;

/// 常數值，或依目前候選字計算出的值
#[derive(Clone)]
pub enum Template<V> {
    Constant(V),
    Derived(Arc<DeriveFn<V>>),
}

impl<V> Template<V> {
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<V, TemplateError> + Send + Sync + 'static,
    {
        Template::Derived(Arc::new(f))
    }
}

impl<V: Clone> Template<V> {
    pub fn resolve(&self, word: &str) -> std::result::Result<V, TemplateError> {
        match self {
            Template::Constant(value) => Ok(value.clone()),
            Template::Derived(f) => f(word),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Template<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Template::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl From<&str> for Template<String> {
    fn from(value: &str) -> Self {
        Template::Constant(value.to_string())
    }
}

impl From<String> for Template<String> {
    fn from(value: String) -> Self {
        Template::Constant(value)
    }
}

/// Request body 模板節點：巢狀 mapping 會被遞迴展開，其餘都是葉節點
#[derive(Debug, Clone)]
pub enum BodyTemplate {
    Leaf(Template<serde_json::Value>),
    Nested(BTreeMap<String, BodyTemplate>),
}

impl BodyTemplate {
    pub fn constant(value: impl Into<serde_json::Value>) -> Self {
        BodyTemplate::Leaf(Template::Constant(value.into()))
    }

    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<serde_json::Value, TemplateError>
            + Send
            + Sync
            + 'static,
    {
        BodyTemplate::Leaf(Template::derived(f))
    }
}

#[derive(Clone)]
pub struct AvailabilityPredicate(Arc<PredicateFn>);

impl AvailabilityPredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HttpResponse) -> std::result::Result<bool, ClassificationError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn evaluate(&self, response: &HttpResponse) -> std::result::Result<bool, ClassificationError> {
        (self.0)(response)
    }
}

impl fmt::Debug for AvailabilityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AvailabilityPredicate(<fn>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(value: HttpMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單一目標服務的查詢方式，載入後唯讀
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: String,
    pub url: Template<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub method: Option<HttpMethod>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<BTreeMap<String, BodyTemplate>>,
    pub timeout: Option<Duration>,
    pub is_available: AvailabilityPredicate,
}

impl ServiceDescriptor {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<Template<String>>,
        is_available: AvailabilityPredicate,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            min_length: None,
            max_length: None,
            method: None,
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
            is_available,
        }
    }

    pub fn with_length_bounds(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: BTreeMap<String, BodyTemplate>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcreteRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub json: Option<serde_json::Value>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let json = serde_json::from_str(&body).ok();
        Self {
            status,
            headers: BTreeMap::new(),
            body,
            json,
        }
    }

    pub fn from_json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: value.to_string(),
            json: Some(value),
        }
    }
}

/// 單一候選字跑完 pipeline 的結果
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub index: usize,
    pub word: String,
    pub response: Option<HttpResponse>,
    pub available: bool,
    pub failed: bool,
    pub error: Option<CandidateError>,
}

/// 每個候選字完成時交給 Reporter 的事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateEvent {
    pub index: usize,
    pub completed: usize,
    pub total: usize,
    pub word: String,
    pub available: bool,
    pub failed: bool,
    pub error_kind: Option<&'static str>,
    pub error_detail: Option<String>,
}

impl CandidateEvent {
    pub fn from_outcome(outcome: &CheckOutcome, completed: usize, total: usize) -> Self {
        Self {
            index: outcome.index,
            completed,
            total,
            word: outcome.word.clone(),
            available: outcome.available,
            failed: outcome.failed,
            error_kind: outcome.error.as_ref().map(CandidateError::kind),
            error_detail: outcome.error.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub service: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed: Duration,
    pub total_checked: usize,
    pub total_failed: usize,
    pub total_available: usize,
    pub available_words: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_is_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("fetch".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::default().as_str(), "GET");
    }

    #[test]
    fn test_template_resolve() {
        let constant: Template<String> = "https://example.com".into();
        assert_eq!(constant.resolve("abc").unwrap(), "https://example.com");

        let derived = Template::derived(|word: &str| Ok(format!("https://example.com/{}", word)));
        assert_eq!(derived.resolve("abc").unwrap(), "https://example.com/abc");
        assert_eq!(format!("{:?}", derived), "Derived(<fn>)");
    }

    #[test]
    fn test_http_response_parses_json_body() {
        let response = HttpResponse::new(200, r#"{"available":true}"#);
        assert_eq!(response.json, Some(serde_json::json!({"available": true})));

        let response = HttpResponse::new(404, "<html>not found</html>");
        assert!(response.json.is_none());
    }
}
