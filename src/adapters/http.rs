use crate::domain::model::{ConcreteRequest, HttpMethod, HttpResponse};
use crate::domain::ports::RequestExecutor;
use crate::utils::error::Result;
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("namecheck/", env!("CARGO_PKG_VERSION"));

/// 以 reqwest 發出請求，沒有重試
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

#[async_trait::async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &ConcreteRequest) -> Option<HttpResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!("📡 {} {}", request.method, request.url);

        // 4xx/5xx 仍然是有效回應，很多服務用 404 表示名稱可用
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("📡 no response from {}: {}", request.url, e);
                return None;
            }
        };

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("⚠️ failed to read body from {}: {}", request.url, e);
                String::new()
            }
        };

        tracing::debug!("📡 {} responded with status {}", request.url, status);

        Some(HttpResponse {
            status,
            headers,
            json: serde_json::from_str(&body).ok(),
            body,
        })
    }
}
