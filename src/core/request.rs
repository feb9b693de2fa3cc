use crate::core::template::{resolve_body, resolve_url};
use crate::domain::model::{ConcreteRequest, ServiceDescriptor};
use crate::utils::error::TemplateError;
use url::Url;

/// 依服務描述與候選字組出具體請求。失敗只影響目前的候選字
pub fn build_request(
    descriptor: &ServiceDescriptor,
    word: &str,
) -> Result<ConcreteRequest, TemplateError> {
    let url = resolve_url(descriptor, word)?;
    Url::parse(&url)
        .map_err(|e| TemplateError::new(format!("resolved URL '{}' is invalid: {}", url, e)))?;

    let body = resolve_body(descriptor, word)?;

    Ok(ConcreteRequest {
        url,
        method: descriptor.method.unwrap_or_default(),
        headers: descriptor.headers.clone(),
        body,
        timeout: descriptor.timeout,
    })
}
