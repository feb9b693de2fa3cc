use crate::core::classifier::{body_contains, json_field, status_in};
use crate::core::template::{body_template, render_placeholder, url_template};
use crate::domain::model::{AvailabilityPredicate, HttpMethod, ServiceDescriptor};
use crate::utils::error::{NamecheckError, Result};
use crate::utils::validation::{
    validate_length_bounds, validate_namespace, validate_non_empty_string, validate_positive_number,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub services: Vec<ServiceDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    pub url: String,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub method: Option<HttpMethod>,
    pub headers: Option<BTreeMap<String, String>>,
    pub timeout_seconds: Option<u64>,
    pub body: Option<serde_json::Map<String, serde_json::Value>>,
    pub available_when: AvailabilityRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AvailabilityRule {
    JsonField {
        pointer: String,
        #[serde(default = "default_expected")]
        equals: serde_json::Value,
    },
    Status {
        codes: Vec<u16>,
    },
    BodyContains {
        text: String,
        #[serde(default)]
        negate: bool,
    },
}

fn default_expected() -> serde_json::Value {
    serde_json::Value::Bool(true)
}

impl AvailabilityRule {
    pub fn to_predicate(&self) -> AvailabilityPredicate {
        match self {
            AvailabilityRule::JsonField { pointer, equals } => {
                // 允許直接寫欄位名稱，例如 "available"
                let pointer = if pointer.starts_with('/') {
                    pointer.clone()
                } else {
                    format!("/{}", pointer.replace('.', "/"))
                };
                json_field(pointer, equals.clone())
            }
            AvailabilityRule::Status { codes } => status_in(codes.clone()),
            AvailabilityRule::BodyContains { text, negate } => body_contains(text.clone(), *negate),
        }
    }
}

impl ServicesConfig {
    /// 從 TOML 檔案載入服務列表
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NamecheckError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析服務列表
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${API_KEY})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn find(&self, name: &str) -> Result<&ServiceDefinition> {
        self.services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| NamecheckError::UnknownServiceError {
                name: name.to_string(),
            })
    }

    pub fn descriptor(&self, name: &str) -> Result<ServiceDescriptor> {
        self.find(name)?.to_descriptor()
    }
}

impl ServiceDefinition {
    pub fn to_descriptor(&self) -> Result<ServiceDescriptor> {
        self.validate()?;

        let mut descriptor = ServiceDescriptor::new(
            self.name.clone(),
            url_template(&self.url),
            self.available_when.to_predicate(),
        )
        .with_length_bounds(self.min_length, self.max_length);

        descriptor.method = self.method;
        descriptor.headers = self.headers.clone().unwrap_or_default();
        descriptor.timeout = self.timeout_seconds.map(Duration::from_secs);
        descriptor.body = self.body.as_ref().map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), body_template(value)))
                .collect()
        });

        Ok(descriptor)
    }
}

impl Validate for ServiceDefinition {
    fn validate(&self) -> Result<()> {
        validate_namespace("services.name", &self.name)?;

        // 用一個示範字展開，檢查 URL 形式與佔位符
        let sample_url = render_placeholder(&self.url, "sample").map_err(|e| {
            NamecheckError::InvalidConfigValueError {
                field: format!("services.{}.url", self.name),
                value: self.url.clone(),
                reason: e.message,
            }
        })?;
        validate_url(&format!("services.{}.url", self.name), &sample_url)?;

        validate_length_bounds(
            &format!("services.{}.min_length/max_length", self.name),
            self.min_length,
            self.max_length,
        )?;

        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number(
                &format!("services.{}.timeout_seconds", self.name),
                timeout as usize,
                1,
            )?;
        }

        match &self.available_when {
            AvailabilityRule::JsonField { pointer, .. } => {
                validate_non_empty_string(
                    &format!("services.{}.available_when.pointer", self.name),
                    pointer,
                )?;
            }
            AvailabilityRule::Status { codes } if codes.is_empty() => {
                return Err(NamecheckError::MissingConfigError {
                    field: format!("services.{}.available_when.codes", self.name),
                });
            }
            AvailabilityRule::BodyContains { text, .. } => {
                validate_non_empty_string(
                    &format!("services.{}.available_when.text", self.name),
                    text,
                )?;
            }
            AvailabilityRule::Status { .. } => {}
        }

        Ok(())
    }
}

impl Validate for ServicesConfig {
    fn validate(&self) -> Result<()> {
        if self.services.is_empty() {
            return Err(NamecheckError::MissingConfigError {
                field: "services".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            service.validate()?;
            if !seen.insert(service.name.as_str()) {
                return Err(NamecheckError::InvalidConfigValueError {
                    field: "services.name".to_string(),
                    value: service.name.clone(),
                    reason: "Service names must be unique".to_string(),
                });
            }
        }

        Ok(())
    }
}
