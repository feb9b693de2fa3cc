use crate::domain::model::ServiceDescriptor;
use crate::domain::ports::ResultSink;
use crate::utils::error::{NamecheckError, Result};
use crate::utils::validation::{validate_file_extension, validate_positive_number};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// 包含上下界的長度限制，`None` 代表不限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LengthBounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthBounds {
    /// 使用者指定的最大長度會取代服務的 max_length，但不能小於 min_length
    pub fn for_service(descriptor: &ServiceDescriptor, max_override: Option<usize>) -> Result<Self> {
        if let (Some(max), Some(min)) = (max_override, descriptor.min_length) {
            if max < min {
                return Err(NamecheckError::InvalidConfigValueError {
                    field: "max_length".to_string(),
                    value: max.to_string(),
                    reason: format!(
                        "must be greater than or equal to the minimum name length ({})",
                        min
                    ),
                });
            }
        }

        Ok(Self {
            min: descriptor.min_length,
            max: max_override.or(descriptor.max_length),
        })
    }

    pub fn accepts(&self, word: &str) -> bool {
        let len = word.chars().count();
        self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max)
    }
}

/// 一次執行要檢查的字與發送間隔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBatch {
    pub words: Vec<String>,
    pub interval: Duration,
}

impl CandidateBatch {
    pub fn new(words: Vec<String>, interval: Duration) -> Result<Self> {
        validate_positive_number("interval_ms", interval.as_millis() as usize, 1)?;
        Ok(Self { words, interval })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub fn normalize_words(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// 過濾長度、排除已檢查過的字與清單內重複的字，保留原順序
pub fn select_unchecked(
    words: Vec<String>,
    bounds: LengthBounds,
    checked: &HashSet<String>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|word| bounds.accepts(word) && !checked.contains(word))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

pub async fn load_candidates<S: ResultSink>(
    sink: &S,
    descriptor: &ServiceDescriptor,
    wordlist: &Path,
    max_override: Option<usize>,
    interval: Duration,
) -> Result<CandidateBatch> {
    validate_file_extension("wordlist", &wordlist.to_string_lossy(), &["txt"])?;
    let bounds = LengthBounds::for_service(descriptor, max_override)?;

    let text = tokio::fs::read_to_string(wordlist).await?;
    let words = normalize_words(&text);
    let checked = sink.checked_words(&descriptor.name).await?;

    let total = words.len();
    let unchecked = select_unchecked(words, bounds, &checked);
    tracing::debug!(
        "📂 {}: {} words in list, {} already checked, {} selected",
        descriptor.name,
        total,
        checked.len(),
        unchecked.len()
    );

    CandidateBatch::new(unchecked, interval)
}
