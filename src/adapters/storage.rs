use crate::domain::ports::ResultSink;
use crate::utils::error::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Checked,
    Available,
}

impl LogKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            LogKind::Checked => "checked.txt",
            LogKind::Available => "available.txt",
        }
    }
}

/// `<base>/<service>/checked.txt` 與 `available.txt`，一行一個字
#[derive(Debug)]
pub struct FileResultSink {
    base_path: PathBuf,
    // 所有 append 經過同一把鎖，避免併發完成的候選字寫出交錯的行
    write_lock: Mutex<()>,
}

impl FileResultSink {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn service_dir(&self, service: &str) -> PathBuf {
        self.base_path.join(service)
    }

    pub fn log_path(&self, service: &str, kind: LogKind) -> PathBuf {
        self.service_dir(service).join(kind.file_name())
    }

    /// 讀取紀錄；檔案不存在視為空
    pub async fn read_log(&self, service: &str, kind: LogKind) -> Result<Vec<String>> {
        let path = self.log_path(service, kind);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    async fn append_line(path: &Path, word: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(format!("{}\n", word).as_bytes()).await?;
        file.sync_data().await?;
        Ok(())
    }
}

impl ResultSink for FileResultSink {
    async fn checked_words(&self, service: &str) -> Result<HashSet<String>> {
        Ok(self
            .read_log(service, LogKind::Checked)
            .await?
            .into_iter()
            .collect())
    }

    async fn record(&self, service: &str, word: &str, available: bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        tokio::fs::create_dir_all(self.service_dir(service)).await?;

        // checked 必須先寫完才寫 available
        Self::append_line(&self.log_path(service, LogKind::Checked), word).await?;
        if available {
            Self::append_line(&self.log_path(service, LogKind::Available), word).await?;
        }

        tracing::debug!("💾 {}: recorded '{}' (available: {})", service, word, available);
        Ok(())
    }
}
