use crate::domain::model::InteractionRecord;
use crate::domain::ports::InteractionLog;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tokio::sync::Mutex;

const HEADER: [&str; 4] = ["Participant_ID", "Group", "Input_Text", "AI_Feedback"];

/// 本地 CSV 表格紀錄，每次互動附加一列
#[derive(Debug)]
pub struct CsvLog {
    path: PathBuf,
    // 同一檔案的寫入需序列化
    write_lock: Mutex<()>,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl InteractionLog for CsvLog {
    fn name(&self) -> &str {
        "csv"
    }

    async fn append(&self, record: &InteractionRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        tracing::debug!("📝 Appended interaction to {}", self.path.display());
        Ok(())
    }
}
