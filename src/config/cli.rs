use crate::core::Storage;
use crate::utils::error::{Result, WtError};
use std::path::PathBuf;
use tokio::fs::{self, File};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

/// 檔名來自伺服器回應，只保留最後一段，避免寫到輸出目錄之外
pub fn sanitize_file_name(name: &str) -> Result<String> {
    let normalized = name.replace('\\', "/");
    let candidate = normalized.rsplit('/').next().unwrap_or_default().trim();

    if candidate.is_empty() || candidate == "." || candidate == ".." || candidate.contains('\0') {
        return Err(WtError::ResponseFormatError {
            message: format!("unusable recording file name {:?}", name),
        });
    }

    Ok(candidate.to_string())
}

impl Storage for LocalStorage {
    async fn create_file(&self, name: &str) -> Result<(PathBuf, File)> {
        let file_name = sanitize_file_name(name)?;
        fs::create_dir_all(&self.base_path).await?;

        let full_path = self.base_path.join(file_name);
        let file = File::create(&full_path).await?;
        Ok((full_path, file))
    }
}
