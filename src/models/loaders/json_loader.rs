use crate::error::{AppError, AppResult, FileError};
use crate::models::survey::Survey;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载综述
pub async fn load_survey(path: &Path) -> AppResult<Survey> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let survey: Survey = serde_json::from_str(&content).map_err(|e| {
        AppError::File(FileError::JsonFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    tracing::info!(
        "成功加载综述: {} ({} 篇文献, {} 个章节)",
        survey.title,
        survey.papers.len(),
        survey.sections.len()
    );

    Ok(survey)
}

/// 将综述写回 JSON 文件
pub async fn save_survey(path: &Path, survey: &Survey) -> AppResult<()> {
    let content = serde_json::to_string_pretty(survey).map_err(|e| {
        AppError::File(FileError::JsonFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    tracing::info!("综述已写入: {}", path.display());
    Ok(())
}
