//! 输出目录与 manifest - `<频道>.<标题>` 目录 + source_url.txt

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::core::source::VideoMetadata;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

static INVALID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("invalid regex"));

/// 目录名长度上限，避免超出文件系统限制
const MAX_FOLDER_LEN: usize = 200;

/// 去掉目录名里的非法字符，空格替换为下划线
pub fn sanitize_filename(name: &str) -> String {
    INVALID_CHARS.replace_all(name, "").replace(' ', "_")
}

/// 建立 `<频道>.<标题>` 输出目录并写入 source_url.txt。
/// manifest 已存在时不改动，重复运行保持幂等。
pub fn prepare_output_dir(
    base: &Path,
    url: &str,
    meta: &VideoMetadata,
) -> Result<PathBuf, ManifestError> {
    let folder: String = format!(
        "{}.{}",
        sanitize_filename(&meta.uploader),
        sanitize_filename(&meta.title)
    )
    .chars()
    .take(MAX_FOLDER_LEN)
    .collect();

    let full_path = base.join(folder);
    fs::create_dir_all(&full_path)?;

    let manifest_path = full_path.join("source_url.txt");
    if !manifest_path.exists() {
        fs::write(
            &manifest_path,
            format!(
                "Source: {}\nDate: {}\nChannel: {}\nTitle: {}",
                url, meta.upload_date, meta.uploader, meta.title
            ),
        )?;
        info!("📝 已写入 manifest: {}", manifest_path.display());
    }

    Ok(full_path)
}
