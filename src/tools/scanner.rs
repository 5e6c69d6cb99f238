//! 资源解析与文件扫描模块
//!
//! 将命令行输入解析为待加载的音频文件列表：相对路径以资源目录为基准，
//! 目录递归扫描受支持的扩展名。

use super::cli::AppConfig;
use super::constants::assets;
use crate::audio::FormatSupport;
use crate::{AudioError, AudioResult};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 将单个输入解析为实际路径
///
/// 绝对路径原样返回；相对路径优先在资源目录下查找，不存在时按当前目录解释。
pub fn resolve_asset_path(assets_dir: &Path, input: &Path) -> PathBuf {
    if input.is_absolute() {
        return input.to_path_buf();
    }

    let in_assets = assets_dir.join(input);
    if in_assets.exists() {
        in_assets
    } else {
        input.to_path_buf()
    }
}

/// 递归扫描目录中的受支持音频文件（按路径排序）
pub fn scan_audio_files(dir_path: &Path, support: &FormatSupport) -> AudioResult<Vec<PathBuf>> {
    if !dir_path.is_dir() {
        return Err(AudioError::InvalidInput(format!(
            "路径不是目录: {}",
            dir_path.display()
        )));
    }

    let mut audio_files = Vec::new();
    for entry in WalkDir::new(dir_path).follow_links(true) {
        let entry = entry.map_err(|e| {
            AudioError::IoError(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("目录遍历失败")),
            )
        })?;

        if entry.file_type().is_file() && support.supports(entry.path()) {
            audio_files.push(entry.into_path());
        }
    }

    audio_files.sort();
    debug!(
        "扫描 {} 找到 {} 个文件",
        dir_path.display(),
        audio_files.len()
    );
    Ok(audio_files)
}

/// 根据配置收集所有待加载文件
///
/// 未指定输入时返回资源目录中的默认资源（即使不存在，由加载流程报告错误）。
pub fn collect_inputs(config: &AppConfig, support: &FormatSupport) -> AudioResult<Vec<PathBuf>> {
    if config.inputs.is_empty() {
        return Ok(vec![config.assets_dir.join(assets::DEFAULT_ASSET_NAME)]);
    }

    let mut files = Vec::new();
    for input in &config.inputs {
        let resolved = resolve_asset_path(&config.assets_dir, input);
        if resolved.is_dir() {
            files.extend(scan_audio_files(&resolved, support)?);
        } else {
            files.push(resolved);
        }
    }
    Ok(files)
}
