//! 结果格式化模块
//!
//! 多文件加载结束后输出汇总表格。

use super::utils;
use crate::audio::PlayableClip;
use crate::error::{AudioResult, ErrorCategory};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use std::path::PathBuf;

/// 构建加载结果汇总表
pub fn build_summary_table(results: &[(PathBuf, AudioResult<PlayableClip>)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "File / 文件",
        "Rate / 采样率",
        "Ch / 声道",
        "Frames / 帧数",
        "Duration / 时长",
        "Status / 状态",
    ]);

    for (path, result) in results {
        let name = utils::extract_filename_lossy(path);
        match result {
            Ok(clip) => {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(clip.sample_rate()).set_alignment(CellAlignment::Right),
                    Cell::new(clip.channels()).set_alignment(CellAlignment::Right),
                    Cell::new(clip.frame_count()).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{:.3}s", clip.duration_seconds()))
                        .set_alignment(CellAlignment::Right),
                    Cell::new("OK"),
                ]);
            }
            Err(e) => {
                let category = ErrorCategory::from_audio_error(e);
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("FAIL [{}]", category.display_name())),
                ]);
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AudioError;
    use crate::audio::AudioDescriptor;

    #[test]
    fn test_table_lists_successes_and_failures() {
        let desc = AudioDescriptor::from_geometry(32, 8000, 2).unwrap();
        let clip = PlayableClip::new("a", desc, vec![0.0; 32]).unwrap();
        let results = vec![
            (PathBuf::from("dir/ok.m4a"), Ok(clip)),
            (
                PathBuf::from("dir/missing.m4a"),
                Err(AudioError::OpenOrDecodeFailed {
                    path: PathBuf::from("dir/missing.m4a"),
                    reason: "not found".to_string(),
                }),
            ),
        ];

        let rendered = build_summary_table(&results).to_string();
        assert!(rendered.contains("ok.m4a"));
        assert!(rendered.contains("8000"));
        assert!(rendered.contains("missing.m4a"));
        assert!(rendered.contains("FAIL"));
    }
}
