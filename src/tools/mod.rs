//! 工具模块集合
//!
//! 包含CLI、资源解析、输出协作者与格式化，支持main.rs的流程控制。

pub mod cli;
pub mod constants;
pub mod formatter;
pub mod output;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use cli::{AppConfig, OutputMode, parse_args, parse_args_from, show_startup_info};
pub use formatter::build_summary_table;
pub use output::{AudioOutput, ConsoleOutput, JsonOutput, WavExportOutput, indexed_export_path};
pub use scanner::{collect_inputs, resolve_asset_path, scan_audio_files};
