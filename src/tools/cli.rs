//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::{assets, defaults};
use crate::audio::{DEFAULT_CLIP_NAME, LoaderOptions};
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 剪辑输出方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// 控制台摘要（默认）
    Console,
    /// JSON 摘要
    Json,
    /// 导出为WAV文件
    Wav(PathBuf),
}

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 输入文件或目录（为空时加载默认资源）
    pub inputs: Vec<PathBuf>,

    /// 资源目录，相对输入路径以此为基准解析
    pub assets_dir: PathBuf,

    /// 剪辑名称
    pub clip_name: String,

    /// 输出方式
    pub output: OutputMode,

    /// 解码内存上限（MB）
    pub max_decoded_mb: u64,

    /// 是否显示详细信息
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            assets_dir: PathBuf::from(assets::DEFAULT_ASSETS_DIR),
            clip_name: DEFAULT_CLIP_NAME.to_string(),
            output: OutputMode::Console,
            max_decoded_mb: defaults::MAX_DECODED_MB,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// 转换为加载选项
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            clip_name: self.clip_name.clone(),
            max_decoded_bytes: self.max_decoded_mb.saturating_mul(1024 * 1024),
        }
    }
}

fn build_command() -> Command {
    Command::new("m4a-clip")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("M4A Clip Loader Team")
        .arg(
            Arg::new("INPUT")
                .help("音频文件或目录 (M4A, AAC, ALAC, WAV, FLAC, MP3, OGG)。不指定时加载资源目录中的 unitym4a.m4a")
                .num_args(0..)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("assets")
                .long("assets")
                .short('a')
                .help("资源目录（也可通过 M4A_ASSETS_DIR 设置）")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .help("生成剪辑的名称")
                .value_name("NAME")
                .default_value(DEFAULT_CLIP_NAME),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("以JSON输出剪辑摘要")
                .action(ArgAction::SetTrue)
                .conflicts_with("export"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .short('o')
                .help("将解码结果导出为WAV文件")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("max-mb")
                .long("max-mb")
                .help("解码内存上限（MB）")
                .value_name("MB")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("1024"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息")
                .action(ArgAction::SetTrue),
        )
}

/// 从给定参数解析配置（便于测试）
pub fn parse_args_from<I, T>(args: I) -> Result<AppConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_command().try_get_matches_from(args)?;

    let assets_dir = matches
        .get_one::<PathBuf>("assets")
        .cloned()
        .or_else(|| std::env::var_os(assets::ASSETS_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(assets::DEFAULT_ASSETS_DIR));

    let output = if let Some(path) = matches.get_one::<PathBuf>("export") {
        OutputMode::Wav(path.clone())
    } else if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    Ok(AppConfig {
        inputs: matches
            .get_many::<PathBuf>("INPUT")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        assets_dir,
        clip_name: matches
            .get_one::<String>("name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CLIP_NAME.to_string()),
        output,
        max_decoded_mb: matches
            .get_one::<u64>("max-mb")
            .copied()
            .unwrap_or(defaults::MAX_DECODED_MB),
        verbose: matches.get_flag("verbose"),
    })
}

/// 解析命令行参数并创建配置（参数错误时由clap打印用法并退出）
pub fn parse_args() -> AppConfig {
    parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

/// 显示程序启动信息
pub fn show_startup_info(config: &AppConfig) {
    println!("🚀 M4A Clip Loader v{VERSION}");
    if config.verbose {
        println!("📝 {DESCRIPTION}");
        println!("📁 资源目录 / Assets dir: {}", config.assets_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse_args_from(["m4a-clip", "--assets", "assets"]).unwrap();
        assert!(config.inputs.is_empty());
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.clip_name, DEFAULT_CLIP_NAME);
        assert_eq!(config.output, OutputMode::Console);
        assert_eq!(config.max_decoded_mb, 1024);
        assert!(!config.verbose);
    }

    #[test]
    fn test_multiple_inputs_and_export() {
        let config = parse_args_from([
            "m4a-clip", "a.m4a", "b.m4a", "--export", "out.wav", "--max-mb", "16", "-v",
        ])
        .unwrap();
        assert_eq!(
            config.inputs,
            vec![PathBuf::from("a.m4a"), PathBuf::from("b.m4a")]
        );
        assert_eq!(config.output, OutputMode::Wav(PathBuf::from("out.wav")));
        assert_eq!(config.loader_options().max_decoded_bytes, 16 * 1024 * 1024);
        assert!(config.verbose);
    }

    #[test]
    fn test_json_conflicts_with_export() {
        let result = parse_args_from(["m4a-clip", "--json", "--export", "x.wav"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_memory_ceiling_rejected() {
        assert!(parse_args_from(["m4a-clip", "--max-mb", "0"]).is_err());
    }
}
