//! M4A Clip Loader - 播放演示程序入口
//!
//! 解析资源路径 → 加载剪辑 → 分配给音频输出 → 播放。
//! 加载失败时记录日志并优雅终止播放，不会panic。

use log::{error, warn};
use m4a_clip_loader::{
    ClipLoader, PlayableClip, SymphoniaDecoder,
    error::{AudioError, ErrorCategory},
    tools::{self, AppConfig, AudioOutput, OutputMode},
};
use std::path::PathBuf;
use std::process;

/// 错误退出码定义
mod exit_codes {
    /// 通用错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 格式/输入错误
    pub const FORMAT_ERROR: i32 = 2;
    /// 打开或解码失败
    pub const DECODING_ERROR: i32 = 3;
    /// 原生层契约违例
    pub const CONTRACT_ERROR: i32 = 4;
    /// 内存/资源错误
    pub const RESOURCE_ERROR: i32 = 5;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &AudioError) -> &'static str {
    match error {
        AudioError::OutOfMemory => {
            "解码结果超过内存上限，可用 --max-mb 调高 / Decoded audio exceeds the memory ceiling, raise it with --max-mb"
        }
        AudioError::Cancelled => "加载已被取消 / Load was cancelled",
        _ => match ErrorCategory::from_audio_error(error) {
            ErrorCategory::Io => {
                "检查文件路径是否正确，文件是否存在且可读 / Check if file path is correct, file exists and is readable"
            }
            ErrorCategory::Format => {
                "确保输入文件为支持的格式 / Ensure input file is in a supported format"
            }
            ErrorCategory::Decoding => {
                "文件可能不存在、已损坏或使用不支持的音频编码 / File may be missing, corrupted or use an unsupported codec"
            }
            ErrorCategory::Contract => {
                "解码器返回了不一致的数据，请报告此问题 / Decoder returned inconsistent data, please report this"
            }
            ErrorCategory::Other => {
                "请检查输入文件和参数设置 / Please check input file and parameter settings"
            }
        },
    }
}

/// 错误处理和建议
fn handle_error(error: AudioError) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let category = ErrorCategory::from_audio_error(&error);
    if matches!(category, ErrorCategory::Format | ErrorCategory::Decoding) {
        let decoder = SymphoniaDecoder::new();
        let uppercase_formats: Vec<String> = decoder
            .supported_formats()
            .extensions
            .iter()
            .map(|s| s.to_uppercase())
            .collect();
        eprintln!(
            "   Supported formats / 支持的格式: {}",
            uppercase_formats.join(", ")
        );
    }

    let exit_code = match &error {
        AudioError::OutOfMemory | AudioError::ResourceError(_) => exit_codes::RESOURCE_ERROR,
        AudioError::InvalidInput(_) => exit_codes::FORMAT_ERROR,
        _ => match category {
            ErrorCategory::Format => exit_codes::FORMAT_ERROR,
            ErrorCategory::Decoding => exit_codes::DECODING_ERROR,
            ErrorCategory::Contract => exit_codes::CONTRACT_ERROR,
            ErrorCategory::Io | ErrorCategory::Other => exit_codes::GENERAL_ERROR,
        },
    };

    process::exit(exit_code);
}

/// 初始化日志：-v 时默认 debug，否则 warn；RUST_LOG 优先
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// 按配置创建输出协作者
fn make_output(config: &AppConfig, index: usize, total: usize) -> Box<dyn AudioOutput> {
    match &config.output {
        OutputMode::Console => Box::new(tools::ConsoleOutput::new(std::io::stdout())),
        OutputMode::Json => Box::new(tools::JsonOutput::new(std::io::stdout())),
        OutputMode::Wav(base) => Box::new(tools::WavExportOutput::new(
            tools::indexed_export_path(base, index, total),
        )),
    }
}

/// 分配并播放一个剪辑
fn play_clip(
    config: &AppConfig,
    clip: PlayableClip,
    index: usize,
    total: usize,
) -> Result<(), AudioError> {
    let mut output = make_output(config, index, total);
    output.assign(clip);
    output.play()
}

/// 应用程序主逻辑
fn run(config: &AppConfig) -> Result<(), AudioError> {
    let loader = ClipLoader::with_options(SymphoniaDecoder::new(), config.loader_options());
    let files = tools::collect_inputs(config, loader.decoder().supported_formats())?;

    if files.is_empty() {
        return Err(AudioError::InvalidInput(
            "没有找到可加载的音频文件 / no audio files found".to_string(),
        ));
    }

    // 单文件：失败直接返回错误
    if let [path] = files.as_slice() {
        let clip = loader.load(path)?;
        return play_clip(config, clip, 0, 1);
    }

    let results: Vec<(PathBuf, Result<PlayableClip, AudioError>)> =
        files.iter().cloned().zip(loader.load_many(&files)).collect();

    let total = results.len();
    let mut failed = 0usize;
    for (index, (path, result)) in results.iter().enumerate() {
        match result {
            Ok(clip) => {
                if let Err(e) = play_clip(config, clip.clone(), index, total) {
                    error!("播放失败 / playback failed for {}: {e}", path.display());
                    failed += 1;
                }
            }
            Err(e) => {
                warn!("跳过 / skipping {}: {e}", path.display());
                failed += 1;
            }
        }
    }

    if config.output != OutputMode::Json {
        println!("{}", tools::build_summary_table(&results));
    }

    if failed == total {
        // 全部失败时以第一个错误退出
        if let Some((_, Err(e))) = results.into_iter().find(|(_, r)| r.is_err()) {
            return Err(e);
        }
        return Err(AudioError::ResourceError(
            "所有剪辑播放失败 / all clips failed to play".to_string(),
        ));
    }
    if failed > 0 {
        eprintln!("[WARNING] {failed}/{total} 个文件失败 / files failed");
    }

    Ok(())
}

fn main() {
    let config = tools::parse_args();
    init_logging(config.verbose);
    if config.output != OutputMode::Json {
        tools::show_startup_info(&config);
    }

    if let Err(error) = run(&config) {
        handle_error(error);
    }
}
