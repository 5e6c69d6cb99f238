//! 统一错误处理框架
//!
//! 解码器句柄边界与剪辑加载流程共用的错误类型定义。

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 句柄误用的具体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMisuseKind {
    /// 句柄已被释放（重复释放或释放后使用）
    Released,
    /// 句柄从未由解码器签发
    Unknown,
}

impl fmt::Display for HandleMisuseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleMisuseKind::Released => write!(f, "已释放 / released"),
            HandleMisuseKind::Unknown => write!(f, "未知 / unknown"),
        }
    }
}

/// 音频加载相关的统一错误类型
#[derive(Debug, Error)]
pub enum AudioError {
    /// 原生加载失败：文件缺失、容器损坏或编解码器不支持
    #[error("打开或解码失败 / open-or-decode-failed: {} ({reason})", path.display())]
    OpenOrDecodeFailed { path: PathBuf, reason: String },

    /// 样本总数不能被声道数整除，属于原生层契约违例
    #[error("几何信息不一致 / inconsistent-geometry: length={length}, channels={channels}")]
    InconsistentGeometry { length: usize, channels: u16 },

    /// 句柄误用（编程错误）
    #[error("句柄误用 / handle misuse: #{handle} {kind}")]
    HandleMisuse { handle: u32, kind: HandleMisuseKind },

    /// 加载在打开文件前被取消
    #[error("加载已取消 / load cancelled")]
    Cancelled,

    /// 输入验证错误
    #[error("输入验证失败: {0}")]
    InvalidInput(String),

    /// 文件I/O错误
    #[error("文件I/O错误: {0}")]
    IoError(#[from] io::Error),

    /// 音频格式错误
    #[error("音频格式错误: {0}")]
    FormatError(String),

    /// 解码错误
    #[error("音频解码失败: {0}")]
    DecodingError(String),

    /// 解码结果超过内存上限
    #[error("内存不足")]
    OutOfMemory,

    /// 资源访问错误（锁中毒等）
    #[error("资源访问错误: {0}")]
    ResourceError(String),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => AudioError::IoError(e),
            other => AudioError::DecodingError(format!("WAV解码错误: {other}")),
        }
    }
}

/// 音频处理操作的标准Result类型
pub type AudioResult<T> = Result<T, AudioError>;

// ==================== 错误转换Helper函数 ====================

/// 创建格式错误的helper函数
#[inline]
pub fn format_error<E: fmt::Display>(context: &str, err: E) -> AudioError {
    AudioError::FormatError(format!("{context}: {err}"))
}

/// 创建解码错误的helper函数
#[inline]
pub fn decoding_error<E: fmt::Display>(context: &str, err: E) -> AudioError {
    AudioError::DecodingError(format!("{context}: {err}"))
}

// ==================== 错误分类系统 ====================

/// 错误类别枚举（用于CLI退出码和建议文本）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorCategory {
    /// 格式相关错误（不支持的格式、格式损坏等）
    Format,
    /// 解码相关错误（打开/解码失败、音频数据损坏等）
    Decoding,
    /// I/O相关错误（文件不存在、权限不足等）
    Io,
    /// 原生层契约违例或句柄误用
    Contract,
    /// 其他未分类错误
    Other,
}

impl ErrorCategory {
    /// 从AudioError提取错误类别
    pub fn from_audio_error(e: &AudioError) -> Self {
        match e {
            AudioError::FormatError(_) => Self::Format,
            AudioError::OpenOrDecodeFailed { .. } | AudioError::DecodingError(_) => Self::Decoding,
            AudioError::IoError(_) => Self::Io,
            AudioError::InconsistentGeometry { .. } | AudioError::HandleMisuse { .. } => {
                Self::Contract
            }
            AudioError::Cancelled
            | AudioError::InvalidInput(_)
            | AudioError::OutOfMemory
            | AudioError::ResourceError(_) => Self::Other,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Format => "格式错误",
            Self::Decoding => "解码错误",
            Self::Io => "I/O错误",
            Self::Contract => "契约错误",
            Self::Other => "其他错误",
        }
    }
}
