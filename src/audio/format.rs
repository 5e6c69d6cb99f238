//! 音频格式信息模块
//!
//! 定义解码结果的几何描述（采样率/声道/帧数）以及格式支持信息

use crate::error::{self, AudioError, AudioResult};
use serde::Serialize;
use std::path::Path;

/// 解码音频的描述信息
///
/// 不变量：`sample_rate > 0`、`channels >= 1`，
/// 且交错缓冲区长度恰好等于 `frame_count * channels`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioDescriptor {
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_count: u64,
}

impl AudioDescriptor {
    /// 从原生层报告的 (样本总数, 采样率, 声道数) 构造描述
    ///
    /// # 错误
    ///
    /// * `AudioError::InconsistentGeometry` - 声道数为0或样本总数不能被声道数整除
    /// * `AudioError::FormatError` - 采样率为0
    pub fn from_geometry(length: usize, sample_rate: u32, channels: u16) -> AudioResult<Self> {
        if channels == 0 || length % channels as usize != 0 {
            return Err(AudioError::InconsistentGeometry { length, channels });
        }
        if sample_rate == 0 {
            return Err(error::format_error("采样率不能为0", sample_rate));
        }

        Ok(Self {
            sample_rate,
            channels,
            frame_count: (length / channels as usize) as u64,
        })
    }

    /// 交错样本总数（所有声道）
    pub fn sample_count(&self) -> u64 {
        self.frame_count.saturating_mul(self.channels as u64)
    }

    /// 获取持续时长（秒）
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// 解码后f32缓冲区占用的字节数
    pub fn estimated_memory_bytes(&self) -> u64 {
        self.sample_count()
            .saturating_mul(std::mem::size_of::<f32>() as u64)
    }

    /// 获取声道数（usize类型）
    pub fn channels_usize(&self) -> usize {
        self.channels as usize
    }
}

/// 格式支持信息
#[derive(Debug, Clone)]
pub struct FormatSupport {
    /// 支持的文件扩展名（小写）
    pub extensions: &'static [&'static str],
}

impl FormatSupport {
    /// 检查路径扩展名是否受支持（大小写不敏感）
    pub fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase().as_str()))
    }
}
