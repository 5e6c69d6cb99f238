//! 可播放剪辑
//!
//! 解码结果在调用方一侧的不可变表示。样本存储共享，克隆开销为常数。

use super::format::AudioDescriptor;
use crate::error::{AudioError, AudioResult};
use serde::Serialize;
use std::sync::Arc;

/// 默认剪辑名称
pub const DEFAULT_CLIP_NAME: &str = "M4AClip";

/// 可播放的音频剪辑（构造后不可变）
#[derive(Debug, Clone)]
pub struct PlayableClip {
    name: String,
    descriptor: AudioDescriptor,
    samples: Arc<[f32]>,
}

/// 剪辑摘要（用于JSON/表格输出）
#[derive(Debug, Clone, Serialize)]
pub struct ClipSummary {
    pub name: String,
    #[serde(flatten)]
    pub descriptor: AudioDescriptor,
    pub duration_seconds: f64,
    pub peak: f32,
}

impl PlayableClip {
    /// 从描述与交错缓冲区构造剪辑
    ///
    /// 缓冲区长度必须等于 `descriptor.sample_count()`。
    pub fn new(
        name: impl Into<String>,
        descriptor: AudioDescriptor,
        samples: Vec<f32>,
    ) -> AudioResult<Self> {
        if samples.len() as u64 != descriptor.sample_count() {
            return Err(AudioError::InconsistentGeometry {
                length: samples.len(),
                channels: descriptor.channels,
            });
        }

        Ok(Self {
            name: name.into(),
            descriptor,
            samples: samples.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &AudioDescriptor {
        &self.descriptor
    }

    pub fn sample_rate(&self) -> u32 {
        self.descriptor.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.descriptor.channels
    }

    pub fn frame_count(&self) -> u64 {
        self.descriptor.frame_count
    }

    /// 交错样本 `[L0, R0, L1, R1, ...]`
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.descriptor.duration_seconds()
    }

    /// 第 `index` 帧的所有声道样本
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let channels = self.descriptor.channels_usize();
        let start = index.checked_mul(channels)?;
        let end = start.checked_add(channels)?;
        self.samples.get(start..end)
    }

    /// 单个声道的样本迭代器
    pub fn channel_samples(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        let channels = self.descriptor.channels_usize();
        let skip = if channel < channels {
            channel
        } else {
            self.samples.len()
        };
        self.samples.iter().skip(skip).step_by(channels).copied()
    }

    /// 绝对值峰值
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    pub fn summary(&self) -> ClipSummary {
        ClipSummary {
            name: self.name.clone(),
            descriptor: self.descriptor,
            duration_seconds: self.duration_seconds(),
            peak: self.peak(),
        }
    }
}
