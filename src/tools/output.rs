//! 音频输出协作者
//!
//! 剪辑先被分配（assign）给输出，再开始播放（play）。实时播放不在本工具范围内，
//! 因此“播放”落地为控制台摘要、JSON 摘要或 WAV 导出。

use super::constants::defaults;
use crate::audio::PlayableClip;
use crate::error::{AudioError, AudioResult};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 音频输出trait
pub trait AudioOutput {
    /// 分配剪辑（替换之前分配的剪辑）
    fn assign(&mut self, clip: PlayableClip);

    /// 当前分配的剪辑
    fn clip(&self) -> Option<&PlayableClip>;

    /// 播放已分配的剪辑
    fn play(&mut self) -> AudioResult<()>;
}

fn require_clip(clip: Option<&PlayableClip>) -> AudioResult<&PlayableClip> {
    clip.ok_or_else(|| AudioError::InvalidInput("未分配剪辑 / no clip assigned".to_string()))
}

/// 控制台摘要输出
pub struct ConsoleOutput<W: Write> {
    writer: W,
    clip: Option<PlayableClip>,
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, clip: None }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AudioOutput for ConsoleOutput<W> {
    fn assign(&mut self, clip: PlayableClip) {
        self.clip = Some(clip);
    }

    fn clip(&self) -> Option<&PlayableClip> {
        self.clip.as_ref()
    }

    fn play(&mut self) -> AudioResult<()> {
        let clip = require_clip(self.clip.as_ref())?;
        writeln!(
            self.writer,
            "▶ 播放 / Playing '{}': {} Hz, {} ch, {} frames, {:.3}s",
            clip.name(),
            clip.sample_rate(),
            clip.channels(),
            clip.frame_count(),
            clip.duration_seconds()
        )?;
        Ok(())
    }
}

/// JSON 摘要输出（每个剪辑一行）
pub struct JsonOutput<W: Write> {
    writer: W,
    clip: Option<PlayableClip>,
}

impl<W: Write> JsonOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, clip: None }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AudioOutput for JsonOutput<W> {
    fn assign(&mut self, clip: PlayableClip) {
        self.clip = Some(clip);
    }

    fn clip(&self) -> Option<&PlayableClip> {
        self.clip.as_ref()
    }

    fn play(&mut self) -> AudioResult<()> {
        let clip = require_clip(self.clip.as_ref())?;
        let line = serde_json::to_string(&clip.summary())
            .map_err(|e| AudioError::InvalidInput(format!("JSON序列化失败: {e}")))?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }
}

/// WAV 导出输出（32位浮点）
pub struct WavExportOutput {
    path: PathBuf,
    clip: Option<PlayableClip>,
}

impl WavExportOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clip: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioOutput for WavExportOutput {
    fn assign(&mut self, clip: PlayableClip) {
        self.clip = Some(clip);
    }

    fn clip(&self) -> Option<&PlayableClip> {
        self.clip.as_ref()
    }

    fn play(&mut self) -> AudioResult<()> {
        let clip = require_clip(self.clip.as_ref())?;
        let spec = hound::WavSpec {
            channels: clip.channels(),
            sample_rate: clip.sample_rate(),
            bits_per_sample: defaults::EXPORT_BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(&self.path, spec)?;
        for &sample in clip.samples() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        info!(
            "已导出 / exported '{}' -> {}",
            clip.name(),
            self.path.display()
        );
        Ok(())
    }
}

/// 多剪辑导出时为每个剪辑生成不冲突的文件名：`out.wav` → `out_1.wav`
pub fn indexed_export_path(base: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_string());
    base.with_file_name(format!("{stem}_{}.{ext}", index + 1))
}
