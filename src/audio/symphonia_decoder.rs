//! 基于symphonia的原生解码器实现
//!
//! 一次性完整解码文件，结果登记到句柄表，通过 [`NativeDecoder`] 契约对外提供。
//! WAV 先走 hound 快速路径，失败时回退到 symphonia。

use super::format::FormatSupport;
use super::handle_table::{DecodeHandle, HandleTable};
use super::native::NativeDecoder;
use crate::error::{self, AudioError, AudioResult};
use log::{debug, warn};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// 解码器支持的扩展名
static SUPPORT: FormatSupport = FormatSupport {
    extensions: &[
        "m4a", "mp4", "aac", "alac", "wav", "flac", "mp3", "ogg", "aiff", "aif", "caf",
    ],
};

/// 句柄背后的解码结果
#[derive(Debug)]
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

/// symphonia 解码器
///
/// 内部持有句柄表，`&self` 即可并发加载不同文件。
#[derive(Default)]
pub struct SymphoniaDecoder {
    handles: HandleTable<DecodedAudio>,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 支持的格式信息
    pub fn supported_formats(&self) -> &'static FormatSupport {
        &SUPPORT
    }

    /// 当前未释放的句柄数量
    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    fn decode_file(&self, path: &Path) -> AudioResult<DecodedAudio> {
        if !SUPPORT.supports(path) {
            let ext = path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown");
            return Err(AudioError::FormatError(format!("不支持的文件格式: .{ext}")));
        }

        let is_wav = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav {
            match decode_with_hound(path) {
                Ok(decoded) => return Ok(decoded),
                Err(AudioError::IoError(e)) => return Err(AudioError::IoError(e)),
                Err(e) => {
                    debug!("hound解码失败，使用symphonia后备解码器: {e}");
                }
            }
        }

        decode_with_symphonia(path)
    }
}

impl NativeDecoder for SymphoniaDecoder {
    fn load(&self, path: &Path) -> AudioResult<DecodeHandle> {
        let decoded = self.decode_file(path)?;
        debug!(
            "解码完成 / decoded {}: {} Hz, {} ch, {} samples",
            path.display(),
            decoded.sample_rate,
            decoded.channels,
            decoded.samples.len()
        );
        self.handles.insert(decoded)
    }

    fn length(&self, handle: DecodeHandle) -> AudioResult<usize> {
        self.handles.with(handle, |d| d.samples.len())
    }

    fn sample_rate(&self, handle: DecodeHandle) -> AudioResult<u32> {
        self.handles.with(handle, |d| d.sample_rate)
    }

    fn channel_count(&self, handle: DecodeHandle) -> AudioResult<u16> {
        self.handles.with(handle, |d| d.channels)
    }

    fn copy_data(&self, handle: DecodeHandle, dest: &mut [f32]) -> AudioResult<()> {
        self.handles.with(handle, |d| {
            if dest.len() > d.samples.len() {
                return Err(AudioError::InvalidInput(format!(
                    "目标长度{}超过可用样本数{}",
                    dest.len(),
                    d.samples.len()
                )));
            }
            dest.copy_from_slice(&d.samples[..dest.len()]);
            Ok(())
        })?
    }

    fn release(&self, handle: DecodeHandle) -> AudioResult<()> {
        self.handles.remove(handle).map(drop)
    }
}

/// 使用hound解码WAV文件
fn decode_with_hound(path: &Path) -> AudioResult<DecodedAudio> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v as f64 / 2147483648.0) as f32))
            .collect::<Result<_, _>>()?,
        (format, bits) => {
            return Err(error::format_error(
                "不支持的WAV样本格式",
                format!("{format:?} {bits}位"),
            ));
        }
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// 解码过程中累积的流参数
///
/// 容器声明的参数只作为后备；样本按解码缓冲区的实际参数交错，
/// 因此以首个非空缓冲区为准，之后的缓冲区必须保持一致。
#[derive(Debug, Default)]
struct StreamParams {
    declared_rate: Option<u32>,
    declared_channels: Option<u16>,
    rate: Option<u32>,
    channels: Option<u16>,
    skipped_packets: usize,
}

impl StreamParams {
    fn new(declared_rate: Option<u32>, declared_channels: Option<u16>) -> Self {
        Self {
            declared_rate,
            declared_channels,
            ..Default::default()
        }
    }

    /// 登记一个解码缓冲区的参数
    fn observe(&mut self, rate: u32, channels: u16) -> AudioResult<()> {
        if channels != 0 {
            match self.channels {
                None => self.channels = Some(channels),
                Some(expected) if expected != channels => {
                    return Err(AudioError::DecodingError(format!(
                        "解码过程中声道数变化: {expected} -> {channels}"
                    )));
                }
                Some(_) => {}
            }
        }
        if rate != 0 {
            match self.rate {
                None => self.rate = Some(rate),
                Some(expected) if expected != rate => {
                    return Err(AudioError::DecodingError(format!(
                        "解码过程中采样率变化: {expected} -> {rate}"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn skip_packet(&mut self) {
        self.skipped_packets += 1;
    }

    /// 结束解码，返回 (采样率, 声道数)
    fn finish(self, sample_count: usize) -> AudioResult<(u32, u16)> {
        if sample_count == 0 && self.skipped_packets > 0 {
            return Err(AudioError::DecodingError(format!(
                "所有音频包均解码失败（{}个）",
                self.skipped_packets
            )));
        }

        if let (Some(declared), Some(actual)) = (self.declared_channels, self.channels)
            && declared != actual
        {
            warn!("声明声道数{declared}与解码结果{actual}不符，以解码结果为准");
        }
        if let (Some(declared), Some(actual)) = (self.declared_rate, self.rate)
            && declared != actual
        {
            warn!("声明采样率{declared}与解码结果{actual}不符，以解码结果为准");
        }

        // AAC-in-MP4 常在首个解码块才给出声道布局
        let channels = self
            .channels
            .or(self.declared_channels)
            .filter(|&ch| ch != 0)
            .ok_or_else(|| AudioError::FormatError("无法获取声道数信息".to_string()))?;
        let sample_rate = self
            .rate
            .or(self.declared_rate)
            .filter(|&rate| rate != 0)
            .ok_or_else(|| AudioError::FormatError("无法获取采样率信息".to_string()))?;

        Ok((sample_rate, channels))
    }
}

/// 使用symphonia通用解码（M4A/AAC/ALAC等）
fn decode_with_symphonia(path: &Path) -> AudioResult<DecodedAudio> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension() {
        hint.with_extension(&extension.to_string_lossy());
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| error::format_error("格式探测失败", e))?;

    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::FormatError("未找到音频轨道".to_string()))?;

    let track_id = track.id;
    let mut params = StreamParams::new(
        track.codec_params.sample_rate,
        track.codec_params.channels.map(|ch| ch.count() as u16),
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| error::format_error("创建解码器失败", e))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(error::decoding_error("读取包失败", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(audio_buf) => {
                let (rate, channels) = append_interleaved(&audio_buf, &mut samples);
                params.observe(rate, channels)?;
            }
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::DecodeError(e)) => {
                params.skip_packet();
                warn!("跳过损坏的音频包 / skipping corrupt packet: {e}");
            }
            Err(e) => return Err(error::decoding_error("解码失败", e)),
        }
    }

    let (sample_rate, channels) = params.finish(samples.len())?;

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// 将symphonia缓冲区追加为交错f32，返回 (采样率, 声道数)
fn append_interleaved(audio_buf: &AudioBufferRef<'_>, samples: &mut Vec<f32>) -> (u32, u16) {
    match audio_buf {
        AudioBufferRef::U8(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::U16(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::U24(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::U32(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::S8(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::S16(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::S24(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::S32(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::F32(buf) => interleave_into(&**buf, samples),
        AudioBufferRef::F64(buf) => interleave_into(&**buf, samples),
    }
}

fn interleave_into<S>(buf: &AudioBuffer<S>, samples: &mut Vec<f32>) -> (u32, u16)
where
    S: Sample + IntoSample<f32>,
{
    let spec = buf.spec();
    let channel_count = spec.channels.count();
    let frame_count = buf.frames();

    samples.reserve(channel_count * frame_count);
    for frame in 0..frame_count {
        for ch in 0..channel_count {
            samples.push(buf.chan(ch)[frame].into_sample());
        }
    }

    (spec.rate, channel_count as u16)
}
