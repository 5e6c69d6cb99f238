//! 解码器绑定层
//!
//! 将原生解码器的句柄调用编排为一次原子的“加载剪辑”操作：
//! 加载 → 查询几何信息 → 校验 → 拷贝 → 释放 → 构造剪辑。
//!
//! 句柄由 [`HandleGuard`] 持有，任何退出路径都会恰好释放一次。

use super::clip::{DEFAULT_CLIP_NAME, PlayableClip};
use super::format::AudioDescriptor;
use super::handle_table::DecodeHandle;
use super::native::NativeDecoder;
use crate::error::{AudioError, AudioResult};
use log::{debug, error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 默认解码内存上限（1 GiB f32样本）
pub const DEFAULT_MAX_DECODED_BYTES: u64 = 1024 * 1024 * 1024;

/// 作用域句柄：析构时释放
///
/// 成功路径应调用 [`HandleGuard::release`] 以获取释放结果；
/// 错误路径依赖 `Drop`，释放失败只记录日志。
pub struct HandleGuard<'a, D: NativeDecoder + ?Sized> {
    decoder: &'a D,
    handle: DecodeHandle,
    released: bool,
}

impl<'a, D: NativeDecoder + ?Sized> HandleGuard<'a, D> {
    pub fn new(decoder: &'a D, handle: DecodeHandle) -> Self {
        Self {
            decoder,
            handle,
            released: false,
        }
    }

    /// 被守护的句柄
    pub fn handle(&self) -> DecodeHandle {
        self.handle
    }

    /// 显式释放并返回释放结果
    pub fn release(mut self) -> AudioResult<()> {
        self.released = true;
        self.decoder.release(self.handle)
    }
}

impl<D: NativeDecoder + ?Sized> Drop for HandleGuard<'_, D> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.decoder.release(self.handle) {
            error!("释放句柄失败 / failed to release handle {}: {e}", self.handle);
        }
    }
}

/// 加载取消令牌（仅在打开文件前生效）
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 加载选项
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// 生成剪辑的名称
    pub clip_name: String,
    /// 解码缓冲区字节上限
    pub max_decoded_bytes: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            clip_name: DEFAULT_CLIP_NAME.to_string(),
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
        }
    }
}

/// 剪辑加载器：注入的解码器 + 选项 + 可选取消令牌
pub struct ClipLoader<D> {
    decoder: D,
    options: LoaderOptions,
    cancel: Option<CancelToken>,
}

impl<D: NativeDecoder> ClipLoader<D> {
    pub fn new(decoder: D) -> Self {
        Self::with_options(decoder, LoaderOptions::default())
    }

    pub fn with_options(decoder: D, options: LoaderOptions) -> Self {
        Self {
            decoder,
            options,
            cancel: None,
        }
    }

    /// 绑定取消令牌
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// 加载单个文件为剪辑
    ///
    /// # 错误
    ///
    /// * `AudioError::Cancelled` - 打开文件前已取消，未调用解码器
    /// * `AudioError::OpenOrDecodeFailed` - 原生加载失败，未分配缓冲区
    /// * `AudioError::InconsistentGeometry` - 样本总数不能被声道数整除
    /// * `AudioError::OutOfMemory` - 解码结果超过 `max_decoded_bytes`
    /// * 其他原生调用错误（句柄已释放后原样返回）
    pub fn load<P: AsRef<Path>>(&self, path: P) -> AudioResult<PlayableClip> {
        let path = path.as_ref();

        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(AudioError::Cancelled);
        }

        let handle = self
            .decoder
            .load(path)
            .map_err(|e| AudioError::OpenOrDecodeFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let guard = HandleGuard::new(&self.decoder, handle);
        // 出错时 guard 析构释放句柄
        let (descriptor, samples) = self.copy_out(guard.handle())?;
        guard.release()?;

        debug!(
            "已加载 / loaded {}: {} Hz, {} ch, {} frames",
            path.display(),
            descriptor.sample_rate,
            descriptor.channels,
            descriptor.frame_count
        );

        PlayableClip::new(self.options.clip_name.clone(), descriptor, samples)
    }

    fn copy_out(&self, handle: DecodeHandle) -> AudioResult<(AudioDescriptor, Vec<f32>)> {
        let length = self.decoder.length(handle)?;
        let sample_rate = self.decoder.sample_rate(handle)?;
        let channels = self.decoder.channel_count(handle)?;

        let descriptor = AudioDescriptor::from_geometry(length, sample_rate, channels)?;
        if descriptor.estimated_memory_bytes() > self.options.max_decoded_bytes {
            return Err(AudioError::OutOfMemory);
        }

        let mut buffer = vec![0.0f32; length];
        self.decoder.copy_data(handle, &mut buffer)?;

        Ok((descriptor, buffer))
    }

    /// 并行加载多个文件，结果顺序与输入一致
    ///
    /// 每次加载独占自己的句柄与缓冲区。
    pub fn load_many(&self, paths: &[PathBuf]) -> Vec<AudioResult<PlayableClip>> {
        info!("并行加载 {} 个文件 / loading {} files", paths.len(), paths.len());
        paths.par_iter().map(|p| self.load(p)).collect()
    }
}

/// 用默认选项加载单个剪辑
pub fn load_clip<D, P>(decoder: &D, path: P) -> AudioResult<PlayableClip>
where
    D: NativeDecoder + ?Sized,
    P: AsRef<Path>,
{
    ClipLoader::new(decoder).load(path)
}

/// 用默认选项并行加载多个剪辑
pub fn load_clips<D>(decoder: &D, paths: &[PathBuf]) -> Vec<AudioResult<PlayableClip>>
where
    D: NativeDecoder + ?Sized,
{
    ClipLoader::new(decoder).load_many(paths)
}
