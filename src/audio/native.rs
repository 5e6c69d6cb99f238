//! 原生解码器契约
//!
//! 以句柄为中心的六个操作：加载、查询长度/采样率/声道数、拷贝数据、释放。
//! 剪辑加载流程只通过此trait访问解码器，便于注入测试替身。

use super::handle_table::DecodeHandle;
use crate::error::AudioResult;
use std::path::Path;

/// 原生解码器trait
///
/// # 契约
///
/// - `load` 成功返回的句柄在 `release` 之前一直有效，必须且只能释放一次
/// - 释放后再使用或重复释放返回 `AudioError::HandleMisuse`
/// - 样本为交错 f32：`[L0, R0, L1, R1, ...]`
/// - 不同句柄之间互不影响，实现需支持多线程并发加载
pub trait NativeDecoder: Send + Sync {
    /// 打开并完整解码文件
    ///
    /// 失败时不得在句柄表中留下任何条目。
    fn load(&self, path: &Path) -> AudioResult<DecodeHandle>;

    /// 所有声道的样本总数
    fn length(&self, handle: DecodeHandle) -> AudioResult<usize>;

    /// 单声道每秒采样数
    fn sample_rate(&self, handle: DecodeHandle) -> AudioResult<u32>;

    /// 交错声道数
    fn channel_count(&self, handle: DecodeHandle) -> AudioResult<u16>;

    /// 将前 `dest.len()` 个交错样本写入调用方缓冲区
    ///
    /// `dest.len()` 超过 `length(handle)` 时返回 `AudioError::InvalidInput`。
    fn copy_data(&self, handle: DecodeHandle, dest: &mut [f32]) -> AudioResult<()>;

    /// 释放句柄对应的全部解码状态
    fn release(&self, handle: DecodeHandle) -> AudioResult<()>;
}

impl<D: NativeDecoder + ?Sized> NativeDecoder for &D {
    fn load(&self, path: &Path) -> AudioResult<DecodeHandle> {
        (**self).load(path)
    }

    fn length(&self, handle: DecodeHandle) -> AudioResult<usize> {
        (**self).length(handle)
    }

    fn sample_rate(&self, handle: DecodeHandle) -> AudioResult<u32> {
        (**self).sample_rate(handle)
    }

    fn channel_count(&self, handle: DecodeHandle) -> AudioResult<u16> {
        (**self).channel_count(handle)
    }

    fn copy_data(&self, handle: DecodeHandle, dest: &mut [f32]) -> AudioResult<()> {
        (**self).copy_data(handle, dest)
    }

    fn release(&self, handle: DecodeHandle) -> AudioResult<()> {
        (**self).release(handle)
    }
}
