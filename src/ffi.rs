//! C ABI 导出层
//!
//! 宿主引擎（C#/C++）通过这六个函数消费解码器，语义与 [`NativeDecoder`] 一一对应：
//!
//! ```text
//! handle = m4a_load_from_path(path)        // 0 = 失败
//! len    = m4a_get_audio_data_length(handle)
//! rate   = m4a_get_sample_rate(handle)
//! ch     = m4a_get_channel_count(handle)
//! m4a_get_audio_data(handle, buffer, len)
//! m4a_release_audio_data(handle)           // 必须且只能调用一次
//! ```
//!
//! 薄包装设计：仅做参数校验和类型转换，进程内共享一个 [`SymphoniaDecoder`]。

use crate::audio::{DecodeHandle, NativeDecoder, SymphoniaDecoder};
use crate::error::{AudioError, AudioResult};
use log::error;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::sync::LazyLock;

/// 进程级解码器
static DECODER: LazyLock<SymphoniaDecoder> = LazyLock::new(SymphoniaDecoder::new);

/// 参数错误
const ERR_INVALID_ARGUMENT: c_int = -1;
/// 解码器调用失败
const ERR_DECODER: c_int = -2;

fn handle_or_err(raw: u32) -> AudioResult<DecodeHandle> {
    DecodeHandle::from_raw(raw).ok_or_else(|| AudioError::InvalidInput("句柄为0".to_string()))
}

fn report<T>(op: &str, result: AudioResult<T>) -> Option<T> {
    result
        .inspect_err(|e| error!("[FFI] {op} 失败 / failed: {e}"))
        .ok()
}

fn query_i32(op: &str, raw: u32, query: impl FnOnce(DecodeHandle) -> AudioResult<i64>) -> c_int {
    report(op, handle_or_err(raw).and_then(query))
        .and_then(|v| c_int::try_from(v).ok())
        .unwrap_or(ERR_INVALID_ARGUMENT)
}

/// 打开并解码文件，返回非零句柄；失败返回0
///
/// # Safety
///
/// 调用者必须确保：
/// - `path` 为空指针，或指向以NUL结尾的有效UTF-8字符串
/// - `path` 在函数调用期间保持有效
#[unsafe(no_mangle)]
pub unsafe extern "C" fn m4a_load_from_path(path: *const c_char) -> u32 {
    if path.is_null() {
        error!("[FFI] 路径指针为空 / null path pointer");
        return 0;
    }

    // SAFETY: 调用者保证 path 指向有效的NUL结尾字符串
    let c_path = unsafe { CStr::from_ptr(path) };
    let Ok(path_str) = c_path.to_str() else {
        error!("[FFI] 路径不是有效UTF-8 / path is not valid UTF-8");
        return 0;
    };

    report("load", DECODER.load(Path::new(path_str)))
        .map(DecodeHandle::as_raw)
        .unwrap_or(0)
}

/// 所有声道的样本总数；失败返回-1
#[unsafe(no_mangle)]
pub extern "C" fn m4a_get_audio_data_length(handle: u32) -> c_int {
    query_i32("length", handle, |h| DECODER.length(h).map(|v| v as i64))
}

/// 采样率；失败返回-1
#[unsafe(no_mangle)]
pub extern "C" fn m4a_get_sample_rate(handle: u32) -> c_int {
    query_i32("sample_rate", handle, |h| {
        DECODER.sample_rate(h).map(i64::from)
    })
}

/// 声道数；失败返回-1
#[unsafe(no_mangle)]
pub extern "C" fn m4a_get_channel_count(handle: u32) -> c_int {
    query_i32("channel_count", handle, |h| {
        DECODER.channel_count(h).map(i64::from)
    })
}

/// 拷贝前 `length` 个交错样本到 `buffer`
///
/// 返回0成功，-1参数错误，-2解码器错误（含 `length` 超过可用样本数）。
///
/// # Safety
///
/// 调用者必须确保：
/// - `buffer` 指向至少 `length` 个可写的 f32
/// - `buffer` 在函数调用期间不被其他代码访问
#[unsafe(no_mangle)]
pub unsafe extern "C" fn m4a_get_audio_data(handle: u32, buffer: *mut f32, length: c_int) -> c_int {
    if length < 0 || (buffer.is_null() && length > 0) {
        return ERR_INVALID_ARGUMENT;
    }
    let Some(handle) = report("copy_data", handle_or_err(handle)) else {
        return ERR_INVALID_ARGUMENT;
    };
    if length == 0 {
        return 0;
    }

    // SAFETY: 调用者保证 buffer 至少有 length 个可写元素
    let dest = unsafe { std::slice::from_raw_parts_mut(buffer, length as usize) };
    match report("copy_data", DECODER.copy_data(handle, dest)) {
        Some(()) => 0,
        None => ERR_DECODER,
    }
}

/// 释放句柄；重复释放或未知句柄返回-1
#[unsafe(no_mangle)]
pub extern "C" fn m4a_release_audio_data(handle: u32) -> c_int {
    let result = handle_or_err(handle).and_then(|h| DECODER.release(h));
    match report("release", result) {
        Some(()) => 0,
        None => ERR_INVALID_ARGUMENT,
    }
}
