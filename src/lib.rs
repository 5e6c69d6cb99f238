//! M4A Clip Loader
//!
//! 通过句柄式原生解码器边界加载M4A（及其他symphonia支持的格式）音频，
//! 产出不可变的可播放剪辑。
//!
//! ## 核心特性
//! - 原生解码器契约：加载 / 长度 / 采样率 / 声道数 / 拷贝 / 释放
//! - 句柄表替代裸指针，重复释放作为编程错误报告
//! - 作用域守卫保证每个句柄在任何退出路径上恰好释放一次
//! - `extern "C"` 导出，供宿主引擎直接调用
//! - rayon 多文件并行加载

pub mod audio;
pub mod error;
pub mod ffi;
pub mod tools;

// 重新导出核心类型
pub use audio::{
    AudioDescriptor, CancelToken, ClipLoader, DecodeHandle, LoaderOptions, NativeDecoder,
    PlayableClip, SymphoniaDecoder, load_clip, load_clips,
};
pub use error::{AudioError, AudioResult, ErrorCategory, HandleMisuseKind};
