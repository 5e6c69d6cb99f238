//! 音频解码与剪辑加载模块
//!
//! - `native`：原生解码器句柄契约
//! - `symphonia_decoder`：契约的symphonia实现
//! - `binding`：句柄安全的剪辑加载流程

// 内部子模块
mod format;

pub mod binding;
pub mod clip;
pub mod handle_table;
pub mod native;
pub mod symphonia_decoder;

pub use binding::{
    CancelToken, ClipLoader, DEFAULT_MAX_DECODED_BYTES, HandleGuard, LoaderOptions, load_clip,
    load_clips,
};
pub use clip::{ClipSummary, DEFAULT_CLIP_NAME, PlayableClip};
pub use format::{AudioDescriptor, FormatSupport};
pub use handle_table::{DecodeHandle, HandleTable};
pub use native::NativeDecoder;
pub use symphonia_decoder::SymphoniaDecoder;
