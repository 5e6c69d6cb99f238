//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 资源路径默认值
pub mod assets {
    /// 默认资源目录（相对当前工作目录）
    pub const DEFAULT_ASSETS_DIR: &str = "StreamingAssets";

    /// 未指定输入时加载的默认资源文件
    pub const DEFAULT_ASSET_NAME: &str = "unitym4a.m4a";

    /// 覆盖资源目录的环境变量
    pub const ASSETS_DIR_ENV: &str = "M4A_ASSETS_DIR";
}

/// 加载默认配置值
pub mod defaults {
    /// 默认解码内存上限（MB）
    ///
    /// 与 `audio::DEFAULT_MAX_DECODED_BYTES` 保持一致
    pub const MAX_DECODED_MB: u64 = 1024;

    /// 导出WAV的位深度（32位浮点，无损保存解码结果）
    pub const EXPORT_BITS_PER_SAMPLE: u16 = 32;
}
