//! 工具函数模块
//!
//! 文件路径处理等通用工具函数。

use std::path::Path;

/// 提取文件名（返回String，用于日志显示）
#[inline]
pub fn extract_filename_lossy(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_filename() {
        let path = Path::new("assets/unitym4a.m4a");
        assert_eq!(extract_filename_lossy(path), "unitym4a.m4a");
        assert_eq!(extract_filename_lossy(Path::new("/")), "");
    }
}
