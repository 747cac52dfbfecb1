//! 统一错误类型定义.
//!
//! 所有 venc crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// venc 框架统一错误类型
#[derive(Debug, Error)]
pub enum VencError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作 (如当前平台没有硬件编码单元)
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编码器错误
    #[error("编码器错误: {0}")]
    Codec(String),

    /// 未找到指定的编码器
    #[error("未找到编码器: {0}")]
    CodecNotFound(String),

    /// 无效数据 (帧大小不符等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 需要送入更多帧
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 编码器已刷新且数据包已全部取出
    #[error("已到达流末尾")]
    Eof,

    /// 启动注册未全部成功
    #[error("编码器注册未全部成功: {0}")]
    Bootstrap(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

/// venc 框架统一 Result 类型
pub type VencResult<T> = Result<T, VencError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_错误信息格式() {
        let err = VencError::CodecNotFound("h264(hw)".into());
        assert_eq!(err.to_string(), "未找到编码器: h264(hw)");
    }

    #[test]
    fn test_io_错误转换() {
        fn open_missing() -> VencResult<()> {
            std::fs::File::open("/nonexistent/venc-config.json")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(VencError::Io(_))));
    }
}
