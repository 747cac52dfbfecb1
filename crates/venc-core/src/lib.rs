//! # venc-core
//!
//! venc 视频编码框架核心库, 提供统一错误类型与像素格式定义.
//!
//! 所有 venc crate 共用这里的基础类型, 编码器后端与注册表都建立在它之上.

pub mod error;
pub mod pixel_format;

// 重导出常用类型
pub use error::{VencError, VencResult};
pub use pixel_format::PixelFormat;
