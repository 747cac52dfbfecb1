//! 内置编码器后端.
//!
//! 每个后端提供一个 `EncoderDescriptor`, 由启动注册按启用集合写入注册表.

pub mod h264;
pub mod hardware;
pub mod mjpeg;

mod session;
