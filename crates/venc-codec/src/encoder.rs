//! 编码器 trait 与编码配置.
//!
//! 所有编码器后端必须实现 `Encoder` trait.

use venc_core::{PixelFormat, VencResult};

use crate::codec_id::CodecIdentity;
use crate::frame::VideoFrame;
use crate::packet::Packet;

/// 未指定时使用的 JPEG 质量
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// 编码配置
///
/// 在 `Encoder::open()` 时传入, 会先与后端声明的能力进行比对.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 输入像素格式
    pub pixel_format: PixelFormat,
    /// 帧率 (fps)
    pub fps: u32,
    /// 码率 (bits/s), 0 表示由编码器决定
    pub bit_rate: u32,
    /// GOP 长度 (关键帧间隔), 对 MJPEG 无意义
    pub gop: u32,
    /// JPEG 质量 (1..=100), 仅 MJPEG 使用
    pub quality: u8,
}

impl EncoderConfig {
    /// 以默认码控参数创建配置
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
            fps: 30,
            bit_rate: 0,
            gop: 30,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// 一帧输入数据应有的字节数
    pub fn frame_size(&self) -> Option<usize> {
        self.pixel_format.frame_size(self.width, self.height)
    }
}

/// 编码器 trait
///
/// 编码流程:
/// 1. 调用 `open()` 配置编码器
/// 2. 调用 `send_frame()` 送入原始帧
/// 3. 调用 `receive_packet()` 取出压缩数据包
/// 4. 送入 None 表示编码结束, 取完剩余数据包后返回 `Eof`
/// 5. 调用 `close()` 释放后端资源
pub trait Encoder: Send {
    /// 获取编码器标识
    fn identity(&self) -> CodecIdentity;

    /// 获取编码器名称
    fn name(&self) -> &str;

    /// 使用配置打开编码器
    fn open(&mut self, config: &EncoderConfig) -> VencResult<()>;

    /// 送入一帧原始数据进行编码
    ///
    /// - `frame`: `None` 表示刷新, 之后 `receive_packet()` 最终返回 `Eof`
    /// - `Err(VencError::NeedMoreData)`: 尚有数据包未取出
    fn send_frame(&mut self, frame: Option<&VideoFrame>) -> VencResult<()>;

    /// 从编码器取出一个压缩数据包
    ///
    /// - `Err(VencError::NeedMoreData)`: 需要送入更多帧
    /// - `Err(VencError::Eof)`: 所有数据包已取出
    fn receive_packet(&mut self) -> VencResult<Packet>;

    /// 刷新编码器, 清空内部状态
    fn flush(&mut self);

    /// 关闭编码器
    ///
    /// 默认实现等同于 `flush()`, 持有后端资源的编码器应覆盖此方法.
    fn close(&mut self) {
        self.flush();
    }
}
