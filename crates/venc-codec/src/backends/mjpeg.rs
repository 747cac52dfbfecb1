//! MJPEG 编码器后端.
//!
//! 软件实现逐帧编码为独立的 JPEG 图像, 每个数据包都是关键帧.

use bytes::Bytes;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use log::debug;
use venc_core::{PixelFormat, VencError, VencResult};

use crate::codec_id::{CodecIdentity, CodecType};
use crate::descriptor::{EncoderCaps, EncoderDescriptor};
use crate::encoder::{Encoder, EncoderConfig};
use crate::frame::VideoFrame;
use crate::packet::Packet;

use super::hardware::HardwareEncoder;
use super::session::Session;

/// 硬件 MJPEG 后端名称
pub const HW_NAME: &str = "mjpeg_hw";
/// 软件 MJPEG 后端名称
pub const SW_NAME: &str = "mjpeg_sw";

/// 硬件 JPEG 编码单元的能力
pub fn hw_caps() -> EncoderCaps {
    EncoderCaps {
        input_formats: vec![
            PixelFormat::Rgb24,
            PixelFormat::Rgb565le,
            PixelFormat::Yuyv,
            PixelFormat::Yuv420p,
            PixelFormat::Gray8,
        ],
        min_width: 16,
        max_width: 8192,
        min_height: 16,
        max_height: 8192,
        align: 16,
    }
}

/// 软件 JPEG 编码的能力
pub fn sw_caps() -> EncoderCaps {
    EncoderCaps {
        input_formats: vec![PixelFormat::Rgb24, PixelFormat::Gray8],
        min_width: 1,
        max_width: 8192,
        min_height: 1,
        max_height: 8192,
        align: 1,
    }
}

/// 硬件 MJPEG 描述
pub fn hw_descriptor() -> EncoderDescriptor {
    EncoderDescriptor::new(
        CodecIdentity::hardware(CodecType::Mjpeg),
        HW_NAME,
        hw_caps(),
        create_hw,
    )
}

/// 软件 MJPEG 描述
pub fn sw_descriptor() -> EncoderDescriptor {
    EncoderDescriptor::new(
        CodecIdentity::software(CodecType::Mjpeg),
        SW_NAME,
        sw_caps(),
        SwMjpegEncoder::create,
    )
}

fn create_hw() -> VencResult<Box<dyn Encoder>> {
    Ok(Box::new(HardwareEncoder::new(
        CodecIdentity::hardware(CodecType::Mjpeg),
        HW_NAME,
        hw_caps(),
    )))
}

/// 软件 MJPEG 编码器
pub struct SwMjpegEncoder {
    session: Session,
}

impl SwMjpegEncoder {
    pub fn create() -> VencResult<Box<dyn Encoder>> {
        Ok(Box::new(Self {
            session: Session::default(),
        }))
    }
}

fn color_type(pixel_format: PixelFormat) -> VencResult<ExtendedColorType> {
    match pixel_format {
        PixelFormat::Rgb24 => Ok(ExtendedColorType::Rgb8),
        PixelFormat::Gray8 => Ok(ExtendedColorType::L8),
        other => Err(VencError::Unsupported(format!(
            "mjpeg 软件编码器不支持 {other}"
        ))),
    }
}

impl Encoder for SwMjpegEncoder {
    fn identity(&self) -> CodecIdentity {
        CodecIdentity::software(CodecType::Mjpeg)
    }

    fn name(&self) -> &str {
        SW_NAME
    }

    fn open(&mut self, config: &EncoderConfig) -> VencResult<()> {
        if !(1..=100).contains(&config.quality) {
            return Err(VencError::InvalidArgument(format!(
                "JPEG 质量 {} 超出 1..=100",
                config.quality,
            )));
        }
        self.session.open(&sw_caps(), config)?;
        debug!(
            "打开 mjpeg 软件编码器: {}x{}, 格式={}, 质量={}",
            config.width, config.height, config.pixel_format, config.quality,
        );
        Ok(())
    }

    fn send_frame(&mut self, frame: Option<&VideoFrame>) -> VencResult<()> {
        let frame = match self.session.accept(frame)? {
            Some(f) => f,
            None => return Ok(()),
        };
        let config = self.session.config()?;
        let color = color_type(config.pixel_format)?;

        let pixels = frame.to_contiguous();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, config.quality)
            .encode(&pixels, config.width, config.height, color)
            .map_err(|e| VencError::Codec(format!("JPEG 编码失败: {e}")))?;

        let mut pkt = Packet::from_data(Bytes::from(jpeg));
        pkt.pts = frame.pts;
        pkt.dts = frame.pts;
        pkt.duration = frame.duration;
        pkt.is_keyframe = true;
        self.session.push(pkt);
        Ok(())
    }

    fn receive_packet(&mut self) -> VencResult<Packet> {
        self.session.receive()
    }

    fn flush(&mut self) {
        self.session.flush();
    }

    fn close(&mut self) {
        debug!(
            "关闭 mjpeg 软件编码器, 共编码 {} 帧",
            self.session.frame_count()
        );
        self.session.close();
    }
}
