//! H.264 编码器后端.
//!
//! 软件实现在启用 `openh264` feature 时通过 openh264 编码, 输出 Annex-B 码流;
//! 未启用时 `open()` 报告 `Unsupported`.

use log::debug;
use venc_core::{PixelFormat, VencError, VencResult};

use crate::codec_id::{CodecIdentity, CodecType};
use crate::descriptor::{EncoderCaps, EncoderDescriptor};
use crate::encoder::{Encoder, EncoderConfig};
use crate::frame::VideoFrame;
use crate::packet::Packet;

use super::hardware::HardwareEncoder;
use super::session::Session;

/// 硬件 H.264 后端名称
pub const HW_NAME: &str = "h264_hw";
/// 软件 H.264 后端名称
pub const SW_NAME: &str = "h264_sw";

/// 硬件 H.264 编码单元的能力
pub fn hw_caps() -> EncoderCaps {
    EncoderCaps {
        input_formats: vec![PixelFormat::Yuv420p, PixelFormat::Nv12],
        min_width: 64,
        max_width: 1920,
        min_height: 64,
        max_height: 1088,
        align: 16,
    }
}

/// 软件 H.264 编码的能力
pub fn sw_caps() -> EncoderCaps {
    EncoderCaps {
        input_formats: vec![PixelFormat::Yuv420p],
        min_width: 16,
        max_width: 4096,
        min_height: 16,
        max_height: 4096,
        align: 16,
    }
}

/// 硬件 H.264 描述
pub fn hw_descriptor() -> EncoderDescriptor {
    EncoderDescriptor::new(
        CodecIdentity::hardware(CodecType::H264),
        HW_NAME,
        hw_caps(),
        create_hw,
    )
}

/// 软件 H.264 描述
pub fn sw_descriptor() -> EncoderDescriptor {
    EncoderDescriptor::new(
        CodecIdentity::software(CodecType::H264),
        SW_NAME,
        sw_caps(),
        SwH264Encoder::create,
    )
}

fn create_hw() -> VencResult<Box<dyn Encoder>> {
    Ok(Box::new(HardwareEncoder::new(
        CodecIdentity::hardware(CodecType::H264),
        HW_NAME,
        hw_caps(),
    )))
}

/// 交给 openh264 的码控参数
#[cfg(any(feature = "openh264", test))]
#[derive(Debug, Clone, Copy, PartialEq)]
struct RateControl {
    /// 目标码率, `None` 时沿用 openh264 默认值
    bitrate_bps: Option<u32>,
    max_frame_rate: f32,
}

#[cfg(any(feature = "openh264", test))]
impl RateControl {
    fn from_config(config: &EncoderConfig) -> Self {
        Self {
            bitrate_bps: (config.bit_rate > 0).then_some(config.bit_rate),
            max_frame_rate: config.fps as f32,
        }
    }
}

/// 软件 H.264 编码器
pub struct SwH264Encoder {
    session: Session,
    #[cfg(feature = "openh264")]
    inner: Option<openh264::encoder::Encoder>,
}

impl SwH264Encoder {
    pub fn create() -> VencResult<Box<dyn Encoder>> {
        Ok(Box::new(Self {
            session: Session::default(),
            #[cfg(feature = "openh264")]
            inner: None,
        }))
    }

    #[cfg(feature = "openh264")]
    fn start(&mut self, config: &EncoderConfig) -> VencResult<()> {
        use openh264::OpenH264API;
        use openh264::encoder::EncoderConfig as OpenH264Config;

        self.session.open(&sw_caps(), config)?;
        let rate = RateControl::from_config(config);
        let mut api_config = OpenH264Config::new().max_frame_rate(rate.max_frame_rate);
        if let Some(bps) = rate.bitrate_bps {
            api_config = api_config.set_bitrate_bps(bps);
        }
        let encoder =
            openh264::encoder::Encoder::with_api_config(OpenH264API::from_source(), api_config)
                .map_err(|e| VencError::Codec(format!("openh264 初始化失败: {e}")))?;
        self.inner = Some(encoder);
        Ok(())
    }

    #[cfg(not(feature = "openh264"))]
    fn start(&mut self, config: &EncoderConfig) -> VencResult<()> {
        sw_caps().supports(config)?;
        Err(VencError::Unsupported(
            "h264 软件编码需要启用 openh264 feature".into(),
        ))
    }

    #[cfg(feature = "openh264")]
    fn encode(&mut self, frame: &VideoFrame) -> VencResult<Packet> {
        use openh264::formats::YUVBuffer;

        let config = self.session.config()?;
        let keyframe = config.gop == 0 || self.session.frame_count() % u64::from(config.gop) == 0;
        let yuv = YUVBuffer::from_vec(
            frame.to_contiguous(),
            config.width as usize,
            config.height as usize,
        );

        let encoder = self
            .inner
            .as_mut()
            .ok_or_else(|| VencError::Codec("编码器未打开, 请先调用 open()".into()))?;
        if keyframe {
            encoder.force_intra_frame();
        }
        let bitstream = encoder
            .encode(&yuv)
            .map_err(|e| VencError::Codec(format!("openh264 编码失败: {e}")))?;

        let mut pkt = Packet::from_data(bitstream.to_vec());
        pkt.is_keyframe = keyframe;
        Ok(pkt)
    }

    #[cfg(not(feature = "openh264"))]
    fn encode(&mut self, _frame: &VideoFrame) -> VencResult<Packet> {
        Err(VencError::Codec("编码器未打开, 请先调用 open()".into()))
    }
}

impl Encoder for SwH264Encoder {
    fn identity(&self) -> CodecIdentity {
        CodecIdentity::software(CodecType::H264)
    }

    fn name(&self) -> &str {
        SW_NAME
    }

    fn open(&mut self, config: &EncoderConfig) -> VencResult<()> {
        self.start(config)?;
        debug!(
            "打开 h264 软件编码器: {}x{}, {} fps, gop={}",
            config.width, config.height, config.fps, config.gop,
        );
        Ok(())
    }

    fn send_frame(&mut self, frame: Option<&VideoFrame>) -> VencResult<()> {
        let frame = match self.session.accept(frame)? {
            Some(f) => f,
            None => return Ok(()),
        };
        let mut pkt = self.encode(frame)?;
        // 无 B 帧, DTS = PTS
        pkt.pts = frame.pts;
        pkt.dts = frame.pts;
        pkt.duration = frame.duration;
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
        self.session.close();
        #[cfg(feature = "openh264")]
        {
            self.inner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_硬件后端在主机上不可用() {
        let mut enc = create_hw().unwrap();
        let err = enc
            .open(&EncoderConfig::new(1280, 720, PixelFormat::Nv12))
            .unwrap_err();
        assert!(matches!(err, VencError::Unsupported(_)));
    }

    #[test]
    fn test_能力不满足时先报告能力错误() {
        let mut enc = create_hw().unwrap();
        let err = enc
            .open(&EncoderConfig::new(1920, 1080, PixelFormat::Yuv420p))
            .unwrap_err();
        assert!(err.to_string().contains("对齐"), "{err}");
    }

    #[test]
    fn test_未打开时送帧失败() {
        let mut enc = SwH264Encoder::create().unwrap();
        let frame = VideoFrame::filled(16, 16, PixelFormat::Yuv420p, 0);
        assert!(matches!(
            enc.send_frame(Some(&frame)),
            Err(VencError::Codec(_))
        ));
    }

    #[test]
    fn test_码控参数取自编码配置() {
        let mut config = EncoderConfig::new(640, 480, PixelFormat::Yuv420p);
        let rate = RateControl::from_config(&config);
        assert_eq!(rate.bitrate_bps, None);
        assert_eq!(rate.max_frame_rate, 30.0);

        config.bit_rate = 2_000_000;
        config.fps = 15;
        let rate = RateControl::from_config(&config);
        assert_eq!(rate.bitrate_bps, Some(2_000_000));
        assert_eq!(rate.max_frame_rate, 15.0);
    }

    #[cfg(not(feature = "openh264"))]
    #[test]
    fn test_未启用openh264时软件编码不可用() {
        let mut enc = SwH264Encoder::create().unwrap();
        let err = enc
            .open(&EncoderConfig::new(64, 64, PixelFormat::Yuv420p))
            .unwrap_err();
        assert!(matches!(err, VencError::Unsupported(_)));
    }

    #[cfg(feature = "openh264")]
    #[test]
    fn test_openh264_首帧为关键帧() {
        let mut enc = SwH264Encoder::create().unwrap();
        enc.open(&EncoderConfig::new(64, 64, PixelFormat::Yuv420p))
            .unwrap();
        let mut frame = VideoFrame::filled(64, 64, PixelFormat::Yuv420p, 0x80);
        frame.pts = 0;
        enc.send_frame(Some(&frame)).unwrap();
        let pkt = enc.receive_packet().unwrap();
        assert!(pkt.is_keyframe);
        assert!(!pkt.is_empty());
    }

    #[cfg(feature = "openh264")]
    #[test]
    fn test_openh264_按码率与帧率打开() {
        let mut config = EncoderConfig::new(64, 64, PixelFormat::Yuv420p);
        config.bit_rate = 300_000;
        config.fps = 15;
        let mut enc = SwH264Encoder::create().unwrap();
        enc.open(&config).unwrap();

        let frame = VideoFrame::filled(64, 64, PixelFormat::Yuv420p, 0x40);
        enc.send_frame(Some(&frame)).unwrap();
        assert!(!enc.receive_packet().unwrap().is_empty());
    }
}
