//! 硬件编码单元后端.
//!
//! 主机上没有硬件编码单元驱动, 这里的编码器只负责让硬件后端可以被注册和发现:
//! 配置校验通过后 `open()` 报告 `Unsupported`, 调用方据此退回软件实现.

use venc_core::{VencError, VencResult};

use crate::codec_id::CodecIdentity;
use crate::descriptor::EncoderCaps;
use crate::encoder::{Encoder, EncoderConfig};
use crate::frame::VideoFrame;
use crate::packet::Packet;

use super::session::Session;

/// 硬件编码器
pub struct HardwareEncoder {
    identity: CodecIdentity,
    name: &'static str,
    caps: EncoderCaps,
    session: Session,
}

impl HardwareEncoder {
    pub(crate) fn new(identity: CodecIdentity, name: &'static str, caps: EncoderCaps) -> Self {
        Self {
            identity,
            name,
            caps,
            session: Session::default(),
        }
    }
}

impl Encoder for HardwareEncoder {
    fn identity(&self) -> CodecIdentity {
        self.identity
    }

    fn name(&self) -> &str {
        self.name
    }

    fn open(&mut self, config: &EncoderConfig) -> VencResult<()> {
        self.caps.supports(config)?;
        Err(VencError::Unsupported(format!(
            "当前平台没有 {} 硬件编码单元",
            self.identity.codec_type,
        )))
    }

    fn send_frame(&mut self, frame: Option<&VideoFrame>) -> VencResult<()> {
        // 从未成功打开, 这里只会返回未打开错误
        self.session.accept(frame).map(|_| ())
    }

    fn receive_packet(&mut self) -> VencResult<Packet> {
        self.session.receive()
    }

    fn flush(&mut self) {
        self.session.flush();
    }
}
