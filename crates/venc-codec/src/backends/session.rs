//! 编码会话状态.
//!
//! 各后端共用的 open / send / receive 状态机: 打开时校验配置, 送帧时校验帧,
//! 输出数据包排队等待取出, 刷新后最终返回 `Eof`.

use std::collections::VecDeque;

use venc_core::{VencError, VencResult};

use crate::descriptor::EncoderCaps;
use crate::encoder::EncoderConfig;
use crate::frame::VideoFrame;
use crate::packet::Packet;

/// 编码会话状态
#[derive(Debug, Default)]
pub(crate) struct Session {
    /// 打开后的配置
    config: Option<EncoderConfig>,
    /// 预计算: 每帧总字节数
    frame_size: usize,
    /// 待取出的数据包
    pending: VecDeque<Packet>,
    /// 是否已收到刷新信号
    flushing: bool,
    /// 已编码帧数
    frame_count: u64,
}

impl Session {
    /// 按能力声明校验配置并重置状态
    pub(crate) fn open(&mut self, caps: &EncoderCaps, config: &EncoderConfig) -> VencResult<()> {
        caps.supports(config)?;
        let frame_size = config.frame_size().ok_or_else(|| {
            VencError::InvalidArgument(format!("无法计算 {} 的帧大小", config.pixel_format))
        })?;
        *self = Self {
            config: Some(config.clone()),
            frame_size,
            ..Self::default()
        };
        Ok(())
    }

    /// 打开后的配置
    pub(crate) fn config(&self) -> VencResult<&EncoderConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| VencError::Codec("编码器未打开, 请先调用 open()".into()))
    }

    /// 已编码帧数
    pub(crate) fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// 处理 `send_frame()` 的公共部分
    ///
    /// 返回需要编码的帧; 刷新信号返回 `None`.
    pub(crate) fn accept<'f>(
        &mut self,
        frame: Option<&'f VideoFrame>,
    ) -> VencResult<Option<&'f VideoFrame>> {
        let config = self.config()?;
        if !self.pending.is_empty() {
            return Err(VencError::NeedMoreData);
        }
        let frame = match frame {
            Some(f) => f,
            None => {
                self.flushing = true;
                return Ok(None);
            }
        };
        if self.flushing {
            return Err(VencError::Codec("编码器已刷新, 不再接受新帧".into()));
        }

        if frame.pixel_format != config.pixel_format
            || frame.width != config.width
            || frame.height != config.height
        {
            return Err(VencError::InvalidData(format!(
                "帧参数 {}x{} {} 与配置 {}x{} {} 不一致",
                frame.width,
                frame.height,
                frame.pixel_format,
                config.width,
                config.height,
                config.pixel_format,
            )));
        }
        let size = frame.data_size();
        if size != self.frame_size {
            return Err(VencError::InvalidData(format!(
                "帧数据大小 {} 与预期 {} 不匹配",
                size, self.frame_size,
            )));
        }
        Ok(Some(frame))
    }

    /// 放入一个编码完成的数据包
    pub(crate) fn push(&mut self, packet: Packet) {
        self.frame_count += 1;
        self.pending.push_back(packet);
    }

    /// 处理 `receive_packet()`
    pub(crate) fn receive(&mut self) -> VencResult<Packet> {
        self.config()?;
        if let Some(pkt) = self.pending.pop_front() {
            return Ok(pkt);
        }
        if self.flushing {
            return Err(VencError::Eof);
        }
        Err(VencError::NeedMoreData)
    }

    /// 清空待取出的数据包和刷新状态, 保留配置
    pub(crate) fn flush(&mut self) {
        self.pending.clear();
        self.flushing = false;
    }

    /// 关闭会话, 之后需要重新 open
    pub(crate) fn close(&mut self) {
        *self = Self::default();
    }
}
