//! 编码器输入的原始视频帧.

use venc_core::PixelFormat;

/// 时间戳未设置时的取值
pub const NOPTS_VALUE: i64 = i64::MIN;

/// 原始视频帧
///
/// 支持多平面存储, 例如 YUV420P 有 Y/U/V 三个平面.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 各平面的像素数据
    pub data: Vec<Vec<u8>>,
    /// 各平面每行的字节数
    pub linesize: Vec<usize>,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 帧时长
    pub duration: i64,
}

impl VideoFrame {
    /// 创建空的视频帧
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        let plane_count = pixel_format.plane_count() as usize;
        Self {
            data: vec![Vec::new(); plane_count],
            linesize: vec![0; plane_count],
            width,
            height,
            pixel_format,
            pts: NOPTS_VALUE,
            duration: 0,
        }
    }

    /// 按像素格式分配填充好的帧, 每个平面按紧凑 linesize 填入 `fill`
    pub fn filled(width: u32, height: u32, pixel_format: PixelFormat, fill: u8) -> Self {
        let mut frame = Self::new(width, height, pixel_format);
        for plane in 0..frame.data.len() {
            let linesize = pixel_format.plane_linesize(plane, width).unwrap_or(0);
            let rows = pixel_format.plane_height(plane, height).unwrap_or(0);
            frame.data[plane] = vec![fill; linesize * rows];
            frame.linesize[plane] = linesize;
        }
        frame
    }

    /// 所有平面数据的总字节数
    pub fn data_size(&self) -> usize {
        self.data.iter().map(Vec::len).sum()
    }

    /// 拼接所有平面为一段连续数据
    pub fn to_contiguous(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.data_size());
        for plane in &self.data {
            buf.extend_from_slice(plane);
        }
        buf
    }
}
