//! 像素格式定义.
//!
//! 描述编码器输入帧中像素的存储格式, 供能力声明与帧大小校验使用.

use std::fmt;

/// 像素格式
///
/// 命名规则: 颜色空间 + 排列方式 (P=Planar, LE=小端).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 未指定
    None,

    // ========================
    // YUV 格式
    // ========================
    /// YUV 4:2:0 平面格式, 8 位 (H.264 默认输入)
    Yuv420p,
    /// NV12: Y 平面 + UV 交错, 4:2:0, 8 位 (硬件编码单元常用)
    Nv12,
    /// YUYV 4:2:2 打包格式, 8 位 (摄像头常见输出)
    Yuyv,

    // ========================
    // RGB 打包格式
    // ========================
    /// RGB565 小端, 每像素 2 字节
    Rgb565le,
    /// RGB 各 8 位, 打包
    Rgb24,

    // ========================
    // 灰度格式
    // ========================
    /// 灰度 8 位
    Gray8,
}

impl PixelFormat {
    /// 平面数量
    pub const fn plane_count(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Yuv420p => 3,
            Self::Nv12 => 2,
            Self::Yuyv | Self::Rgb565le | Self::Rgb24 | Self::Gray8 => 1,
        }
    }

    /// 获取色度子采样 (log2 水平, log2 垂直)
    pub const fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Nv12 => (1, 1),
            Self::Yuyv => (1, 0),
            _ => (0, 0),
        }
    }

    /// 计算指定平面每行的字节数
    ///
    /// 格式为 None 或平面索引超出范围时返回 `None`.
    pub fn plane_linesize(&self, plane: usize, width: u32) -> Option<usize> {
        if *self == Self::None || plane >= self.plane_count() as usize {
            return None;
        }
        let w = width as usize;
        Some(match self {
            Self::Yuv420p => {
                if plane == 0 {
                    w
                } else {
                    w.div_ceil(2)
                }
            }
            // plane1 为 UV 交错, 每行 (w/2)*2 字节
            Self::Nv12 => {
                if plane == 0 {
                    w
                } else {
                    w.div_ceil(2) * 2
                }
            }
            Self::Yuyv | Self::Rgb565le => w * 2,
            Self::Rgb24 => w * 3,
            Self::Gray8 => w,
            Self::None => return None,
        })
    }

    /// 计算指定平面的行数
    pub fn plane_height(&self, plane: usize, height: u32) -> Option<usize> {
        if *self == Self::None || plane >= self.plane_count() as usize {
            return None;
        }
        let h = height as usize;
        Some(match self {
            Self::Yuv420p | Self::Nv12 if plane > 0 => h.div_ceil(2),
            _ => h,
        })
    }

    /// 计算整帧的字节数, 格式为 None 时返回 `None`
    pub fn frame_size(&self, width: u32, height: u32) -> Option<usize> {
        if *self == Self::None {
            return None;
        }
        let mut total = 0usize;
        for plane in 0..self.plane_count() as usize {
            total += self.plane_linesize(plane, width)? * self.plane_height(plane, height)?;
        }
        Some(total)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Yuv420p => "yuv420p",
            Self::Nv12 => "nv12",
            Self::Yuyv => "yuyv422",
            Self::Rgb565le => "rgb565le",
            Self::Rgb24 => "rgb24",
            Self::Gray8 => "gray",
        };
        write!(f, "{name}")
    }
}
