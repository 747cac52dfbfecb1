//! 编码器标识.
//!
//! 一个编码器后端由 (编码类型, 硬件/软件变体) 唯一确定, 这个二元组是注册表的键.

use std::fmt;

/// 编码类型
///
/// 唯一标识一种压缩算法, 与具体实现 (硬件或软件) 无关.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum CodecType {
    /// Motion JPEG
    Mjpeg,
    /// H.264 / AVC / MPEG-4 Part 10
    H264,
}

impl CodecType {
    /// 获取编码类型的人类可读名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mjpeg => "mjpeg",
            Self::H264 => "h264",
        }
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 实现变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecVariant {
    /// 硬件编码单元
    Hardware,
    /// 纯软件实现
    Software,
}

impl CodecVariant {
    /// 是否为硬件实现
    pub const fn is_hardware(&self) -> bool {
        matches!(self, Self::Hardware)
    }

    /// 获取变体缩写 (hw / sw)
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hardware => "hw",
            Self::Software => "sw",
        }
    }
}

impl fmt::Display for CodecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 编码器标识 (注册表的键)
///
/// 任意时刻每个标识最多对应一个已注册的编码器描述.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodecIdentity {
    /// 编码类型
    pub codec_type: CodecType,
    /// 实现变体
    pub variant: CodecVariant,
}

impl CodecIdentity {
    /// 创建编码器标识
    pub const fn new(codec_type: CodecType, variant: CodecVariant) -> Self {
        Self {
            codec_type,
            variant,
        }
    }

    /// 硬件实现的标识
    pub const fn hardware(codec_type: CodecType) -> Self {
        Self::new(codec_type, CodecVariant::Hardware)
    }

    /// 软件实现的标识
    pub const fn software(codec_type: CodecType) -> Self {
        Self::new(codec_type, CodecVariant::Software)
    }
}

impl fmt::Display for CodecIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.codec_type, self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_标识显示() {
        assert_eq!(CodecIdentity::hardware(CodecType::Mjpeg).to_string(), "mjpeg(hw)");
        assert_eq!(CodecIdentity::software(CodecType::H264).to_string(), "h264(sw)");
    }

    #[test]
    fn test_同类型不同变体是不同标识() {
        let hw = CodecIdentity::hardware(CodecType::H264);
        let sw = CodecIdentity::software(CodecType::H264);
        assert_ne!(hw, sw);
        assert!(hw < sw);
        assert!(hw.variant.is_hardware());
        assert!(!sw.variant.is_hardware());
    }
}
