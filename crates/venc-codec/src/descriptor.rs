//! 编码器描述.
//!
//! 描述一个编码器后端: 它的标识、声明的能力以及创建编码器实例的函数表.
//! 描述注册后由注册表独占持有, 之后只以 `Arc` 的形式共享只读访问.

use venc_core::{PixelFormat, VencError, VencResult};

use crate::codec_id::CodecIdentity;
use crate::encoder::{Encoder, EncoderConfig};

/// 编码器工厂函数类型
pub type EncoderFactory = fn() -> VencResult<Box<dyn Encoder>>;

/// 编码器函数表
///
/// `create` 产生的编码器实例负责 open / encode / close 的其余步骤.
/// 缺失的表项会在注册时被拒绝.
#[derive(Clone, Copy, Default)]
pub struct EncoderOps {
    /// 创建编码器实例
    pub create: Option<EncoderFactory>,
}

impl std::fmt::Debug for EncoderOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderOps")
            .field("create", &self.create.is_some())
            .finish()
    }
}

/// 编码器能力声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCaps {
    /// 支持的输入像素格式
    pub input_formats: Vec<PixelFormat>,
    /// 最小宽度
    pub min_width: u32,
    /// 最大宽度
    pub max_width: u32,
    /// 最小高度
    pub min_height: u32,
    /// 最大高度
    pub max_height: u32,
    /// 宽高对齐要求 (2 的幂, 1 表示无要求)
    pub align: u32,
}

impl EncoderCaps {
    /// 检查声明本身是否完整
    fn validate(&self) -> Result<(), String> {
        if self.input_formats.is_empty() {
            return Err("未声明任何输入像素格式".into());
        }
        if self.input_formats.contains(&PixelFormat::None) {
            return Err("输入像素格式不能为 None".into());
        }
        if self.min_width == 0 || self.min_height == 0 {
            return Err("最小分辨率不能为 0".into());
        }
        if self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(format!(
                "分辨率范围无效: {}x{} ~ {}x{}",
                self.min_width, self.min_height, self.max_width, self.max_height,
            ));
        }
        if !self.align.is_power_of_two() {
            return Err(format!("对齐要求 {} 不是 2 的幂", self.align));
        }
        Ok(())
    }

    /// 是否接受指定的输入像素格式
    pub fn accepts_format(&self, pixel_format: PixelFormat) -> bool {
        self.input_formats.contains(&pixel_format)
    }

    /// 检查编码配置是否在能力范围内
    pub fn supports(&self, config: &EncoderConfig) -> VencResult<()> {
        if !self.align.is_power_of_two() {
            return Err(VencError::InvalidArgument(format!(
                "对齐要求 {} 不是 2 的幂",
                self.align,
            )));
        }
        if !self.accepts_format(config.pixel_format) {
            return Err(VencError::Unsupported(format!(
                "不支持的输入像素格式 {}",
                config.pixel_format,
            )));
        }
        if config.width < self.min_width
            || config.width > self.max_width
            || config.height < self.min_height
            || config.height > self.max_height
        {
            return Err(VencError::Unsupported(format!(
                "分辨率 {}x{} 超出范围 {}x{} ~ {}x{}",
                config.width,
                config.height,
                self.min_width,
                self.min_height,
                self.max_width,
                self.max_height,
            )));
        }
        if config.width % self.align != 0 || config.height % self.align != 0 {
            return Err(VencError::Unsupported(format!(
                "分辨率 {}x{} 未按 {} 对齐",
                config.width, config.height, self.align,
            )));
        }
        if config.fps == 0 {
            return Err(VencError::InvalidArgument("帧率不能为 0".into()));
        }
        Ok(())
    }
}

/// 编码器描述
#[derive(Debug, Clone)]
pub struct EncoderDescriptor {
    /// 编码器标识
    pub identity: CodecIdentity,
    /// 后端名称 (如 "mjpeg_sw")
    pub name: String,
    /// 能力声明
    pub caps: EncoderCaps,
    /// 函数表
    pub ops: EncoderOps,
}

impl EncoderDescriptor {
    /// 创建函数表完整的描述
    pub fn new(
        identity: CodecIdentity,
        name: impl Into<String>,
        caps: EncoderCaps,
        factory: EncoderFactory,
    ) -> Self {
        Self {
            identity,
            name: name.into(),
            caps,
            ops: EncoderOps {
                create: Some(factory),
            },
        }
    }

    /// 检查描述是否完整, 返回不完整的原因
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("后端名称为空".into());
        }
        if self.ops.create.is_none() {
            return Err("函数表缺少 create".into());
        }
        self.caps.validate()
    }

    /// 通过函数表创建编码器实例
    pub fn create_encoder(&self) -> VencResult<Box<dyn Encoder>> {
        let factory = self.ops.create.ok_or_else(|| {
            VencError::Internal(format!("{} 的函数表缺少 create", self.identity))
        })?;
        factory()
    }
}
