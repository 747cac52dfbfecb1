//! # venc-codec
//!
//! venc 视频编码器后端注册表.
//!
//! 编码器后端以 (编码类型, 硬件/软件变体) 为标识注册到 `CodecRegistry`,
//! 调用方按标识查找, 或按编码类型与变体偏好打开编码器.
//!
//! ## 内置后端
//!
//! - **MJPEG**: 硬件 (`mjpeg_hw`), 软件 (`mjpeg_sw`)
//! - **H.264**: 硬件 (`h264_hw`), 软件 (`h264_sw`, 需要 `openh264` feature)
//!
//! ## 使用示例
//!
//! ```rust
//! use venc_codec::{Backend, BackendSet, Bootstrap, CodecRegistry};
//!
//! let registry = CodecRegistry::new();
//! let bootstrap = Bootstrap::new(BackendSet::HW_MJPEG | BackendSet::SW_H264);
//! let report = bootstrap.register_enabled_backends(&registry);
//! assert!(report.is_ok());
//! assert!(registry.lookup(Backend::HwMjpeg.identity()).is_some());
//!
//! bootstrap.unregister_enabled_backends(&registry);
//! assert!(registry.is_empty());
//! ```

pub mod backend_set;
pub mod backends;
pub mod bootstrap;
pub mod codec_id;
pub mod descriptor;
pub mod encoder;
pub mod frame;
pub mod packet;
pub mod registry;
pub mod status;

// 重导出常用类型
pub use backend_set::{Backend, BackendSet};
pub use bootstrap::{
    BackendOutcome, Bootstrap, BootstrapReport, register_default, unregister_default,
};
pub use codec_id::{CodecIdentity, CodecType, CodecVariant};
pub use descriptor::{EncoderCaps, EncoderDescriptor, EncoderFactory, EncoderOps};
pub use encoder::{Encoder, EncoderConfig};
pub use frame::VideoFrame;
pub use packet::Packet;
pub use registry::{CodecRegistry, RegistryError, VariantPreference};
pub use status::RegisterStatus;
