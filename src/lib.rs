//! # venc
//!
//! 视频编码器后端注册框架.
//!
//! 编码器后端 (硬件/软件 MJPEG, 硬件/软件 H.264) 按 (编码类型, 变体) 注册到
//! 编码器注册表, 启动时按启用集合批量注册, 关闭时批量注销.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use venc::config::VencConfig;
//!
//! let config = VencConfig::from_file("venc.json").unwrap_or_default();
//! let report = venc::init(&config);
//! if !report.is_ok() {
//!     eprintln!("部分编码器不可用: {}", report.status());
//! }
//! // ...
//! venc::shutdown(&config);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `venc-core` | 错误类型与像素格式 |
//! | `venc-codec` | 编码器标识、描述、注册表与内置后端 |

pub mod config;
pub mod logging;

/// 核心类型
pub use venc_core as core;

/// 编码器注册表与后端
pub use venc_codec as codec;

use tracing::{info, warn};

use crate::codec::{Bootstrap, BootstrapReport, CodecRegistry};
use crate::config::VencConfig;

/// 获取 venc 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册构建时启用后端的独立注册表
pub fn default_codec_registry() -> CodecRegistry {
    let registry = CodecRegistry::new();
    Bootstrap::from_build().register_enabled_backends(&registry);
    registry
}

/// 按配置把启用的后端注册到进程级注册表
///
/// 返回的报告仅供参考, 部分后端失败时其余后端仍然可用.
pub fn init(config: &VencConfig) -> BootstrapReport {
    let report =
        Bootstrap::new(config.encoders).register_enabled_backends(CodecRegistry::global());
    for (backend, err) in report.failures() {
        warn!("编码器后端 {} 不可用: {}", backend, err);
    }
    info!(
        "已注册编码器: {:?}",
        CodecRegistry::global()
            .list()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
    report
}

/// 从进程级注册表注销配置中启用的后端
pub fn shutdown(config: &VencConfig) {
    Bootstrap::new(config.encoders).unregister_enabled_backends(CodecRegistry::global());
    info!("已注销编码器后端");
}
