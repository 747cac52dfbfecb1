//! 启动注册与注销.
//!
//! 按启用集合把内置后端写入注册表. 注册时逐个尝试所有启用的后端, 不会因为某个
//! 后端失败而中止, 失败会合并进最终状态; 注销时忽略每一项的结果, 不返回状态.

use log::{debug, warn};
use venc_core::{VencError, VencResult};

use crate::backend_set::{Backend, BackendSet};
use crate::descriptor::EncoderDescriptor;
use crate::registry::{CodecRegistry, RegistryError};
use crate::status::RegisterStatus;

/// 后端描述来源
pub type DescriptorSource = fn(Backend) -> EncoderDescriptor;

/// 单个后端的注册结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutcome {
    /// 后端
    pub backend: Backend,
    /// 注册结果
    pub result: Result<(), RegistryError>,
}

/// 启动注册报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    outcomes: Vec<BackendOutcome>,
}

impl BootstrapReport {
    /// 合并后的状态, 没有尝试任何后端时为 Ok
    pub fn status(&self) -> RegisterStatus {
        self.outcomes
            .iter()
            .map(|outcome| RegisterStatus::from(&outcome.result))
            .collect()
    }

    /// 是否全部成功
    pub fn is_ok(&self) -> bool {
        self.status().is_ok()
    }

    /// 每个尝试过的后端的结果, 按注册顺序
    pub fn outcomes(&self) -> &[BackendOutcome] {
        &self.outcomes
    }

    /// 注册成功的后端
    pub fn registered(&self) -> Vec<Backend> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .map(|outcome| outcome.backend)
            .collect()
    }

    /// 注册失败的后端及原因
    pub fn failures(&self) -> Vec<(Backend, &RegistryError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                Ok(()) => None,
                Err(err) => Some((outcome.backend, err)),
            })
            .collect()
    }

    /// 转换为 Result, 任一后端失败时返回 `VencError::Bootstrap`
    pub fn into_result(self) -> VencResult<()> {
        let failures = self.failures();
        if failures.is_empty() {
            return Ok(());
        }
        let detail = failures
            .iter()
            .map(|(_, err)| err.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(VencError::Bootstrap(detail))
    }
}

/// 启动注册器
#[derive(Debug, Clone, Copy)]
pub struct Bootstrap {
    enabled: BackendSet,
    source: DescriptorSource,
}

fn builtin_descriptor(backend: Backend) -> EncoderDescriptor {
    backend.descriptor()
}

impl Bootstrap {
    /// 使用内置描述创建启动注册器
    pub fn new(enabled: BackendSet) -> Self {
        Self {
            enabled,
            source: builtin_descriptor,
        }
    }

    /// 使用构建时启用的集合创建启动注册器
    pub fn from_build() -> Self {
        Self::new(BackendSet::from_build())
    }

    /// 替换描述来源
    pub fn with_source(mut self, source: DescriptorSource) -> Self {
        self.source = source;
        self
    }

    /// 启用的后端集合
    pub fn enabled(&self) -> BackendSet {
        self.enabled
    }

    /// 注册所有启用的后端
    ///
    /// 每个启用的后端都会被尝试, 结果逐项记录在报告中.
    pub fn register_enabled_backends(&self, registry: &CodecRegistry) -> BootstrapReport {
        let outcomes: Vec<BackendOutcome> = self
            .enabled
            .backends()
            .map(|backend| {
                let result = registry.register((self.source)(backend));
                if let Err(err) = &result {
                    warn!("注册后端 {} 失败: {}", backend, err);
                }
                BackendOutcome { backend, result }
            })
            .collect();

        let report = BootstrapReport { outcomes };
        debug!(
            "启动注册完成: 尝试 {} 个后端, 状态 {}",
            report.outcomes.len(),
            report.status(),
        );
        report
    }

    /// 注销所有启用的后端, 忽略每一项的结果
    pub fn unregister_enabled_backends(&self, registry: &CodecRegistry) {
        for backend in self.enabled.backends() {
            registry.unregister(backend.identity());
        }
    }
}

/// 在进程级注册表上注册构建时启用的后端
pub fn register_default() -> BootstrapReport {
    Bootstrap::from_build().register_enabled_backends(CodecRegistry::global())
}

/// 在进程级注册表上注销构建时启用的后端
pub fn unregister_default() {
    Bootstrap::from_build().unregister_enabled_backends(CodecRegistry::global());
}
