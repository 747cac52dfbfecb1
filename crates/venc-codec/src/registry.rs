//! 编码器注册表.
//!
//! 以 `CodecIdentity` 为键保存编码器描述, 支持注册、注销、查找与按类型选择实例化.
//! 写操作 (注册/注销/清空) 持有写锁, 查找与枚举只持有读锁, 可以跨线程共享.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use thiserror::Error;
use venc_core::{VencError, VencResult};

use crate::codec_id::{CodecIdentity, CodecType, CodecVariant};
use crate::descriptor::{EncoderCaps, EncoderDescriptor};
use crate::encoder::{Encoder, EncoderConfig};

/// 注册失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// 该标识已有注册项
    #[error("编码器 {0} 已注册")]
    AlreadyRegistered(CodecIdentity),

    /// 描述不完整 (函数表缺失、能力声明无效等)
    #[error("编码器 {identity} 描述无效: {reason}")]
    InvalidDescriptor {
        /// 被拒绝的标识
        identity: CodecIdentity,
        /// 原因
        reason: String,
    },
}

impl RegistryError {
    /// 出错的编码器标识
    pub fn identity(&self) -> CodecIdentity {
        match self {
            Self::AlreadyRegistered(identity) => *identity,
            Self::InvalidDescriptor { identity, .. } => *identity,
        }
    }
}

impl From<RegistryError> for VencError {
    fn from(err: RegistryError) -> Self {
        VencError::Codec(err.to_string())
    }
}

/// 按编码类型选择变体时的偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariantPreference {
    /// 优先硬件, 不可用时退回软件
    #[default]
    PreferHardware,
    /// 优先软件, 不可用时退回硬件
    PreferSoftware,
    /// 只接受指定变体
    Only(CodecVariant),
}

impl VariantPreference {
    /// 按偏好排列的候选变体
    pub fn candidates(&self) -> &'static [CodecVariant] {
        match self {
            Self::PreferHardware => &[CodecVariant::Hardware, CodecVariant::Software],
            Self::PreferSoftware => &[CodecVariant::Software, CodecVariant::Hardware],
            Self::Only(CodecVariant::Hardware) => &[CodecVariant::Hardware],
            Self::Only(CodecVariant::Software) => &[CodecVariant::Software],
        }
    }
}

/// 编码器注册表
pub struct CodecRegistry {
    /// 标识 -> 描述
    encoders: RwLock<HashMap<CodecIdentity, Arc<EncoderDescriptor>>>,
}

static GLOBAL_REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            encoders: RwLock::new(HashMap::new()),
        }
    }

    /// 进程级注册表, 首次访问时创建
    pub fn global() -> &'static CodecRegistry {
        GLOBAL_REGISTRY.get_or_init(CodecRegistry::new)
    }

    // 任何写操作都不会让映射处于中间状态, 锁中毒后直接取回数据
    fn read(&self) -> RwLockReadGuard<'_, HashMap<CodecIdentity, Arc<EncoderDescriptor>>> {
        self.encoders
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CodecIdentity, Arc<EncoderDescriptor>>> {
        self.encoders
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 注册一个编码器
    ///
    /// 标识已存在时返回 `AlreadyRegistered` 且保留原注册项;
    /// 描述不完整时返回 `InvalidDescriptor`.
    pub fn register(&self, descriptor: EncoderDescriptor) -> Result<(), RegistryError> {
        let identity = descriptor.identity;
        descriptor
            .validate()
            .map_err(|reason| RegistryError::InvalidDescriptor { identity, reason })?;

        let mut encoders = self.write();
        if encoders.contains_key(&identity) {
            return Err(RegistryError::AlreadyRegistered(identity));
        }
        debug!("注册编码器 {} ({})", identity, descriptor.name);
        encoders.insert(identity, Arc::new(descriptor));
        Ok(())
    }

    /// 注销一个编码器
    ///
    /// 标识不存在时为空操作. 返回是否确实移除了注册项.
    pub fn unregister(&self, identity: CodecIdentity) -> bool {
        let removed = self.write().remove(&identity);
        match removed {
            Some(descriptor) => {
                debug!("注销编码器 {} ({})", identity, descriptor.name);
                true
            }
            None => false,
        }
    }

    /// 查找指定标识的编码器描述
    pub fn lookup(&self, identity: CodecIdentity) -> Option<Arc<EncoderDescriptor>> {
        self.read().get(&identity).cloned()
    }

    /// 是否已注册指定标识
    pub fn contains(&self, identity: CodecIdentity) -> bool {
        self.read().contains_key(&identity)
    }

    /// 获取所有已注册的编码器标识 (有序)
    pub fn list(&self) -> Vec<CodecIdentity> {
        let mut identities: Vec<CodecIdentity> = self.read().keys().copied().collect();
        identities.sort();
        identities
    }

    /// 已注册的编码器数量
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// 清空注册表
    pub fn clear(&self) {
        let mut encoders = self.write();
        if !encoders.is_empty() {
            debug!("清空编码器注册表, 共 {} 项", encoders.len());
        }
        encoders.clear();
    }

    /// 查询指定编码器的能力声明
    pub fn query_caps(&self, identity: CodecIdentity) -> Option<EncoderCaps> {
        self.read().get(&identity).map(|desc| desc.caps.clone())
    }

    /// 按偏好为编码类型选择一个已注册的变体
    pub fn find(
        &self,
        codec_type: CodecType,
        preference: VariantPreference,
    ) -> Option<Arc<EncoderDescriptor>> {
        let encoders = self.read();
        preference
            .candidates()
            .iter()
            .find_map(|variant| encoders.get(&CodecIdentity::new(codec_type, *variant)))
            .cloned()
    }

    /// 创建指定标识的编码器实例
    pub fn create_encoder(&self, identity: CodecIdentity) -> VencResult<Box<dyn Encoder>> {
        let descriptor = self
            .lookup(identity)
            .ok_or_else(|| VencError::CodecNotFound(identity.to_string()))?;
        descriptor.create_encoder()
    }

    /// 按偏好依次尝试编码类型的各个变体, 返回第一个成功打开的编码器
    ///
    /// 能力不满足或 `open()` 失败的变体会被跳过; 所有变体都失败时返回最后一个错误.
    pub fn open_encoder(
        &self,
        codec_type: CodecType,
        preference: VariantPreference,
        config: &EncoderConfig,
    ) -> VencResult<Box<dyn Encoder>> {
        // 先复制候选, 打开编码器期间不持有读锁
        let candidates: Vec<Arc<EncoderDescriptor>> = {
            let encoders = self.read();
            preference
                .candidates()
                .iter()
                .filter_map(|variant| encoders.get(&CodecIdentity::new(codec_type, *variant)))
                .cloned()
                .collect()
        };

        let mut last_err = None;
        for descriptor in candidates {
            let attempt = descriptor.caps.supports(config).and_then(|_| {
                let mut encoder = descriptor.create_encoder()?;
                encoder.open(config)?;
                Ok(encoder)
            });
            match attempt {
                Ok(encoder) => {
                    debug!(
                        "打开编码器 {}: {}x{}, 格式={}",
                        descriptor.identity, config.width, config.height, config.pixel_format,
                    );
                    return Ok(encoder);
                }
                Err(err) => {
                    debug!("跳过编码器 {}: {}", descriptor.identity, err);
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| VencError::CodecNotFound(codec_type.to_string())))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EncoderOps;
    use crate::frame::VideoFrame;
    use crate::packet::Packet;
    use venc_core::PixelFormat;

    /// 不产生任何输出的测试编码器
    struct NullEncoder {
        identity: CodecIdentity,
    }

    impl Encoder for NullEncoder {
        fn identity(&self) -> CodecIdentity {
            self.identity
        }

        fn name(&self) -> &str {
            "null"
        }

        fn open(&mut self, _config: &EncoderConfig) -> VencResult<()> {
            Ok(())
        }

        fn send_frame(&mut self, _frame: Option<&VideoFrame>) -> VencResult<()> {
            Ok(())
        }

        fn receive_packet(&mut self) -> VencResult<Packet> {
            Err(VencError::NeedMoreData)
        }

        fn flush(&mut self) {}
    }

    fn create_sw_h264() -> VencResult<Box<dyn Encoder>> {
        Ok(Box::new(NullEncoder {
            identity: CodecIdentity::software(CodecType::H264),
        }))
    }

    fn create_unavailable() -> VencResult<Box<dyn Encoder>> {
        Err(VencError::Unsupported("没有硬件".into()))
    }

    fn caps() -> EncoderCaps {
        EncoderCaps {
            input_formats: vec![PixelFormat::Yuv420p],
            min_width: 16,
            max_width: 4096,
            min_height: 16,
            max_height: 4096,
            align: 16,
        }
    }

    fn descriptor(identity: CodecIdentity, name: &str) -> EncoderDescriptor {
        EncoderDescriptor::new(identity, name, caps(), create_sw_h264)
    }

    #[test]
    fn test_注册后可查找_注销后不可查找() {
        let registry = CodecRegistry::new();
        let id = CodecIdentity::software(CodecType::H264);

        registry.register(descriptor(id, "first")).unwrap();
        let found = registry.lookup(id).expect("注册后应能查找到");
        assert_eq!(found.name, "first");
        assert_eq!(found.identity, id);

        assert!(registry.unregister(id));
        assert!(registry.lookup(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_重复注册被拒绝且不覆盖() {
        let registry = CodecRegistry::new();
        let id = CodecIdentity::hardware(CodecType::Mjpeg);

        registry.register(descriptor(id, "first")).unwrap();
        let err = registry.register(descriptor(id, "second")).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered(id));
        assert_eq!(err.identity(), id);
        assert_eq!(registry.lookup(id).unwrap().name, "first");
        assert_eq!(registry.len(), 1);

        // 注销后可以重新注册
        registry.unregister(id);
        registry.register(descriptor(id, "second")).unwrap();
        assert_eq!(registry.lookup(id).unwrap().name, "second");
    }

    #[test]
    fn test_注销不存在的标识为空操作() {
        let registry = CodecRegistry::new();
        assert!(!registry.unregister(CodecIdentity::hardware(CodecType::H264)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_无效描述被拒绝() {
        let registry = CodecRegistry::new();
        let id = CodecIdentity::software(CodecType::Mjpeg);
        let mut desc = descriptor(id, "broken");
        desc.ops = EncoderOps::default();

        let err = registry.register(desc).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDescriptor { identity, .. } if identity == id));
        assert!(!registry.contains(id));
    }

    #[test]
    fn test_列表有序() {
        let registry = CodecRegistry::new();
        let ids = [
            CodecIdentity::software(CodecType::H264),
            CodecIdentity::hardware(CodecType::Mjpeg),
            CodecIdentity::hardware(CodecType::H264),
        ];
        for id in ids {
            registry.register(descriptor(id, "x")).unwrap();
        }
        assert_eq!(
            registry.list(),
            vec![
                CodecIdentity::hardware(CodecType::Mjpeg),
                CodecIdentity::hardware(CodecType::H264),
                CodecIdentity::software(CodecType::H264),
            ]
        );

        registry.clear();
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_按偏好选择变体() {
        let registry = CodecRegistry::new();
        let hw = CodecIdentity::hardware(CodecType::H264);
        let sw = CodecIdentity::software(CodecType::H264);
        registry.register(descriptor(sw, "sw")).unwrap();

        let found = registry.find(CodecType::H264, VariantPreference::PreferHardware);
        assert_eq!(found.unwrap().identity, sw);
        assert!(
            registry
                .find(CodecType::H264, VariantPreference::Only(CodecVariant::Hardware))
                .is_none()
        );

        registry.register(descriptor(hw, "hw")).unwrap();
        let found = registry.find(CodecType::H264, VariantPreference::default());
        assert_eq!(found.unwrap().identity, hw);
        let found = registry.find(CodecType::H264, VariantPreference::PreferSoftware);
        assert_eq!(found.unwrap().identity, sw);
        assert!(registry.find(CodecType::Mjpeg, VariantPreference::default()).is_none());
    }

    #[test]
    fn test_打开编码器时跳过不可用的变体() {
        let registry = CodecRegistry::new();
        let hw = CodecIdentity::hardware(CodecType::H264);
        let sw = CodecIdentity::software(CodecType::H264);
        registry
            .register(EncoderDescriptor::new(hw, "hw", caps(), create_unavailable))
            .unwrap();
        registry.register(descriptor(sw, "sw")).unwrap();

        let config = EncoderConfig::new(640, 480, PixelFormat::Yuv420p);
        let encoder = registry
            .open_encoder(CodecType::H264, VariantPreference::PreferHardware, &config)
            .unwrap();
        assert_eq!(encoder.identity(), sw);

        let err = registry
            .open_encoder(
                CodecType::H264,
                VariantPreference::Only(CodecVariant::Hardware),
                &config,
            )
            .err()
            .unwrap();
        assert!(matches!(err, VencError::Unsupported(_)));

        let err = registry
            .open_encoder(CodecType::Mjpeg, VariantPreference::default(), &config)
            .err()
            .unwrap();
        assert!(matches!(err, VencError::CodecNotFound(_)));
    }

    #[test]
    fn test_未注册的编码器返回错误() {
        let registry = CodecRegistry::new();
        let id = CodecIdentity::hardware(CodecType::H264);
        assert!(matches!(
            registry.create_encoder(id),
            Err(VencError::CodecNotFound(_))
        ));
        assert!(registry.query_caps(id).is_none());
    }

    #[test]
    fn test_多线程并发读写() {
        let registry = Arc::new(CodecRegistry::new());
        let ids = [
            CodecIdentity::hardware(CodecType::Mjpeg),
            CodecIdentity::software(CodecType::Mjpeg),
            CodecIdentity::hardware(CodecType::H264),
            CodecIdentity::software(CodecType::H264),
        ];

        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let registry = Arc::clone(&registry);
                let id = *id;
                std::thread::spawn(move || {
                    // 同一标识并发注册, 只能有一次成功
                    let ok = (0..4)
                        .filter(|_| registry.register(descriptor(id, "x")).is_ok())
                        .count();
                    let _ = registry.list();
                    ok
                })
            })
            .collect();

        let successes: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(successes, ids.len());
        assert_eq!(registry.len(), ids.len());
    }
}
