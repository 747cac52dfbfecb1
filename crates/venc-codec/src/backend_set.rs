//! 内置后端及启用集合.
//!
//! 构建开关 (cargo feature) 与运行时配置最终都归结为一个 `BackendSet` 值,
//! 启动注册只依据这个值决定尝试哪些后端.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use venc_core::VencError;

use crate::backends;
use crate::codec_id::{CodecIdentity, CodecType};
use crate::descriptor::EncoderDescriptor;

/// 内置编码器后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 硬件 MJPEG
    HwMjpeg,
    /// 软件 MJPEG
    SwMjpeg,
    /// 硬件 H.264
    HwH264,
    /// 软件 H.264
    SwH264,
}

impl Backend {
    /// 所有内置后端, 按启动注册顺序排列
    pub const ALL: [Backend; 4] = [Self::HwMjpeg, Self::SwMjpeg, Self::HwH264, Self::SwH264];

    /// 后端对应的编码器标识
    pub const fn identity(&self) -> CodecIdentity {
        match self {
            Self::HwMjpeg => CodecIdentity::hardware(CodecType::Mjpeg),
            Self::SwMjpeg => CodecIdentity::software(CodecType::Mjpeg),
            Self::HwH264 => CodecIdentity::hardware(CodecType::H264),
            Self::SwH264 => CodecIdentity::software(CodecType::H264),
        }
    }

    /// 后端在启用集合中的标志位
    pub const fn flag(&self) -> BackendSet {
        match self {
            Self::HwMjpeg => BackendSet::HW_MJPEG,
            Self::SwMjpeg => BackendSet::SW_MJPEG,
            Self::HwH264 => BackendSet::HW_H264,
            Self::SwH264 => BackendSet::SW_H264,
        }
    }

    /// 配置中使用的名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HwMjpeg => "hw_mjpeg",
            Self::SwMjpeg => "sw_mjpeg",
            Self::HwH264 => "hw_h264",
            Self::SwH264 => "sw_h264",
        }
    }

    /// 后端的内置编码器描述
    pub fn descriptor(&self) -> EncoderDescriptor {
        match self {
            Self::HwMjpeg => backends::mjpeg::hw_descriptor(),
            Self::SwMjpeg => backends::mjpeg::sw_descriptor(),
            Self::HwH264 => backends::h264::hw_descriptor(),
            Self::SwH264 => backends::h264::sw_descriptor(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Backend {
    type Err = VencError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Backend::ALL
            .into_iter()
            .find(|backend| backend.name() == name)
            .ok_or_else(|| VencError::InvalidArgument(format!("未知的编码器后端: {s}")))
    }
}

impl Serialize for Backend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// 与环境变量走同一条解析路径, 名称不区分大小写
impl<'de> Deserialize<'de> for Backend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

bitflags! {
    /// 启用的后端集合
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BackendSet: u8 {
        /// 硬件 MJPEG
        const HW_MJPEG = 1 << 0;
        /// 软件 MJPEG
        const SW_MJPEG = 1 << 1;
        /// 硬件 H.264
        const HW_H264 = 1 << 2;
        /// 软件 H.264
        const SW_H264 = 1 << 3;
    }
}

impl BackendSet {
    /// 构建时由 cargo feature 选定的集合
    pub fn from_build() -> Self {
        let mut set = Self::empty();
        set.set(Self::HW_MJPEG, cfg!(feature = "hw-mjpeg"));
        set.set(Self::SW_MJPEG, cfg!(feature = "sw-mjpeg"));
        set.set(Self::HW_H264, cfg!(feature = "hw-h264"));
        set.set(Self::SW_H264, cfg!(feature = "sw-h264"));
        set
    }

    /// 是否启用了指定后端
    pub fn is_enabled(&self, backend: Backend) -> bool {
        self.contains(backend.flag())
    }

    /// 按启动注册顺序遍历启用的后端
    pub fn backends(&self) -> impl Iterator<Item = Backend> + '_ {
        Backend::ALL
            .into_iter()
            .filter(move |backend| self.is_enabled(*backend))
    }

    /// 解析逗号分隔的后端名称列表, 空字符串表示空集合
    pub fn parse_list(list: &str) -> Result<Self, VencError> {
        list.split(',')
            .filter(|name| !name.trim().is_empty())
            .map(Backend::from_str)
            .collect()
    }
}

impl FromIterator<Backend> for BackendSet {
    fn from_iter<I: IntoIterator<Item = Backend>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, backend| set | backend.flag())
    }
}

impl Serialize for BackendSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.backends())
    }
}

impl<'de> Deserialize<'de> for BackendSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let backends = Vec::<Backend>::deserialize(deserializer)?;
        Ok(backends.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_遍历顺序固定() {
        let set = BackendSet::SW_H264 | BackendSet::HW_MJPEG;
        let backends: Vec<Backend> = set.backends().collect();
        assert_eq!(backends, vec![Backend::HwMjpeg, Backend::SwH264]);
        assert_eq!(BackendSet::empty().backends().count(), 0);
        assert_eq!(BackendSet::all().backends().count(), 4);
    }

    #[test]
    fn test_默认构建启用全部后端() {
        // 默认 feature 打开全部四个开关
        if cfg!(all(
            feature = "hw-mjpeg",
            feature = "sw-mjpeg",
            feature = "hw-h264",
            feature = "sw-h264"
        )) {
            assert_eq!(BackendSet::from_build(), BackendSet::all());
        }
    }

    #[test]
    fn test_解析名称列表() {
        let set = BackendSet::parse_list("hw_mjpeg, SW_H264").unwrap();
        assert_eq!(set, BackendSet::HW_MJPEG | BackendSet::SW_H264);
        assert_eq!(BackendSet::parse_list("").unwrap(), BackendSet::empty());
        assert!(BackendSet::parse_list("hw_mjpeg,vp9").is_err());
    }

    #[test]
    fn test_serde_名称列表() {
        let set: BackendSet = serde_json::from_str(r#"["sw_mjpeg", "hw_h264"]"#).unwrap();
        assert_eq!(set, BackendSet::SW_MJPEG | BackendSet::HW_H264);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["sw_mjpeg","hw_h264"]"#);
        assert!(serde_json::from_str::<BackendSet>(r#"["av1"]"#).is_err());
    }

    #[test]
    fn test_配置与环境变量大小写一致() {
        let from_json: BackendSet = serde_json::from_str(r#"["HW_MJPEG", " Sw_H264 "]"#).unwrap();
        let from_env = BackendSet::parse_list("HW_MJPEG, Sw_H264").unwrap();
        assert_eq!(from_json, from_env);
        assert_eq!(from_json, BackendSet::HW_MJPEG | BackendSet::SW_H264);

        let backend: Backend = serde_json::from_str(r#""SW_MJPEG""#).unwrap();
        assert_eq!(backend, Backend::SwMjpeg);
        assert_eq!(serde_json::to_string(&backend).unwrap(), r#""sw_mjpeg""#);
    }

    #[test]
    fn test_后端与标识一一对应() {
        for backend in Backend::ALL {
            assert_eq!(backend.descriptor().identity, backend.identity());
            assert!(backend.descriptor().validate().is_ok(), "{backend}");
            assert_eq!(backend.name().parse::<Backend>().unwrap(), backend);
        }
    }
}
