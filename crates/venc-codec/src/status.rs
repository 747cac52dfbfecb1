//! 注册状态码及其合并规则.

use std::fmt;

use crate::registry::RegistryError;

/// 单次或合并后的注册状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegisterStatus {
    /// 全部成功
    #[default]
    Ok,
    /// 存在重复注册
    AlreadyRegistered,
    /// 存在无效描述
    InvalidDescriptor,
}

impl RegisterStatus {
    /// 是否成功
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// 合并两个状态: 保留第一个非 Ok 的值
    pub const fn combine(self, other: Self) -> Self {
        match self {
            Self::Ok => other,
            _ => self,
        }
    }
}

impl From<&RegistryError> for RegisterStatus {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::AlreadyRegistered(_) => Self::AlreadyRegistered,
            RegistryError::InvalidDescriptor { .. } => Self::InvalidDescriptor,
        }
    }
}

impl From<&Result<(), RegistryError>> for RegisterStatus {
    fn from(result: &Result<(), RegistryError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(err) => err.into(),
        }
    }
}

impl FromIterator<RegisterStatus> for RegisterStatus {
    fn from_iter<I: IntoIterator<Item = RegisterStatus>>(iter: I) -> Self {
        iter.into_iter().fold(Self::Ok, Self::combine)
    }
}

impl fmt::Display for RegisterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::AlreadyRegistered => "already_registered",
            Self::InvalidDescriptor => "invalid_descriptor",
        };
        write!(f, "{name}")
    }
}
