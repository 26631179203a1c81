//! ABAP 语言目标版本
//!
//! 版本作为显式参数传递给词法分析器和语法表构建，不存在全局默认配置

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 语言目标版本（按发布顺序排列，`Cloud` 包含所有特性）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Version {
    #[serde(rename = "v700")]
    V700,
    #[serde(rename = "v702")]
    V702,
    #[serde(rename = "v740sp02")]
    V740sp02,
    #[serde(rename = "v740sp05")]
    V740sp05,
    #[serde(rename = "v750")]
    V750,
    #[default]
    #[serde(rename = "v757")]
    V757,
    #[serde(rename = "cloud")]
    Cloud,
}

impl Version {
    /// 所有版本（按顺序）
    pub const ALL: [Version; 7] = [
        Version::V700,
        Version::V702,
        Version::V740sp02,
        Version::V740sp05,
        Version::V750,
        Version::V757,
        Version::Cloud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V700 => "v700",
            Version::V702 => "v702",
            Version::V740sp02 => "v740sp02",
            Version::V740sp05 => "v740sp05",
            Version::V750 => "v750",
            Version::V757 => "v757",
            Version::Cloud => "cloud",
        }
    }

    /// Index into per-version tables
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether a feature introduced in `since` is available in this version
    #[inline]
    pub fn supports(
        &self,
        since: Version,
    ) -> bool {
        *self >= since
    }
}

impl fmt::Display for Version {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 版本字符串解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ABAP version \"{0}\", expected one of v700, v702, v740sp02, v740sp05, v750, v757, cloud")]
pub struct VersionParseError(pub String);

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Version::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == lower)
            .ok_or_else(|| VersionParseError(s.to_string()))
    }
}
