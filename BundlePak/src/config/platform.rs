//! Build target platforms

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Platform the bundles are built for.
///
/// Recorded in every archive header and manifest. Nothing is inferred from
/// the machine running the build; the default is Windows 64-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPlatform {
    StandaloneWindows,
    #[default]
    StandaloneWindows64,
    #[serde(rename = "standalone-osx")]
    StandaloneOsx,
    StandaloneLinux64,
    Android,
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "webgl")]
    WebGl,
}

impl TargetPlatform {
    pub const ALL: [TargetPlatform; 7] = [
        TargetPlatform::StandaloneWindows,
        TargetPlatform::StandaloneWindows64,
        TargetPlatform::StandaloneOsx,
        TargetPlatform::StandaloneLinux64,
        TargetPlatform::Android,
        TargetPlatform::Ios,
        TargetPlatform::WebGl,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StandaloneWindows => "standalone-windows",
            Self::StandaloneWindows64 => "standalone-windows64",
            Self::StandaloneOsx => "standalone-osx",
            Self::StandaloneLinux64 => "standalone-linux64",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::WebGl => "webgl",
        }
    }

    /// Identifier byte stored in archive headers
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::StandaloneWindows => 1,
            Self::StandaloneWindows64 => 2,
            Self::StandaloneOsx => 3,
            Self::StandaloneLinux64 => 4,
            Self::Android => 5,
            Self::Ios => 6,
            Self::WebGl => 7,
        }
    }

    /// Inverse of [`TargetPlatform::id`]
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }
}

impl FromStr for TargetPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| Error::UnknownTargetPlatform(s.to_string()))
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
