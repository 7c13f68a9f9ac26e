//! Build option flags

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::CompressionMethod;

bitflags! {
    /// Options handed to the bundling pipeline on every build.
    ///
    /// In `bundlepak.toml` and on the command line each flag is spelled by its
    /// kebab-case name, e.g. `options = ["chunk-based-compression", "strict"]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(into = "Vec<String>", try_from = "Vec<String>")]
    pub struct BuildOptions: u32 {
        /// Store archive entries without compression.
        const UNCOMPRESSED = 1 << 0;

        /// Compress archive entries with LZ4 instead of Zlib.
        ///
        /// Faster to read back, slightly larger on disk.
        const CHUNK_BASED_COMPRESSION = 1 << 1;

        /// Write manifests only, no archive data.
        const DRY_RUN = 1 << 2;

        /// Insert a short content hash into every archive file name.
        const APPEND_HASH = 1 << 3;

        /// Fail the build when a labelled asset is missing on disk.
        const STRICT = 1 << 4;
    }
}

const FLAG_NAMES: [(&str, BuildOptions); 5] = [
    ("uncompressed", BuildOptions::UNCOMPRESSED),
    ("chunk-based-compression", BuildOptions::CHUNK_BASED_COMPRESSION),
    ("dry-run", BuildOptions::DRY_RUN),
    ("append-hash", BuildOptions::APPEND_HASH),
    ("strict", BuildOptions::STRICT),
];

impl BuildOptions {
    /// Parse a list of flag names, e.g. from a config file.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(Self::empty(), |acc, name| Ok(acc | name.as_ref().parse::<Self>()?))
    }

    /// Kebab-case names of every set flag, in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        FLAG_NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Reject combinations the pipeline cannot honour.
    pub fn validate(self) -> Result<()> {
        if self.contains(Self::UNCOMPRESSED | Self::CHUNK_BASED_COMPRESSION) {
            return Err(Error::ConflictingBuildOptions(
                "uncompressed and chunk-based-compression".to_string(),
            ));
        }
        Ok(())
    }

    /// Archive entry compression selected by these options.
    #[must_use]
    pub fn compression(self) -> CompressionMethod {
        if self.contains(Self::UNCOMPRESSED) {
            CompressionMethod::None
        } else if self.contains(Self::CHUNK_BASED_COMPRESSION) {
            CompressionMethod::Lz4
        } else {
            CompressionMethod::Zlib
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for BuildOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        FLAG_NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| Error::UnknownBuildOption(s.to_string()))
    }
}

impl fmt::Display for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&self.names().join(", "))
        }
    }
}

impl From<BuildOptions> for Vec<String> {
    fn from(options: BuildOptions) -> Self {
        options.names().into_iter().map(String::from).collect()
    }
}

impl TryFrom<Vec<String>> for BuildOptions {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::from_names(names)
    }
}
