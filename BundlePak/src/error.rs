//! Error types for `BundlePak`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `BundlePak` operations.
///
/// Variants fall into three groups: validation errors (bad or missing
/// configuration, reported before anything touches the disk), fatal errors
/// (the operation aborts where it stands), and wrapped library errors.
/// [`Error::is_validation`] tells the first group apart.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Validation Errors ====================
    /// No source folder was configured.
    #[error("didn't select the asset folder")]
    SourcePathNotSet,

    /// No output folder was configured.
    #[error("didn't select the output folder")]
    OutputPathNotSet,

    /// A bundle extension is blank.
    #[error("must fill the {which} extension")]
    ExtensionNotSet {
        /// Which extension is missing ("bundle" or "scene bundle").
        which: &'static str,
    },

    /// A bundle extension would place archives outside their bundle folder.
    #[error("{which} extension '{extension}' must not contain path separators")]
    InvalidExtension {
        /// Which extension is invalid ("bundle" or "scene bundle").
        which: &'static str,
        /// The configured value.
        extension: String,
    },

    /// The configured source folder does not exist or is not a directory.
    #[error("asset folder not found: {path}")]
    SourcePathNotFound {
        /// The configured source path.
        path: PathBuf,
    },

    /// The source folder is not inside the project root, so its files cannot be keyed.
    #[error("asset folder {path} is outside the project root {root}")]
    SourceOutsideProject {
        /// The configured source path.
        path: PathBuf,
        /// The project root.
        root: PathBuf,
    },

    /// The output folder would wipe source content or the project itself.
    #[error("output folder {output} overlaps {other}")]
    OutputOverlapsSource {
        /// The configured output path.
        output: PathBuf,
        /// The source folder or project root it collides with.
        other: PathBuf,
    },

    /// Two build options that cannot be combined were both set.
    #[error("conflicting build options: {0}")]
    ConflictingBuildOptions(String),

    /// A build option name was not recognised.
    #[error("unknown build option '{0}'")]
    UnknownBuildOption(String),

    /// A target platform name was not recognised.
    #[error("unknown target platform '{0}'")]
    UnknownTargetPlatform(String),

    /// A loose file policy name was not recognised.
    #[error("unknown loose file policy '{0}'")]
    UnknownLooseFilePolicy(String),

    // ==================== Labelling Errors ====================
    /// Not every registered bundle label could be removed.
    #[error(
        "didn't delete all bundle labels ({removed}/{total} removed, failed: {})",
        failed.join(", ")
    )]
    LabelResetIncomplete {
        /// Labels removed successfully.
        removed: usize,
        /// Labels that were registered.
        total: usize,
        /// Names that could not be removed.
        failed: Vec<String>,
    },

    /// The metadata record for a collected file could not be resolved.
    #[error("no asset record for {path}")]
    AssetRecordNotFound {
        /// The file that has no record.
        path: PathBuf,
    },

    /// A file sits directly in a group folder and the policy rejects it.
    #[error("file {path} sits directly in group '{group}' with no sub-folder")]
    LooseFileInGroup {
        /// Group name.
        group: String,
        /// The loose file.
        path: PathBuf,
    },

    /// The same asset was labelled twice in one pass.
    #[error("asset {0} was assigned more than one bundle label")]
    DuplicateAssignment(String),

    // ==================== Build Errors ====================
    /// A labelled asset no longer exists on disk (strict builds only).
    #[error("labelled asset missing on disk: {0}")]
    LabeledAssetMissing(String),

    /// The pipeline reported artifacts that are not on disk.
    #[error("build output incomplete, missing: {}", join_paths(missing))]
    OutputVerificationFailed {
        /// Artifacts that were expected but not found.
        missing: Vec<PathBuf>,
    },

    // ==================== Archive Format Errors ====================
    /// The file is not a bundle archive (missing BNDL magic).
    #[error("invalid archive magic: expected BNDL")]
    InvalidArchiveMagic,

    /// The archive version is not supported by this reader.
    #[error("unsupported archive version {version}")]
    UnsupportedArchiveVersion {
        /// The version found in the header.
        version: u32,
    },

    /// An archive entry failed its CRC check.
    #[error("checksum mismatch for {path}: expected {expected:08x}, got {actual:08x}")]
    ArchiveChecksumMismatch {
        /// Entry path inside the archive.
        path: String,
        /// CRC32 stored in the file table.
        expected: u32,
        /// CRC32 of the decompressed data.
        actual: u32,
    },

    /// An asset path does not fit in a file table entry.
    #[error("asset path too long for archive table ({len} bytes): {path}")]
    ArchivePathTooLong {
        /// The asset path.
        path: String,
        /// Its length in bytes.
        len: usize,
    },

    /// Decompression of an archive entry or table failed.
    #[error("decompression failed: {0}")]
    DecompressionError(String),

    /// Invalid archive structure.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlDeError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML write error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Whether this is a user-input error raised before any mutation.
    ///
    /// Everything else is fatal: the operation stopped part way and has to be
    /// re-run from scratch.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::SourcePathNotSet
                | Error::OutputPathNotSet
                | Error::ExtensionNotSet { .. }
                | Error::InvalidExtension { .. }
                | Error::SourcePathNotFound { .. }
                | Error::SourceOutsideProject { .. }
                | Error::OutputOverlapsSource { .. }
                | Error::ConflictingBuildOptions(_)
                | Error::UnknownBuildOption(_)
                | Error::UnknownTargetPlatform(_)
                | Error::UnknownLooseFilePolicy(_)
        )
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

// Add conversion from tempfile::PersistError
impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}

/// A specialized Result type for `BundlePak` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::OutputPathNotSet.is_validation());
        assert!(Error::ExtensionNotSet { which: "bundle" }.is_validation());
        assert!(
            !Error::LabelResetIncomplete {
                removed: 3,
                total: 5,
                failed: vec![]
            }
            .is_validation()
        );
        assert!(!Error::AssetRecordNotFound { path: PathBuf::from("a") }.is_validation());
    }

    #[test]
    fn test_reset_message_lists_failures() {
        let err = Error::LabelResetIncomplete {
            removed: 3,
            total: 5,
            failed: vec!["a/b".to_string(), "c/d".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "didn't delete all bundle labels (3/5 removed, failed: a/b, c/d)"
        );
    }
}
