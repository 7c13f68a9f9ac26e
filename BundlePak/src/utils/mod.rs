//! Utility functions

pub mod hash;
pub mod path;
pub mod walk;

pub use hash::{content_hash, short_hash};
pub use path::{asset_key, has_extension, normalize_path, relative_path};
pub use walk::collect_files;
