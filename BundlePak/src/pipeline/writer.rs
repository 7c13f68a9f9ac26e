//! Bundle archive writer

use std::fs::OpenOptions;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::{
    ArchiveEntry, ArchiveHeader, CompressionMethod, FOOTER_OFFSET_POSITION, TABLE_ENTRY_SIZE,
    VERSION,
};
use crate::config::TargetPlatform;
use crate::error::{Error, Result};

/// File queued for writing
struct PendingFile {
    /// Asset path stored in the table
    path: String,
    data: Vec<u8>,
}

/// Bundle archive writer.
///
/// Files are written in the order they were added.
pub struct BundleWriter {
    files: Vec<PendingFile>,
    platform: TargetPlatform,
    compression: CompressionMethod,
}

impl BundleWriter {
    #[must_use]
    pub fn new(platform: TargetPlatform) -> Self {
        Self {
            files: Vec::new(),
            platform,
            compression: CompressionMethod::Zlib,
        }
    }

    /// Set the compression method to use
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Queue a file under its asset path
    pub fn add_file(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.files.push(PendingFile {
            path: path.into(),
            data,
        });
    }

    /// Get the number of files that will be written
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Write the archive, returning its table.
    pub fn write(self, output_path: impl AsRef<Path>) -> Result<Vec<ArchiveEntry>> {
        let output_path = output_path.as_ref();

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(output_path)?;
        let mut output = BufWriter::new(file);

        let mut header = ArchiveHeader {
            version: VERSION,
            platform: self.platform,
            compression: self.compression,
            footer_offset: 0, // Filled in once the data is written
        };
        header.write(&mut output)?;

        let mut entries = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let compressed = self.compression.compress(&file.data)?;

            let size_decompressed: u32 = file.data.len().try_into().map_err(|_| {
                Error::InvalidFormat(format!(
                    "File {} is too large: {} bytes",
                    file.path,
                    file.data.len()
                ))
            })?;
            let size_compressed: u32 = compressed.len().try_into().map_err(|_| {
                Error::InvalidFormat(format!(
                    "Compressed file {} is too large: {} bytes",
                    file.path,
                    compressed.len()
                ))
            })?;

            let offset = output.stream_position()?;
            output.write_all(&compressed)?;

            entries.push(ArchiveEntry {
                path: file.path.clone(),
                offset,
                size_compressed,
                size_decompressed,
                crc32: crc32fast::hash(&file.data),
            });
        }

        header.footer_offset = output.stream_position()?;

        let num_files: u32 = entries
            .len()
            .try_into()
            .map_err(|_| Error::InvalidFormat(format!("Too many files: {}", entries.len())))?;
        output.write_u32::<LittleEndian>(num_files)?;

        let mut table = Vec::with_capacity(TABLE_ENTRY_SIZE * entries.len());
        for entry in &entries {
            entry.write(&mut table)?;
        }
        let compressed_table = lz4_flex::block::compress(&table);
        let table_size: u32 = compressed_table.len().try_into().map_err(|_| {
            Error::InvalidFormat(format!(
                "File table too large: {} bytes",
                compressed_table.len()
            ))
        })?;
        output.write_u32::<LittleEndian>(table_size)?;
        output.write_all(&compressed_table)?;

        // Go back and write the footer offset
        output.seek(SeekFrom::Start(FOOTER_OFFSET_POSITION))?;
        output.write_u64::<LittleEndian>(header.footer_offset)?;
        output.flush()?;

        tracing::debug!(
            "Wrote {} ({} files, {})",
            output_path.display(),
            entries.len(),
            self.compression.as_str()
        );

        Ok(entries)
    }
}
