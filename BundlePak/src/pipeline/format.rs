//! On-disk layout of a bundle archive
//!
//! ```text
//! header   magic "BNDL" | version u32 | platform u8 | compression u8 | reserved u16
//!          | footer offset u64
//! data     entry payloads, back to back
//! footer   entry count u32 | table size u32 | LZ4 block-compressed table
//! table    per entry: path [u8; 256] | offset u64 | compressed u32 | decompressed u32 | crc32 u32
//! ```
//!
//! All integers are little-endian.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::config::TargetPlatform;
use crate::error::{Error, Result};

/// Archive magic bytes
pub const MAGIC: [u8; 4] = *b"BNDL";

/// Archive format version written and accepted
pub const VERSION: u32 = 1;

/// Size of the fixed header
pub const HEADER_SIZE: u64 = 20;

/// Length of the NUL-padded path field in a table entry
pub const PATH_LENGTH: usize = 256;

/// Size of a decompressed table entry
pub const TABLE_ENTRY_SIZE: usize = PATH_LENGTH + 8 + 4 + 4 + 4;

/// Byte offset of the footer offset field inside the header
pub(crate) const FOOTER_OFFSET_POSITION: u64 = 12;

/// Compression used for every entry of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    None,
    Zlib,
    Lz4,
}

impl CompressionMethod {
    /// Parse compression method from the header byte
    #[must_use]
    pub fn from_flags(flags: u8) -> Option<Self> {
        match flags {
            0 => Some(CompressionMethod::None),
            1 => Some(CompressionMethod::Zlib),
            2 => Some(CompressionMethod::Lz4),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_flags(self) -> u8 {
        match self {
            CompressionMethod::None => 0,
            CompressionMethod::Zlib => 1,
            CompressionMethod::Lz4 => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionMethod::None => "none",
            CompressionMethod::Zlib => "zlib",
            CompressionMethod::Lz4 => "lz4",
        }
    }

    /// Compress one entry payload
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::None => Ok(data.to_vec()),
            CompressionMethod::Lz4 => Ok(lz4_flex::block::compress(data)),
            CompressionMethod::Zlib => {
                use flate2::Compression;
                use flate2::write::ZlibEncoder;
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }

    /// Largest size `compressed_size` bytes can expand to with this method
    #[must_use]
    pub fn max_decompressed_size(self, compressed_size: usize) -> usize {
        match self {
            CompressionMethod::None => compressed_size,
            CompressionMethod::Zlib => compressed_size.saturating_mul(1032),
            CompressionMethod::Lz4 => compressed_size.saturating_mul(255),
        }
    }

    /// Decompress one entry payload
    pub fn decompress(self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::None => Ok(data.to_vec()),
            CompressionMethod::Lz4 => lz4_flex::block::decompress(data, expected_size)
                .map_err(|e| Error::DecompressionError(format!("LZ4: {e}"))),
            CompressionMethod::Zlib => {
                use flate2::read::ZlibDecoder;
                let mut decoder = ZlibDecoder::new(data);
                let mut decompressed = Vec::with_capacity(expected_size);
                decoder
                    .read_to_end(&mut decompressed)
                    .map_err(|e| Error::DecompressionError(format!("Zlib: {e}")))?;
                Ok(decompressed)
            }
        }
    }
}

/// Fixed archive header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub version: u32,
    pub platform: TargetPlatform,
    pub compression: CompressionMethod,
    /// Absolute position of the footer
    pub footer_offset: u64,
}

impl ArchiveHeader {
    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u8(self.platform.id())?;
        writer.write_u8(self.compression.to_flags())?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u64::<LittleEndian>(self.footer_offset)?;
        Ok(())
    }

    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::InvalidArchiveMagic);
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(Error::UnsupportedArchiveVersion { version });
        }

        let platform_id = reader.read_u8()?;
        let platform = TargetPlatform::from_id(platform_id).ok_or_else(|| {
            Error::InvalidFormat(format!("unknown platform id {platform_id}"))
        })?;
        let compression_id = reader.read_u8()?;
        let compression = CompressionMethod::from_flags(compression_id).ok_or_else(|| {
            Error::InvalidFormat(format!("unknown compression id {compression_id}"))
        })?;
        let _reserved = reader.read_u16::<LittleEndian>()?;
        let footer_offset = reader.read_u64::<LittleEndian>()?;

        Ok(Self {
            version,
            platform,
            compression,
            footer_offset,
        })
    }
}

/// One file stored in an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Asset path, `/`-separated
    pub path: String,
    /// Absolute position of the payload
    pub offset: u64,
    pub size_compressed: u32,
    pub size_decompressed: u32,
    /// CRC32 of the decompressed payload
    pub crc32: u32,
}

impl ArchiveEntry {
    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let path_bytes = self.path.as_bytes();
        // One byte is kept for the terminating NUL
        if path_bytes.len() >= PATH_LENGTH {
            return Err(Error::ArchivePathTooLong {
                path: self.path.clone(),
                len: path_bytes.len(),
            });
        }

        let mut path_field = [0u8; PATH_LENGTH];
        path_field[..path_bytes.len()].copy_from_slice(path_bytes);
        writer.write_all(&path_field)?;
        writer.write_u64::<LittleEndian>(self.offset)?;
        writer.write_u32::<LittleEndian>(self.size_compressed)?;
        writer.write_u32::<LittleEndian>(self.size_decompressed)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        Ok(())
    }

    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut path_field = [0u8; PATH_LENGTH];
        reader.read_exact(&mut path_field)?;
        let path_end = path_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PATH_LENGTH);
        let path = String::from_utf8_lossy(&path_field[..path_end]).to_string();

        Ok(Self {
            path,
            offset: reader.read_u64::<LittleEndian>()?,
            size_compressed: reader.read_u32::<LittleEndian>()?,
            size_decompressed: reader.read_u32::<LittleEndian>()?,
            crc32: reader.read_u32::<LittleEndian>()?,
        })
    }
}
