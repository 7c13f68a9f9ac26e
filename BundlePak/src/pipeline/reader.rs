//! Bundle archive reader

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::format::{
    ArchiveEntry, ArchiveHeader, CompressionMethod, HEADER_SIZE, TABLE_ENTRY_SIZE,
};
use crate::config::TargetPlatform;
use crate::error::{Error, Result};

/// A decompressed archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: String,
    pub data: Vec<u8>,
}

/// Bundle archive reader
pub struct BundleReader<R: Read + Seek> {
    reader: BufReader<R>,
    header: ArchiveHeader,
    entries: Vec<ArchiveEntry>,
}

impl BundleReader<File> {
    /// Open an archive on disk and read its table
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> BundleReader<R> {
    /// Parse header, footer and table from a `Read + Seek` source
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);

        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        let header = ArchiveHeader::read(&mut reader)?;

        let footer_end = header.footer_offset.checked_add(8);
        if header.footer_offset < HEADER_SIZE || footer_end.is_none_or(|end| end > stream_len) {
            return Err(Error::InvalidFormat(format!(
                "footer offset {} outside archive of {stream_len} bytes",
                header.footer_offset
            )));
        }

        reader.seek(SeekFrom::Start(header.footer_offset))?;
        let num_files = reader.read_u32::<LittleEndian>()? as usize;
        let table_size = reader.read_u32::<LittleEndian>()?;

        if header.footer_offset + 8 + u64::from(table_size) > stream_len {
            return Err(Error::InvalidFormat(format!(
                "file table of {table_size} bytes runs past the end of the archive"
            )));
        }
        let table_size = table_size as usize;

        let table_len = num_files
            .checked_mul(TABLE_ENTRY_SIZE)
            .filter(|&len| len <= CompressionMethod::Lz4.max_decompressed_size(table_size))
            .ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "{num_files} entries cannot fit a {table_size} byte file table"
                ))
            })?;

        let mut compressed_table = vec![0u8; table_size];
        reader.read_exact(&mut compressed_table)?;

        let table = lz4_flex::block::decompress(&compressed_table, table_len).map_err(|e| {
            Error::DecompressionError(format!("Failed to decompress file table: {e}"))
        })?;
        if table.len() != table_len {
            return Err(Error::InvalidFormat(format!(
                "file table holds {} bytes, expected {table_len} for {num_files} entries",
                table.len()
            )));
        }

        let mut cursor = Cursor::new(table);
        let entries = (0..num_files)
            .map(|_| ArchiveEntry::read(&mut cursor))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            reader,
            header,
            entries,
        })
    }

    /// Table entries in storage order
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    #[must_use]
    pub fn platform(&self) -> TargetPlatform {
        self.header.platform
    }

    #[must_use]
    pub fn compression(&self) -> CompressionMethod {
        self.header.compression
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Read, decompress and CRC-check one entry
    pub fn read_entry(&mut self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let compression = self.header.compression;
        let size_compressed = entry.size_compressed as usize;
        let in_data_region = entry.offset >= HEADER_SIZE
            && entry
                .offset
                .checked_add(u64::from(entry.size_compressed))
                .is_some_and(|end| end <= self.header.footer_offset);
        if !in_data_region {
            return Err(Error::InvalidFormat(format!(
                "{}: entry lies outside the archive data",
                entry.path
            )));
        }
        if entry.size_decompressed as usize > compression.max_decompressed_size(size_compressed) {
            return Err(Error::InvalidFormat(format!(
                "{}: {} bytes cannot expand to {}",
                entry.path, entry.size_compressed, entry.size_decompressed
            )));
        }

        self.reader.seek(SeekFrom::Start(entry.offset))?;

        let mut compressed = vec![0u8; size_compressed];
        self.reader.read_exact(&mut compressed)?;

        let data = compression
            .decompress(&compressed, entry.size_decompressed as usize)
            .map_err(|e| Error::DecompressionError(format!("{}: {e}", entry.path)))?;

        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            return Err(Error::ArchiveChecksumMismatch {
                path: entry.path.clone(),
                expected: entry.crc32,
                actual,
            });
        }

        Ok(data)
    }

    /// Read every entry; the first failure aborts
    pub fn read_all(&mut self) -> Result<Vec<BundleFile>> {
        let entries = self.entries.clone();
        entries
            .into_iter()
            .map(|entry| {
                let data = self.read_entry(&entry)?;
                Ok(BundleFile {
                    path: entry.path,
                    data,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BundleWriter;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_sample(dir: &Path, compression: CompressionMethod) -> std::path::PathBuf {
        let path = dir.join("sample.assetBundle");
        let mut writer =
            BundleWriter::new(TargetPlatform::StandaloneLinux64).with_compression(compression);
        writer.add_file("Assets/G/S/a.txt", b"alpha alpha alpha".to_vec());
        writer.add_file("Assets/G/S/b.txt", b"beta".to_vec());
        writer.write(&path).unwrap();
        path
    }

    #[test]
    fn test_read_back_every_compression() {
        let temp = TempDir::new().unwrap();
        for compression in [
            CompressionMethod::None,
            CompressionMethod::Zlib,
            CompressionMethod::Lz4,
        ] {
            let path = write_sample(temp.path(), compression);
            let mut reader = BundleReader::open(&path).unwrap();

            assert_eq!(reader.compression(), compression);
            assert_eq!(reader.platform(), TargetPlatform::StandaloneLinux64);
            assert_eq!(
                reader.read_all().unwrap(),
                vec![
                    BundleFile {
                        path: "Assets/G/S/a.txt".to_string(),
                        data: b"alpha alpha alpha".to_vec(),
                    },
                    BundleFile {
                        path: "Assets/G/S/b.txt".to_string(),
                        data: b"beta".to_vec(),
                    },
                ]
            );
        }
    }

    #[test]
    fn test_corrupted_entry_detected() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path(), CompressionMethod::None);

        let mut bytes = std::fs::read(&path).unwrap();
        // First payload byte sits right after the header
        bytes[20] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        let mut reader = BundleReader::open(&path).unwrap();
        let entry = reader.entries()[0].clone();
        assert!(matches!(
            reader.read_entry(&entry),
            Err(Error::ArchiveChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_not_an_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("junk.bin");
        std::fs::write(&path, b"definitely not a bundle archive").unwrap();
        assert!(matches!(
            BundleReader::open(&path),
            Err(Error::InvalidArchiveMagic)
        ));
    }

    /// Header followed directly by a hand-written footer
    fn bare_archive(footer_offset: u64, num_files: u32, table: &[u8], table_size: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        ArchiveHeader {
            version: crate::pipeline::format::VERSION,
            platform: TargetPlatform::default(),
            compression: CompressionMethod::None,
            footer_offset,
        }
        .write(&mut bytes)
        .unwrap();
        bytes.extend_from_slice(&num_files.to_le_bytes());
        bytes.extend_from_slice(&table_size.to_le_bytes());
        bytes.extend_from_slice(table);
        bytes
    }

    #[test]
    fn test_corrupt_footer_is_an_error() {
        let huge_count = bare_archive(HEADER_SIZE, u32::MAX, &[0], 1);
        assert!(matches!(
            BundleReader::new(Cursor::new(huge_count)),
            Err(Error::InvalidFormat(_))
        ));

        let long_table = bare_archive(HEADER_SIZE, 1, &[0], u32::MAX);
        assert!(matches!(
            BundleReader::new(Cursor::new(long_table)),
            Err(Error::InvalidFormat(_))
        ));

        let far_footer = bare_archive(u64::MAX - 4, 0, &[0], 1);
        assert!(matches!(
            BundleReader::new(Cursor::new(far_footer)),
            Err(Error::InvalidFormat(_))
        ));

        let table = lz4_flex::block::compress(&[]);
        let empty = bare_archive(HEADER_SIZE, 0, &table, u32::try_from(table.len()).unwrap());
        assert!(BundleReader::new(Cursor::new(empty)).unwrap().entries().is_empty());
    }

    #[test]
    fn test_entry_outside_data_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path(), CompressionMethod::None);
        let mut reader = BundleReader::open(&path).unwrap();
        let entry = reader.entries()[0].clone();

        let past_footer = ArchiveEntry {
            size_compressed: u32::MAX,
            ..entry.clone()
        };
        assert!(matches!(
            reader.read_entry(&past_footer),
            Err(Error::InvalidFormat(_))
        ));

        let inflated = ArchiveEntry {
            size_decompressed: u32::MAX,
            ..entry.clone()
        };
        assert!(matches!(
            reader.read_entry(&inflated),
            Err(Error::InvalidFormat(_))
        ));

        assert_eq!(reader.read_entry(&entry).unwrap(), b"alpha alpha alpha".to_vec());
    }

    #[test]
    fn test_truncated_table() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path(), CompressionMethod::Lz4);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
        assert!(BundleReader::open(&path).is_err());
    }
}
