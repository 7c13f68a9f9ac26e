//! CLI command for showing archive contents

use std::path::Path;

use crate::cli::progress::format_size;
use crate::pipeline::BundleReader;

pub fn execute(archive: &Path, detailed: bool) -> anyhow::Result<()> {
    let mut reader = BundleReader::open(archive)?;

    println!("Archive:     {}", archive.display());
    println!("Version:     {}", reader.version());
    println!("Platform:    {}", reader.platform());
    println!("Compression: {}", reader.compression().as_str());
    println!("Files:       {}", reader.entries().len());
    println!();

    if !detailed {
        for entry in reader.entries() {
            println!("{}", entry.path);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>10}  {:>6}  {:>8}  PATH",
        "SIZE", "STORED", "RATIO", "CRC32"
    );

    let entries = reader.entries().to_vec();
    let mut corrupt = 0usize;
    for entry in &entries {
        let ratio = if entry.size_decompressed > 0 {
            (f64::from(entry.size_compressed) / f64::from(entry.size_decompressed)) * 100.0
        } else {
            100.0
        };
        let status = match reader.read_entry(entry) {
            Ok(_) => "",
            Err(e) => {
                corrupt += 1;
                tracing::warn!("{}: {e}", entry.path);
                "  (corrupt)"
            }
        };

        println!(
            "{:>10}  {:>10}  {:>5.1}%  {:08x}  {}{status}",
            format_size(u64::from(entry.size_decompressed)),
            format_size(u64::from(entry.size_compressed)),
            ratio,
            entry.crc32,
            entry.path
        );
    }

    let total_decompressed: u64 = entries.iter().map(|e| u64::from(e.size_decompressed)).sum();
    let total_compressed: u64 = entries.iter().map(|e| u64::from(e.size_compressed)).sum();
    println!();
    println!(
        "Total: {} -> {}",
        format_size(total_decompressed),
        format_size(total_compressed)
    );

    if corrupt > 0 {
        anyhow::bail!("{corrupt} entries failed their checksum");
    }
    Ok(())
}
