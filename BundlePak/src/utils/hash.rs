//! Hashing utilities

/// MD5 digest of a sequence of byte slices, as lowercase hex
pub fn content_hash<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut context = md5::Context::new();
    for part in parts {
        context.consume(part);
    }
    format!("{:x}", context.compute())
}

/// First eight hex digits of a content hash (used in archive names)
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        // Known MD5 values
        assert_eq!(content_hash([]), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            content_hash([b"hello ".as_slice(), b"world".as_slice()]),
            content_hash([b"hello world".as_slice()])
        );
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("d41d8cd98f00b204e9800998ecf8427e"), "d41d8cd9");
        assert_eq!(short_hash("abc"), "abc");
    }
}
