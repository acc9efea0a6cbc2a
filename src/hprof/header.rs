//! HPROF file header.
//!
//! The header is a NUL-terminated format identifier such as `"JAVA PROFILE 1.0.3"`, followed by
//! the `u32` size of object identifiers and the `u64` dump timestamp in milliseconds since the
//! epoch.

use crate::{file::ShardManager, Error, Result};

/// Every supported format identifier starts with this prefix.
pub const FORMAT_PREFIX: &[u8] = b"JAVA PROFILE 1.0";

/// Upper bound on the identifier length scanned for its terminating NUL.
const MAX_FORMAT_LEN: usize = 64;

/// Validated file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Format identifier, e.g. `"JAVA PROFILE 1.0.3"`
    pub format: String,
    /// Width of object identifiers in bytes (4 or 8)
    pub id_size: usize,
    /// Dump creation time, milliseconds since the epoch
    pub timestamp_ms: u64,
    /// Size of the header in bytes; the first record starts here
    pub length: u64,
}

impl Header {
    /// Read and validate the header at offset 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the file ends inside the header, or
    /// [`crate::Error::InvalidHeader`] for an unknown identifier or unsupported id size.
    pub fn read(shards: &ShardManager) -> Result<Header> {
        let file_len = shards.len();
        let scan_len = usize::try_from(file_len).map_or(MAX_FORMAT_LEN, |l| l.min(MAX_FORMAT_LEN));
        let scan = shards.read_bytes(0, scan_len)?;

        let nul = scan.iter().position(|&b| b == 0);
        let ident = &scan[..nul.unwrap_or(scan.len())];

        let common = ident.len().min(FORMAT_PREFIX.len());
        if ident[..common] != FORMAT_PREFIX[..common] {
            return Err(Error::InvalidHeader(format!(
                "unknown format identifier '{}'",
                String::from_utf8_lossy(ident)
            )));
        }

        let Some(nul) = nul else {
            if scan_len < MAX_FORMAT_LEN {
                return Err(Error::Truncated {
                    offset: 0,
                    needed: scan_len as u64 + 13,
                    available: file_len,
                });
            }
            return Err(Error::InvalidHeader(format!(
                "format identifier is not terminated within {MAX_FORMAT_LEN} bytes"
            )));
        };
        if ident.len() < FORMAT_PREFIX.len() {
            return Err(Error::InvalidHeader(format!(
                "unknown format identifier '{}'",
                String::from_utf8_lossy(ident)
            )));
        }

        let format = String::from_utf8_lossy(ident).into_owned();
        let body = nul as u64 + 1;
        let length = body + 12;
        if length > file_len {
            return Err(Error::Truncated {
                offset: 0,
                needed: length,
                available: file_len,
            });
        }

        let id_size: u32 = shards.read_be(body)?;
        if id_size != 4 && id_size != 8 {
            return Err(Error::InvalidHeader(format!(
                "unsupported identifier size {id_size}"
            )));
        }
        let timestamp_ms: u64 = shards.read_be(body + 4)?;

        log::debug!("{format} dump, {id_size}-byte ids, timestamp {timestamp_ms}");

        Ok(Header {
            format,
            id_size: id_size as usize,
            timestamp_ms,
            length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(format: &[u8], id_size: u32) -> Vec<u8> {
        let mut data = format.to_vec();
        data.push(0);
        data.extend_from_slice(&id_size.to_be_bytes());
        data.extend_from_slice(&1_700_000_000_000u64.to_be_bytes());
        data
    }

    #[test]
    fn valid_headers() {
        for format in [&b"JAVA PROFILE 1.0.2"[..], b"JAVA PROFILE 1.0.3", b"JAVA PROFILE 1.0.1"] {
            for id_size in [4, 8] {
                let data = header_bytes(format, id_size);
                let len = data.len() as u64;
                let shards = ShardManager::from_mem(data, 8, 2).unwrap();

                let header = Header::read(&shards).unwrap();
                assert_eq!(header.format.as_bytes(), format);
                assert_eq!(header.id_size, id_size as usize);
                assert_eq!(header.timestamp_ms, 1_700_000_000_000);
                assert_eq!(header.length, len);
            }
        }
    }

    #[test]
    fn rejected_headers() {
        let shards = ShardManager::from_mem(header_bytes(b"JAVA PROFILE 1.0.2", 2), 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::InvalidHeader(_))));

        let shards = ShardManager::from_mem(header_bytes(b"NOT A DUMP", 4), 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::InvalidHeader(_))));

        let shards = ShardManager::from_mem(header_bytes(b"JAVA PROF", 4), 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::InvalidHeader(_))));

        let shards = ShardManager::from_mem(vec![b'J'; 200], 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn truncated_headers() {
        let shards = ShardManager::from_mem(Vec::new(), 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::Truncated { .. })));

        let shards = ShardManager::from_mem(b"JAVA PROFILE 1.0".to_vec(), 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::Truncated { .. })));

        let mut data = header_bytes(b"JAVA PROFILE 1.0.3", 4);
        data.truncate(data.len() - 3);
        let shards = ShardManager::from_mem(data, 1024, 0).unwrap();
        assert!(matches!(Header::read(&shards), Err(Error::Truncated { .. })));
    }
}
