//! Trace files.
//!
//! A trace is a whitespace separated token stream. Keywords set up the cache
//! and `ACCESSES` starts the address list, which runs to the end of input:
//!
//! ```text
//! CACHE_SIZE 64
//! BLOCK_SIZE 16
//! ASSOCIATIVITY 2
//! POLICY LRU
//! ACCESSES 0 16 32 0 48 16
//! ```
//!
//! Files ending in `.xz` are decompressed on the fly.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    sync::Arc,
};

use tracing::warn;
use xz2::read::XzDecoder;

use crate::{config::PartialConfig, error::LoadError};

#[derive(Debug, Clone, PartialEq)]
pub struct TraceFile {
    pub header: PartialConfig,
    pub accesses: Arc<[u64]>,
}

impl TraceFile {
    pub fn read(path: &Path) -> Result<TraceFile, LoadError> {
        let io_err = |source: io::Error| LoadError::Io {
            path: path.to_owned(),
            source,
        };
        let stream = fs::File::open(path).map_err(io_err)?;
        let mut text = String::new();
        let read = if path.extension().is_some_and(|ext| ext == "xz") {
            XzDecoder::new(stream).read_to_string(&mut text)
        } else {
            io::BufReader::new(stream).read_to_string(&mut text)
        };
        read.map_err(io_err)?;
        TraceFile::parse(&text)
    }

    pub fn parse(text: &str) -> Result<TraceFile, LoadError> {
        let mut header = PartialConfig::default();
        let mut accesses = Vec::new();
        let mut tokens = text.split_whitespace();

        while let Some(token) = tokens.next() {
            match token {
                "CACHE_SIZE" => header.cache_size = Some(number(&mut tokens, "CACHE_SIZE")?),
                "BLOCK_SIZE" => header.block_size = Some(number(&mut tokens, "BLOCK_SIZE")?),
                "ASSOCIATIVITY" => {
                    header.associativity = Some(number(&mut tokens, "ASSOCIATIVITY")?)
                }
                "POLICY" => {
                    let name = tokens
                        .next()
                        .ok_or(LoadError::MissingValue { key: "POLICY" })?;
                    header.policy = Some(name.parse()?);
                }
                "ACCESSES" => {
                    for token in tokens.by_ref() {
                        accesses.push(parse_addr(token).ok_or_else(|| LoadError::BadToken {
                            key: "ACCESSES",
                            token: token.to_owned(),
                        })?);
                    }
                }
                other => warn!(token = other, "skipping unknown trace token"),
            }
        }

        Ok(TraceFile {
            header,
            accesses: accesses.into(),
        })
    }
}

fn number<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    key: &'static str,
) -> Result<u64, LoadError> {
    let token = tokens.next().ok_or(LoadError::MissingValue { key })?;
    token.parse().map_err(|_| LoadError::BadToken {
        key,
        token: token.to_owned(),
    })
}

fn parse_addr(token: &str) -> Option<u64> {
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use xz2::write::XzEncoder;

    use super::*;
    use crate::{config::Policy, error::ConfigError};

    const EXAMPLE: &str = "CACHE_SIZE 64\nBLOCK_SIZE 16\nASSOCIATIVITY 2\nPOLICY lru\nACCESSES 0 16 32\n0 0x30 16\n";

    #[test]
    fn parses_header_and_accesses() {
        let trace = TraceFile::parse(EXAMPLE).unwrap();
        assert_eq!(trace.header.cache_size, Some(64));
        assert_eq!(trace.header.block_size, Some(16));
        assert_eq!(trace.header.associativity, Some(2));
        assert_eq!(trace.header.policy, Some(Policy::Lru));
        assert_eq!(&*trace.accesses, &[0, 16, 32, 0, 48, 16]);
    }

    #[test]
    fn header_is_optional() {
        let trace = TraceFile::parse("ACCESSES 1 2 3").unwrap();
        assert_eq!(trace.header, PartialConfig::default());
        assert_eq!(trace.accesses.len(), 3);
    }

    #[test]
    fn unknown_keywords_are_skipped() {
        let trace = TraceFile::parse("COMMENT CACHE_SIZE 32 ACCESSES 4").unwrap();
        assert_eq!(trace.header.cache_size, Some(32));
        assert_eq!(&*trace.accesses, &[4]);
    }

    #[test]
    fn malformed_tokens_fail() {
        assert!(matches!(
            TraceFile::parse("CACHE_SIZE big"),
            Err(LoadError::BadToken {
                key: "CACHE_SIZE",
                ..
            })
        ));
        assert!(matches!(
            TraceFile::parse("ACCESSES 1 2 x3"),
            Err(LoadError::BadToken { key: "ACCESSES", token }) if token == "x3"
        ));
        assert!(matches!(
            TraceFile::parse("BLOCK_SIZE"),
            Err(LoadError::MissingValue { key: "BLOCK_SIZE" })
        ));
        assert!(matches!(
            TraceFile::parse("POLICY RANDOM"),
            Err(LoadError::Config(ConfigError::UnknownPolicy(name))) if name == "RANDOM"
        ));
    }

    #[test]
    fn reads_plain_and_xz_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("trace.txt");
        fs::write(&plain, EXAMPLE).unwrap();

        let packed = dir.path().join("trace.txt.xz");
        let mut encoder = XzEncoder::new(fs::File::create(&packed).unwrap(), 6);
        encoder.write_all(EXAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let expected = TraceFile::parse(EXAMPLE).unwrap();
        assert_eq!(TraceFile::read(&plain).unwrap(), expected);
        assert_eq!(TraceFile::read(&packed).unwrap(), expected);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TraceFile::read(&dir.path().join("nope")),
            Err(LoadError::Io { .. })
        ));
    }
}
