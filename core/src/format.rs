//! format.rs
//! Framing selector for compress/decompress calls.

use std::fmt;

use num_enum::TryFromPrimitive;

use crate::constants::{format_tags, GZIP_FRAMING_OVERHEAD, ZLIB_FRAMING_OVERHEAD};
use crate::types::{BridgeError, Result};

/// FFI-safe framing tag. Exactly one per call.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Format {
    /// Raw DEFLATE, no header or trailer.
    Deflate = format_tags::DEFLATE,
    /// DEFLATE + zlib header and adler32 trailer.
    Zlib = format_tags::ZLIB,
    /// DEFLATE + gzip header and crc32/isize trailer.
    #[default]
    Gzip = format_tags::GZIP,
}

impl Format {
    /// Permissive mapping used by the raw call surface: any tag that is not
    /// DEFLATE or ZLIB selects GZIP.
    pub fn from_tag(tag: i32) -> Format {
        match tag {
            format_tags::DEFLATE => Format::Deflate,
            format_tags::ZLIB => Format::Zlib,
            _ => Format::Gzip,
        }
    }

    /// Strict mapping; unknown tags are rejected.
    pub fn from_tag_strict(tag: i32) -> Result<Format> {
        Format::try_from_primitive(tag).map_err(|_| BridgeError::UnknownFormat { tag })
    }

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Deflate => "deflate",
            Format::Zlib => "zlib",
            Format::Gzip => "gzip",
        }
    }

    /// Parses the lowercase name used by configs and the Python layer.
    pub fn from_name(name: &str) -> Result<Format> {
        match name.to_ascii_lowercase().as_str() {
            "deflate" | "raw" => Ok(Format::Deflate),
            "zlib" => Ok(Format::Zlib),
            "gzip" | "gz" => Ok(Format::Gzip),
            other => Err(BridgeError::Config(format!("unknown format name: {other}"))),
        }
    }

    /// Header + trailer bytes this framing adds around the DEFLATE stream.
    pub fn framing_overhead(self) -> usize {
        match self {
            Format::Deflate => 0,
            Format::Zlib => ZLIB_FRAMING_OVERHEAD,
            Format::Gzip => GZIP_FRAMING_OVERHEAD,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for Format {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Format {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        Format::from_name(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_fall_back_to_gzip() {
        assert_eq!(Format::from_tag(0), Format::Deflate);
        assert_eq!(Format::from_tag(1), Format::Zlib);
        assert_eq!(Format::from_tag(2), Format::Gzip);
        assert_eq!(Format::from_tag(-7), Format::Gzip);
        assert_eq!(Format::from_tag(99), Format::Gzip);
    }

    #[test]
    fn strict_mapping_rejects_unknown_tags() {
        assert_eq!(Format::from_tag_strict(1), Ok(Format::Zlib));
        assert_eq!(
            Format::from_tag_strict(3),
            Err(BridgeError::UnknownFormat { tag: 3 })
        );
    }
}
