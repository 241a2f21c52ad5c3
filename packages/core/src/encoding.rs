//! Text encodings for document files.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// The text encoding used to read and write a document file.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-8 with a byte order mark written in front of the text.
    Utf8Sig,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
    Ascii,
}

impl Encoding {
    /// The canonical label for this encoding.
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8Sig => "utf-8-sig",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Latin1 => "latin-1",
            Encoding::Ascii => "ascii",
        }
    }

    /// Look up an encoding by label, case-insensitively.
    pub fn for_label(label: &str) -> Result<Encoding> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" | "u8" => Ok(Encoding::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(Encoding::Utf8Sig),
            "utf-16le" | "utf-16-le" | "utf16le" => Ok(Encoding::Utf16Le),
            "utf-16be" | "utf-16-be" | "utf16be" => Ok(Encoding::Utf16Be),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(Error::UnknownEncoding {
                label: label.to_string(),
            }),
        }
    }

    /// Decode file bytes into text.
    ///
    /// The UTF-8 variants accept (and drop) a leading byte order mark.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Encoding::Utf8 | Encoding::Utf8Sig => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).map_err(|e| self.error(e.to_string()))
            }
            Encoding::Utf16Le | Encoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(self.error(format!("odd number of bytes ({})", bytes.len())));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| {
                        let pair = [pair[0], pair[1]];
                        if *self == Encoding::Utf16Le {
                            u16::from_le_bytes(pair)
                        } else {
                            u16::from_be_bytes(pair)
                        }
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| self.error(e.to_string()))
            }
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(self.error(format!(
                    "byte 0x{:02x} at offset {} is not ASCII",
                    bytes[offset], offset
                ))),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }

    /// Encode text into file bytes.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Utf8Sig => {
                let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
                bytes.extend_from_slice(UTF8_BOM);
                bytes.extend_from_slice(text.as_bytes());
                Ok(bytes)
            }
            Encoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Encoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Encoding::Latin1 => self.encode_narrow(text),
            Encoding::Ascii => self.encode_narrow(text),
        }
    }

    /// Whether `c` can be written in this encoding as-is.
    pub fn can_encode(&self, c: char) -> bool {
        match self {
            Encoding::Latin1 => (c as u32) <= 0xFF,
            Encoding::Ascii => c.is_ascii(),
            _ => true,
        }
    }

    fn encode_narrow(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|c| {
                if self.can_encode(c) {
                    Ok(c as u8)
                } else {
                    Err(self.error(format!("character {:?} is not representable", c)))
                }
            })
            .collect()
    }

    fn error(&self, message: String) -> Error {
        Error::Encoding {
            encoding: *self,
            message,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Encoding::for_label(s)
    }
}

impl Serialize for Encoding {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Encoding, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        Encoding::for_label(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "{\"name\": \"Zoë\"}";

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf_8_sig".parse::<Encoding>().unwrap(), Encoding::Utf8Sig);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("utf-16-le".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
        assert_eq!(" ascii ".parse::<Encoding>().unwrap(), Encoding::Ascii);
    }

    #[test]
    fn unknown_label_rejected() {
        let err = "ebcdic".parse::<Encoding>().unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding { ref label } if label == "ebcdic"));
    }

    #[test]
    fn utf8_tolerates_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        assert_eq!(Encoding::Utf8.decode(&bytes).unwrap(), SAMPLE);
    }

    #[test]
    fn utf8_sig_writes_bom() {
        let bytes = Encoding::Utf8Sig.encode(SAMPLE).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(Encoding::Utf8Sig.decode(&bytes).unwrap(), SAMPLE);
    }

    #[test]
    fn invalid_utf8_rejected() {
        let err = Encoding::Utf8.decode(&[b'{', 0xFF, b'}']).unwrap_err();
        assert!(matches!(err, Error::Encoding { encoding: Encoding::Utf8, .. }));
    }

    #[test]
    fn utf16_both_byte_orders() {
        for encoding in [Encoding::Utf16Le, Encoding::Utf16Be] {
            let bytes = encoding.encode(SAMPLE).unwrap();
            assert_eq!(bytes.len(), SAMPLE.encode_utf16().count() * 2);
            assert_eq!(encoding.decode(&bytes).unwrap(), SAMPLE);
        }
        assert_eq!(Encoding::Utf16Le.encode("A").unwrap(), vec![0x41, 0x00]);
        assert_eq!(Encoding::Utf16Be.encode("A").unwrap(), vec![0x00, 0x41]);
    }

    #[test]
    fn utf16_odd_length_rejected() {
        assert!(Encoding::Utf16Le.decode(&[0x41, 0x00, 0x42]).is_err());
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        let bytes = Encoding::Latin1.encode(SAMPLE).unwrap();
        assert!(bytes.contains(&0xEB));
        assert_eq!(Encoding::Latin1.decode(&bytes).unwrap(), SAMPLE);
        assert!(Encoding::Latin1.encode("€").is_err());
    }

    #[test]
    fn ascii_rejects_non_ascii() {
        assert!(Encoding::Ascii.encode(SAMPLE).is_err());
        assert!(Encoding::Ascii.decode(&[b'a', 0xE9]).is_err());
        assert_eq!(Encoding::Ascii.decode(b"{}").unwrap(), "{}");
    }

    #[test]
    fn representable_characters() {
        assert!(Encoding::Ascii.can_encode('a'));
        assert!(!Encoding::Ascii.can_encode('é'));
        assert!(Encoding::Latin1.can_encode('é'));
        assert!(!Encoding::Latin1.can_encode('€'));
        assert!(Encoding::Utf16Be.can_encode('🎉'));
    }

    #[test]
    fn serde_as_label() {
        let json = serde_json::to_value(Encoding::Latin1).unwrap();
        assert_eq!(json, serde_json::json!("latin-1"));
        let back: Encoding = serde_json::from_value(serde_json::json!("UTF8")).unwrap();
        assert_eq!(back, Encoding::Utf8);
    }
}
