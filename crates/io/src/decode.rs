// Byte-to-text decoding for uploaded documents

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Text decoded from an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Name of the encoding actually used (`UTF-8`, `windows-1252`, `UTF-16LE`, ...).
    pub encoding: &'static str,
    /// True when the bytes were not valid in the detected encoding and
    /// replacement characters or a fallback encoding were needed.
    pub lossy: bool,
}

/// Decode bytes to text. Never fails.
///
/// A BOM selects the encoding outright. Otherwise UTF-8 is tried first and
/// Windows-1252 is the fallback (common for Excel-exported CSVs). Every byte
/// maps to something in Windows-1252, so invalid sequences degrade to odd
/// characters instead of an error.
pub fn decode_bytes(bytes: &[u8]) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Decoded {
            text: text.into_owned(),
            encoding: encoding.name(),
            lossy: had_errors,
        };
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => Decoded {
            text: s.to_string(),
            encoding: UTF_8.name(),
            lossy: false,
        },
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            log::debug!("input is not valid UTF-8, decoded as windows-1252");
            Decoded {
                text: text.into_owned(),
                encoding: WINDOWS_1252.name(),
                lossy: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8() {
        let d = decode_bytes("token payout_ab".as_bytes());
        assert_eq!(d.text, "token payout_ab");
        assert_eq!(d.encoding, "UTF-8");
        assert!(!d.lossy);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Date,Time\n");
        let d = decode_bytes(&bytes);
        assert_eq!(d.text, "Date,Time\n");
        assert!(!d.lossy);
    }

    #[test]
    fn invalid_utf8_falls_back_to_windows_1252() {
        // 0xE9 is 'é' in Windows-1252 and an invalid lone byte in UTF-8
        let bytes = b"caf\xE9 payout_00";
        let d = decode_bytes(bytes);
        assert_eq!(d.text, "caf\u{e9} payout_00");
        assert_eq!(d.encoding, "windows-1252");
        assert!(d.lossy);
    }

    #[test]
    fn utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "ab".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let d = decode_bytes(&bytes);
        assert_eq!(d.text, "ab");
        assert_eq!(d.encoding, "UTF-16LE");
    }
}
