//! Best-effort text decoding of raw byte blocks
//!
//! Backup blocks contain arbitrary binary; both decoders here accept any
//! input and never error. Undecodable sequences are replaced or mapped,
//! never propagated as failures.

use std::borrow::Cow;

/// Decode as UTF-8, replacing invalid sequences. Borrows when the block is
/// already valid UTF-8.
pub fn decode_utf8_lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Decode as Latin-1 (ISO-8859-1). Every byte maps to exactly one code
/// point, so this always succeeds and catches single-byte text the UTF-8
/// pass mangled.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_lossy_replaces_garbage() {
        let bytes = b"MAIZ \xff\xfe AMARILLO";
        let text = decode_utf8_lossy(bytes);
        assert!(text.contains("MAIZ"));
        assert!(text.contains("AMARILLO"));
    }

    #[test]
    fn test_latin1_never_fails() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = decode_latin1(&bytes);
        assert_eq!(text.chars().count(), 256);
    }

    #[test]
    fn test_latin1_preserves_ascii() {
        let text = decode_latin1(b"CEBADA 2024-01-15 $1,500.00");
        assert_eq!(text, "CEBADA 2024-01-15 $1,500.00");
    }
}
