/// print bytes as a truncated hex string
pub fn debug_hex(bytes: impl AsRef<[u8]>) -> String {
    truncate_hex(hex::encode(bytes.as_ref()))
}

pub fn truncate_hex(hex_string: impl AsRef<str>) -> String {
    let hex_string = hex_string.as_ref();
    if hex_string.is_empty() {
        return String::new();
    }

    let hex_value = hex_string.strip_prefix("0x").unwrap_or(hex_string);

    // Short values are already readable
    if hex_value.len() <= 8 || !hex_value.is_ascii() {
        return hex_string.to_string();
    }

    format!(
        "0x{}...{}",
        &hex_value[..4],
        &hex_value[hex_value.len() - 4..]
    )
}

pub trait TruncatedHex {
    fn short_hex(&self) -> String;
}

impl TruncatedHex for &[u8] {
    fn short_hex(&self) -> String {
        debug_hex(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_hex() {
        assert_eq!(
            truncate_hex("0x5bf078bd83995fe83092d93c5655f059"),
            "0x5bf0...f059"
        );
    }

    #[test]
    fn test_short_hex_untouched() {
        assert_eq!(truncate_hex("0xabcd"), "0xabcd");
        assert_eq!(truncate_hex(""), "");
    }

    #[test]
    fn test_debug_hex() {
        assert_eq!(debug_hex([0xde, 0xad, 0xbe, 0xef, 0x01]), "0xdead...ef01");
    }

    #[test]
    fn test_short_hex_of_signature_bytes() {
        let signature = [0xabu8; 65];
        assert_eq!(signature.as_slice().short_hex(), "0xabab...abab");
        assert_eq!([0x01u8, 0x02].as_slice().short_hex(), "0102");
    }
}
