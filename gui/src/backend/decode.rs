use encoding_rs::{GB18030, GBK, UTF_8};

/// Decode tool output, trying UTF-8, GBK (cp936) and GB18030 in order.
///
/// netsh writes in the console's OEM code page, which on Chinese systems is
/// GBK. The first encoding that decodes without errors wins; if none does,
/// the bytes are decoded lossily as UTF-8.
pub fn decode_output(bytes: &[u8]) -> String {
    for encoding in [UTF_8, GBK, GB18030] {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
    }
    tracing::debug!("Output is not valid in any known encoding, decoding lossily");
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_preferred() {
        assert_eq!(decode_output("Key Content : café".as_bytes()), "Key Content : café");
    }

    #[test]
    fn gbk_output_is_decoded() {
        let (bytes, _, had_errors) = GBK.encode("    所有用户配置文件 : 家里的网络");
        assert!(!had_errors);
        assert!(std::str::from_utf8(&bytes).is_err());

        assert_eq!(decode_output(&bytes), "    所有用户配置文件 : 家里的网络");
    }

    #[test]
    fn undecodable_bytes_fall_back_to_lossy() {
        // 0xFF is invalid in UTF-8, GBK and GB18030 alike
        assert_eq!(decode_output(&[b'o', b'k', 0xFF]), "ok\u{FFFD}");
    }
}
