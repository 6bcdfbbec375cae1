/// 有状态的 UTF-8 分块解码器
///
/// 字节块末尾不完整的多字节字符会被暂存，待下一块到达后再拼接解码，
/// 因此不会把一个字符拆到两段文本里。非法字节序列替换为 U+FFFD。
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        None => {
                            // 末尾是被截断的字符，留给下一块
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        text
    }

    /// 流结束：把残留的不完整字节按替换字符输出
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::Utf8ChunkDecoder;

    #[test]
    fn decodes_complete_chunks_directly() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"<svg>"), "<svg>");
        assert_eq!(decoder.decode(b"</svg>"), "</svg>");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn holds_back_split_two_byte_character() {
        let mut decoder = Utf8ChunkDecoder::new();
        // "é" = C3 A9
        assert_eq!(decoder.decode(b"caf\xC3"), "caf");
        assert_eq!(decoder.decode(b"\xA9!"), "é!");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn reassembles_four_byte_character_across_three_chunks() {
        let mut decoder = Utf8ChunkDecoder::new();
        // "😀" = F0 9F 98 80
        assert_eq!(decoder.decode(b"a\xF0"), "a");
        assert_eq!(decoder.decode(b"\x9F\x98"), "");
        assert_eq!(decoder.decode(b"\x80b"), "😀b");
    }

    #[test]
    fn replaces_invalid_bytes_in_the_middle() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn finish_flushes_truncated_tail() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"x\xE2\x82"), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }
}
