//! Buffered, encoding-aware line reader.
//!
//! [`LineReader`] turns any [`Read`] into a sequence of text lines. Bytes are
//! read in fixed chunks and decoded on the fly. The text encoding is picked
//! once, from the first bytes of the stream:
//!
//! | Leading bytes   | Encoding  |
//! |-----------------|-----------|
//! | `FF FE 00 00`   | UTF-32LE  |
//! | `00 00 FE FF`   | UTF-32BE  |
//! | `FF FE`         | UTF-16LE  |
//! | `FE FF`         | UTF-16BE  |
//! | `EF BB BF`      | UTF-8     |
//! | anything else   | the configured fallback |
//!
//! Lines end at `\n`, `\r\n` or `\r`; the terminator is not part of the line
//! but stays available through [`LineReader::last_line_ending`]. Malformed
//! byte sequences decode to U+FFFD instead of failing.
//!
//! ```rust
//! use serde_omsi::LineReader;
//!
//! let bytes = b"\xFF\xFE[\x00m\x00e\x00s\x00h\x00]\x00\r\x00\n\x00";
//! let mut reader = LineReader::new(&bytes[..]);
//! let mut line = String::new();
//!
//! assert_eq!(reader.read_line(&mut line).unwrap(), Some(6));
//! assert_eq!(line, "[mesh]");
//! assert_eq!(reader.encoding_name(), Some("UTF-16LE"));
//! assert_eq!(reader.read_line(&mut line).unwrap(), None);
//! ```

use crate::options::LineEnding;
use encoding_rs::{CoderResult, Decoder, Encoding};
use std::io::{self, Read};

/// Size of the byte chunks pulled from the underlying stream.
pub const CHUNK_SIZE: usize = 4096;

enum TextDecoder {
    Standard(Decoder),
    Utf32 { big_endian: bool, carry: Vec<u8> },
}

impl TextDecoder {
    fn name(&self) -> &'static str {
        match self {
            TextDecoder::Standard(decoder) => decoder.encoding().name(),
            TextDecoder::Utf32 { big_endian: true, .. } => "UTF-32BE",
            TextDecoder::Utf32 { big_endian: false, .. } => "UTF-32LE",
        }
    }

    fn decode(&mut self, mut src: &[u8], dst: &mut String, last: bool) {
        match self {
            TextDecoder::Standard(decoder) => loop {
                let needed = decoder
                    .max_utf8_buffer_length(src.len())
                    .unwrap_or(src.len() * 3 + 16);
                dst.reserve(needed);
                let (result, read, _) = decoder.decode_to_string(src, dst, last);
                src = &src[read..];
                match result {
                    CoderResult::InputEmpty => break,
                    CoderResult::OutputFull => continue,
                }
            },
            TextDecoder::Utf32 { big_endian, carry } => {
                carry.extend_from_slice(src);
                let whole = carry.len() / 4 * 4;
                for unit in carry[..whole].chunks_exact(4) {
                    let Ok(bytes) = <[u8; 4]>::try_from(unit) else {
                        continue;
                    };
                    let code = if *big_endian {
                        u32::from_be_bytes(bytes)
                    } else {
                        u32::from_le_bytes(bytes)
                    };
                    dst.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                carry.drain(..whole);
                if last && !carry.is_empty() {
                    carry.clear();
                    dst.push(char::REPLACEMENT_CHARACTER);
                }
            }
        }
    }
}

/// Line reader over a byte stream with BOM-based encoding detection.
pub struct LineReader<R> {
    inner: R,
    chunk: Box<[u8]>,
    /// Bytes held back until enough are available to recognise a BOM.
    head: Vec<u8>,
    decoder: Option<TextDecoder>,
    fallback: &'static Encoding,
    detect_bom: bool,
    /// Decoded text not yet handed out; `pos` is the start of the next line.
    text: String,
    pos: usize,
    /// Offset from `pos` already known to contain no terminator.
    scan: usize,
    eof: bool,
    ending: LineEnding,
}

impl<R: Read> LineReader<R> {
    /// Creates a reader with BOM detection and a UTF-8 fallback.
    pub fn new(inner: R) -> Self {
        Self::with_encoding(inner, encoding_rs::UTF_8, true)
    }

    /// Creates a reader with the given fallback encoding.
    ///
    /// With `detect_bom` off, `encoding` is used for the whole stream and a
    /// leading byte order mark is decoded as ordinary text.
    pub fn with_encoding(inner: R, encoding: &'static Encoding, detect_bom: bool) -> Self {
        LineReader {
            inner,
            chunk: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
            head: Vec::new(),
            decoder: None,
            fallback: encoding,
            detect_bom,
            text: String::new(),
            pos: 0,
            scan: 0,
            eof: false,
            ending: LineEnding::None,
        }
    }

    /// The encoding in use, once the first chunk has been read.
    pub fn encoding_name(&self) -> Option<&'static str> {
        self.decoder.as_ref().map(TextDecoder::name)
    }

    /// The terminator of the line most recently returned.
    pub fn last_line_ending(&self) -> LineEnding {
        self.ending
    }

    /// Reads the next line into `buf`, replacing its contents.
    ///
    /// Returns the number of characters in the line, or `None` at the end of
    /// the stream.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<Option<usize>> {
        buf.clear();
        loop {
            let pending = &self.text[self.pos..];
            let found = pending[self.scan..]
                .find(|c: char| c == '\n' || c == '\r')
                .map(|i| i + self.scan);
            if let Some(idx) = found {
                let bytes = pending.as_bytes();
                let (ending, width) = if bytes[idx] == b'\n' {
                    (LineEnding::Lf, 1)
                } else if idx + 1 < bytes.len() {
                    if bytes[idx + 1] == b'\n' {
                        (LineEnding::CrLf, 2)
                    } else {
                        (LineEnding::Cr, 1)
                    }
                } else if self.eof {
                    (LineEnding::Cr, 1)
                } else {
                    // A '\n' may still follow in the next chunk.
                    self.scan = idx;
                    self.fill()?;
                    continue;
                };
                buf.push_str(&pending[..idx]);
                self.pos += idx + width;
                self.scan = 0;
                self.ending = ending;
                return Ok(Some(buf.chars().count()));
            }

            if self.eof {
                if pending.is_empty() {
                    return Ok(None);
                }
                buf.push_str(pending);
                self.pos = self.text.len();
                self.scan = 0;
                self.ending = LineEnding::None;
                return Ok(Some(buf.chars().count()));
            }

            self.scan = pending.len();
            self.fill()?;
        }
    }

    /// Reads the next line, keeping at most `max_chars` characters of it.
    ///
    /// The whole line is consumed and its full length is returned, so a
    /// return value larger than `max_chars` means `buf` holds a prefix.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_omsi::LineReader;
    ///
    /// let mut reader = LineReader::new(&b"abcdef\nnext"[..]);
    /// let mut buf = String::new();
    /// assert_eq!(reader.read_line_truncated(&mut buf, 4).unwrap(), Some(6));
    /// assert_eq!(buf, "abcd");
    /// assert_eq!(reader.read_line(&mut buf).unwrap(), Some(4));
    /// assert_eq!(buf, "next");
    /// ```
    pub fn read_line_truncated(
        &mut self,
        buf: &mut String,
        max_chars: usize,
    ) -> io::Result<Option<usize>> {
        let length = self.read_line(buf)?;
        if let Some((cut, _)) = buf.char_indices().nth(max_chars) {
            buf.truncate(cut);
        }
        Ok(length)
    }

    /// Returns the next character without consuming it.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        while self.pos >= self.text.len() && !self.eof {
            self.fill()?;
        }
        Ok(self.text[self.pos..].chars().next())
    }

    fn fill(&mut self) -> io::Result<()> {
        if self.eof {
            return Ok(());
        }
        if self.pos > 0 {
            self.text.drain(..self.pos);
            self.pos = 0;
        }

        let n = loop {
            match self.inner.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        let last = n == 0;

        match self.decoder.as_mut() {
            Some(decoder) => decoder.decode(&self.chunk[..n], &mut self.text, last),
            None => {
                self.head.extend_from_slice(&self.chunk[..n]);
                if self.head.len() < 4 && !last {
                    return Ok(());
                }
                let head = std::mem::take(&mut self.head);
                let (mut decoder, skip) = self.select_decoder(&head);
                log::trace!("decoding stream as {}", decoder.name());
                decoder.decode(&head[skip..], &mut self.text, last);
                self.decoder = Some(decoder);
            }
        }

        if last {
            self.eof = true;
        }
        Ok(())
    }

    fn select_decoder(&self, head: &[u8]) -> (TextDecoder, usize) {
        if self.detect_bom {
            if head.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
                return (
                    TextDecoder::Utf32 {
                        big_endian: false,
                        carry: Vec::new(),
                    },
                    4,
                );
            }
            if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
                return (
                    TextDecoder::Utf32 {
                        big_endian: true,
                        carry: Vec::new(),
                    },
                    4,
                );
            }
            if let Some((encoding, skip)) = Encoding::for_bom(head) {
                return (
                    TextDecoder::Standard(encoding.new_decoder_without_bom_handling()),
                    skip,
                );
            }
        }
        (
            TextDecoder::Standard(self.fallback.new_decoder_without_bom_handling()),
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(bytes: &[u8]) -> Vec<(String, LineEnding)> {
        let mut reader = LineReader::new(bytes);
        let mut line = String::new();
        let mut out = Vec::new();
        while reader.read_line(&mut line).unwrap().is_some() {
            out.push((line.clone(), reader.last_line_ending()));
        }
        out
    }

    /// Hands out at most `step` bytes per read call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_mixed_terminators() {
        let lines = lines_of(b"a\nb\r\nc\rd");
        assert_eq!(
            lines,
            vec![
                ("a".to_string(), LineEnding::Lf),
                ("b".to_string(), LineEnding::CrLf),
                ("c".to_string(), LineEnding::Cr),
                ("d".to_string(), LineEnding::None),
            ]
        );
    }

    #[test]
    fn test_empty_lines_and_trailing_terminator() {
        let lines = lines_of(b"\n\nx\n");
        let texts: Vec<_> = lines.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(texts, vec!["", "", "x"]);
        assert!(lines_of(b"").is_empty());
    }

    #[test]
    fn test_crlf_split_across_reads() {
        let data = b"first\r\nsecond\r\n";
        let mut reader = LineReader::new(Trickle { data, step: 6 });
        let mut line = String::new();
        assert_eq!(reader.read_line(&mut line).unwrap(), Some(5));
        assert_eq!(reader.last_line_ending(), LineEnding::CrLf);
        assert_eq!(reader.read_line(&mut line).unwrap(), Some(6));
        assert_eq!(line, "second");
        assert_eq!(reader.read_line(&mut line).unwrap(), None);
    }

    #[test]
    fn test_utf16_be_bom() {
        let mut data = vec![0xFE, 0xFF];
        for unit in "[LOD]\n100".encode_utf16() {
            data.extend_from_slice(&unit.to_be_bytes());
        }
        let mut reader = LineReader::new(Trickle { data: &data, step: 3 });
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "[LOD]");
        assert_eq!(reader.encoding_name(), Some("UTF-16BE"));
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "100");
    }

    #[test]
    fn test_utf32_boms() {
        for big_endian in [false, true] {
            let mut data = if big_endian {
                vec![0x00, 0x00, 0xFE, 0xFF]
            } else {
                vec![0xFF, 0xFE, 0x00, 0x00]
            };
            for c in "ä\r\nü".chars() {
                let code = c as u32;
                if big_endian {
                    data.extend_from_slice(&code.to_be_bytes());
                } else {
                    data.extend_from_slice(&code.to_le_bytes());
                }
            }
            let lines = lines_of(&data);
            let texts: Vec<_> = lines.iter().map(|(l, _)| l.as_str()).collect();
            assert_eq!(texts, vec!["ä", "ü"]);
        }
    }

    #[test]
    fn test_fallback_encoding_without_bom() {
        let data = b"Stra\xDFe\n";
        let mut reader = LineReader::with_encoding(&data[..], encoding_rs::WINDOWS_1252, true);
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "Straße");
    }

    #[test]
    fn test_forced_encoding_ignores_bom() {
        let data = b"\xEF\xBB\xBFx";
        let mut reader = LineReader::with_encoding(&data[..], encoding_rs::UTF_8, false);
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "\u{FEFF}x");
    }

    #[test]
    fn test_malformed_bytes_are_replaced() {
        let lines = lines_of(b"ok\xFF\n");
        assert_eq!(lines[0].0, "ok\u{FFFD}");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = LineReader::new(&b"[x]"[..]);
        assert_eq!(reader.peek().unwrap(), Some('['));
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "[x]");
        assert_eq!(reader.peek().unwrap(), None);
    }

    #[test]
    fn test_long_line_over_many_chunks() {
        let long = "x".repeat(CHUNK_SIZE * 3 + 17);
        let data = format!("{}\nshort", long);
        let mut reader = LineReader::new(data.as_bytes());
        let mut line = String::new();
        assert_eq!(
            reader.read_line_truncated(&mut line, 10).unwrap(),
            Some(long.len())
        );
        assert_eq!(line.len(), 10);
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "short");
    }
}
