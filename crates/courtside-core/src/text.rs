// Text decoding for imported files.
//
// A byte-order mark wins outright. Without one, a fixed list of candidate
// encodings is tried and the decode with the fewest suspicious characters
// (U+FFFD replacements and NULs) is kept.

use std::path::Path;

use encoding_rs::{Encoding, BIG5, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use tracing::debug;

/// Candidates in preference order. ISO-8859-1 is covered by windows-1252,
/// which is how encoding_rs labels it.
fn candidates() -> [&'static Encoding; 5] {
    [UTF_8, UTF_16LE, UTF_16BE, BIG5, WINDOWS_1252]
}

/// Result of decoding raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Name of the encoding that produced `text` (e.g. "UTF-8").
    pub encoding: &'static str,
}

/// Decode raw file bytes into text.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text: text.into_owned(),
            encoding: encoding.name(),
        };
    }

    let mut best: Option<(usize, String, &'static Encoding)> = None;
    for encoding in candidates() {
        if is_utf16(encoding) && !looks_like_utf16(bytes) {
            continue;
        }
        let (text, _) = encoding.decode_without_bom_handling(bytes);
        let score = suspicious_count(&text);
        debug!("decode candidate {}: score {}", encoding.name(), score);
        let better = best.as_ref().map_or(true, |(s, _, _)| score < *s);
        if better {
            best = Some((score, text.into_owned(), encoding));
        }
        if score == 0 && (encoding == UTF_8 || encoding == UTF_16LE) {
            break;
        }
    }

    match best {
        Some((_, text, encoding)) => DecodedText {
            text,
            encoding: encoding.name(),
        },
        None => DecodedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding: UTF_8.name(),
        },
    }
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// BOM-less UTF-16 only decodes cleanly from an even number of bytes, and
/// comma-separated text in it always carries NUL high bytes.
fn looks_like_utf16(bytes: &[u8]) -> bool {
    bytes.len() % 2 == 0 && bytes.contains(&0)
}

fn suspicious_count(text: &str) -> usize {
    text.chars().filter(|&c| c == '\u{FFFD}' || c == '\0').count()
}

/// Read a whole file and decode it. This is the only async step of an
/// import: the caller receives the complete text before any parsing.
pub async fn read_text_file(path: &Path) -> std::io::Result<DecodedText> {
    let bytes = tokio::fs::read(path).await?;
    Ok(decode_bytes(&bytes))
}
