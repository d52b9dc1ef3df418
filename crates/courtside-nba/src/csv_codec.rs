// CSV tokenizer and writer.
//
// Parsing is a single pass over the characters with three pieces of state:
// the inside-quotes flag, the current field and the current row. Writing
// goes through the `csv` crate with minimal quoting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to write CSV: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Split delimited text into rows of cells.
///
/// - `"` toggles quoting; `""` inside quotes is a literal quote.
/// - `,` outside quotes ends a field.
/// - CR, LF or CRLF outside quotes ends a row.
/// - Blank lines yield no row; a final row without a newline is kept.
///
/// A line holding only `""` is indistinguishable from a blank line here and
/// is dropped too, so a row made of one empty cell does not survive
/// `serialize` then `parse`. Rows with two or more cells do.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if !field.is_empty() || !row.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                field.clear();
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Serialize a header and data rows. Fields containing a comma, quote or
/// line break are quoted with inner quotes doubled. Rows end with `\n`.
pub fn serialize<H, R, S>(header: &[H], rows: &[R]) -> Result<String, CodecError>
where
    H: AsRef<str>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(row.as_ref().iter().map(|c| c.as_ref()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CodecError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
