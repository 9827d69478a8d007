//! Slice-based incremental parser for the STOMP wire grammar.
//!
//! `parse_frame_slice` consumes a prefix of the input and reports how many
//! bytes it used, so the codec can parse across arbitrary chunk boundaries.

use crate::frame::MAX_CONTENT_LENGTH;

/// A parsed frame as raw bytes: command, headers, optional body, and the
/// number of input bytes consumed.
pub type RawFrame = (Vec<u8>, Vec<(Vec<u8>, Vec<u8>)>, Option<Vec<u8>>, usize);

/// Wire-level parse failures. These terminate the connection's reader; the
/// session engine never sees them as frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MalformedHeaderLine,
    InvalidContentLength,
    ExceededMaxFrameSize,
    MissingNullTerminator,
    InvalidEscapeSequence,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ParseError::MalformedHeaderLine => "malformed header line",
            ParseError::InvalidContentLength => "invalid content-length",
            ParseError::ExceededMaxFrameSize => "exceeded maximum frame size",
            ParseError::MissingNullTerminator => "missing NUL terminator after body",
            ParseError::InvalidEscapeSequence => "invalid escape sequence in header",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ParseError {}

/// Escape a header name or value for wire transmission, per STOMP 1.2:
/// backslash, carriage return, line feed and colon are replaced with
/// `\\`, `\r`, `\n` and `\c`.
pub fn escape_header_value(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\r' => result.push_str("\\r"),
            '\n' => result.push_str("\\n"),
            ':' => result.push_str("\\c"),
            _ => result.push(ch),
        }
    }
    result
}

/// Reverse of [`escape_header_value`]. Any backslash followed by a
/// character outside the escape table is an error, as is a trailing
/// backslash.
pub fn unescape_header_value(input: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut result = Vec::with_capacity(input.len());
    let mut bytes = input.iter();
    while let Some(&b) = bytes.next() {
        if b != b'\\' {
            result.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'\\') => result.push(b'\\'),
            Some(b'r') => result.push(b'\r'),
            Some(b'n') => result.push(b'\n'),
            Some(b'c') => result.push(b':'),
            _ => return Err(ParseError::InvalidEscapeSequence),
        }
    }
    Ok(result)
}

/// Extract a content-length value from raw header lines, enforcing the
/// 32-bit bound and the 16 MiB frame-size cap.
fn get_content_length(headers: &[(Vec<u8>, Vec<u8>)]) -> Result<Option<usize>, ParseError> {
    for (name, value) in headers {
        if name == b"content-length" {
            let text = std::str::from_utf8(value).map_err(|_| ParseError::InvalidContentLength)?;
            let parsed: u32 = text
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidContentLength)?;
            if parsed > MAX_CONTENT_LENGTH {
                return Err(ParseError::ExceededMaxFrameSize);
            }
            return Ok(Some(parsed as usize));
        }
    }
    Ok(None)
}

/// Parse a single STOMP frame from a raw byte slice.
///
/// Returns `Ok(Some((command, headers, body, consumed)))` when a full frame
/// was parsed, `Ok(None)` when more bytes are required, and `Err` on
/// protocol errors. Header names and values are returned still escaped;
/// the codec unescapes them when building the owned frame.
pub fn parse_frame_slice(input: &[u8]) -> Result<Option<RawFrame>, ParseError> {
    let mut pos = 0usize;
    let len = input.len();

    // command line, up to the next LF (optional trailing CR stripped)
    let cmd_end = match input[pos..].iter().position(|&b| b == b'\n') {
        Some(i) => i,
        None => return Ok(None),
    };
    let mut command = input[pos..pos + cmd_end].to_vec();
    if command.last() == Some(&b'\r') {
        command.pop();
    }
    pos += cmd_end + 1;

    // header lines until a blank line
    let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    loop {
        if pos >= len {
            return Ok(None);
        }
        if input[pos] == b'\n' {
            pos += 1;
            break;
        }
        if input[pos] == b'\r' && input.get(pos + 1) == Some(&b'\n') {
            pos += 2;
            break;
        }
        let line_end = match input[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => i,
            None => return Ok(None),
        };
        let mut line = &input[pos..pos + line_end];
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }
        match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                headers.push((line[..colon].to_vec(), line[colon + 1..].to_vec()));
            }
            None => return Err(ParseError::MalformedHeaderLine),
        }
        pos += line_end + 1;
    }

    match get_content_length(&headers)? {
        Some(content_len) => {
            // need content_len bytes plus the terminating NUL
            if pos + content_len + 1 > len {
                return Ok(None);
            }
            let body = input[pos..pos + content_len].to_vec();
            pos += content_len;
            if input[pos] != 0 {
                return Err(ParseError::MissingNullTerminator);
            }
            pos += 1;
            if pos < len && input[pos] == b'\n' {
                pos += 1;
            }
            Ok(Some((command, headers, Some(body), pos)))
        }
        None => {
            // body extends to the next NUL
            match input[pos..].iter().position(|&b| b == 0) {
                Some(nul) => {
                    if nul > MAX_CONTENT_LENGTH as usize {
                        return Err(ParseError::ExceededMaxFrameSize);
                    }
                    let body = input[pos..pos + nul].to_vec();
                    pos += nul + 1;
                    if pos < len && input[pos] == b'\n' {
                        pos += 1;
                    }
                    let body = if body.is_empty() { None } else { Some(body) };
                    Ok(Some((command, headers, body, pos)))
                }
                None => {
                    if len - pos > MAX_CONTENT_LENGTH as usize {
                        return Err(ParseError::ExceededMaxFrameSize);
                    }
                    Ok(None)
                }
            }
        }
    }
}
