use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{header, Frame, Headers};
use crate::parser::{escape_header_value, parse_frame_slice, unescape_header_value, ParseError};

/// Items carried over a STOMP connection.
///
/// Either a full frame, or a `Heartbeat` marker for the single LF a peer
/// sends to keep an otherwise idle connection alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StompItem {
    /// A decoded STOMP frame (command + headers + body)
    Frame(Frame),
    /// A single heart-beat pulse (LF)
    Heartbeat,
}

/// `StompCodec` implements `tokio_util::codec::{Decoder, Encoder}` for the
/// STOMP wire protocol.
///
/// - Decodes bytes into `StompItem::Frame` or `StompItem::Heartbeat`,
///   handling both NUL-terminated bodies and `content-length` bodies that
///   may themselves contain NUL bytes.
/// - Encodes items back to the wire format, emitting `content-length` for
///   binary bodies when the caller did not supply one.
///
/// Protocol damage surfaces as `io::Error` with kind `InvalidData`, which
/// terminates the reader the same way a broken socket would.
#[derive(Debug, Default)]
pub struct StompCodec;

impl StompCodec {
    pub fn new() -> Self {
        StompCodec
    }
}

fn invalid_data(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err.to_string())
}

fn decode_text(raw: Vec<u8>, what: &str) -> io::Result<String> {
    let unescaped = unescape_header_value(&raw)
        .map_err(|e| invalid_data(format!("{} in {}", e, what)))?;
    String::from_utf8(unescaped).map_err(|_| invalid_data(format!("invalid utf8 in {}", what)))
}

impl Decoder for StompCodec {
    type Item = StompItem;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // heart-beat: single LF (optionally CR LF)
        if src.chunk().first() == Some(&b'\n') {
            src.advance(1);
            return Ok(Some(StompItem::Heartbeat));
        }
        if src.chunk().starts_with(b"\r\n") {
            src.advance(2);
            return Ok(Some(StompItem::Heartbeat));
        }

        let (raw_command, raw_headers, body, consumed) = match parse_frame_slice(src.chunk()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e @ ParseError::ExceededMaxFrameSize) => {
                // drop the buffer: there is no resynchronizing after this
                src.clear();
                return Err(invalid_data(e));
            }
            Err(e) => return Err(invalid_data(e)),
        };
        src.advance(consumed);

        let command = String::from_utf8(raw_command)
            .map_err(|_| invalid_data("invalid utf8 in command"))?;

        let mut headers = Headers::new();
        for (name, value) in raw_headers {
            headers.append(
                decode_text(name, "header name")?,
                decode_text(value, "header value")?,
            );
        }

        Ok(Some(StompItem::Frame(Frame {
            command,
            headers,
            body: body.unwrap_or_default(),
        })))
    }
}

impl Encoder<StompItem> for StompCodec {
    type Error = io::Error;

    fn encode(&mut self, item: StompItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let frame = match item {
            StompItem::Heartbeat => {
                dst.put_u8(b'\n');
                return Ok(());
            }
            StompItem::Frame(frame) => frame,
        };

        dst.extend_from_slice(frame.command.as_bytes());
        dst.put_u8(b'\n');

        for (name, value) in frame.headers.iter() {
            dst.extend_from_slice(escape_header_value(name).as_bytes());
            dst.put_u8(b':');
            dst.extend_from_slice(escape_header_value(value).as_bytes());
            dst.put_u8(b'\n');
        }

        // A body containing NUL (or non-UTF-8 bytes) cannot be framed by
        // NUL termination alone; declare its length if the caller did not.
        let needs_length =
            frame.body.contains(&0) || std::str::from_utf8(&frame.body).is_err();
        if needs_length && !frame.headers.contains(header::CONTENT_LENGTH) {
            dst.extend_from_slice(
                format!("{}:{}\n", header::CONTENT_LENGTH, frame.body.len()).as_bytes(),
            );
        }

        dst.put_u8(b'\n');
        dst.extend_from_slice(&frame.body);
        dst.put_u8(0);
        Ok(())
    }
}
