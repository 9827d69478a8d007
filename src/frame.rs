use std::fmt;

use crate::error::StompError;

/// Maximum content length allowed for a frame body: 16 MiB.
pub const MAX_CONTENT_LENGTH: u32 = 16 * 1024 * 1024;

/// Maximum heart-beat interval in milliseconds. The heart-beat header
/// grammar allows at most nine digits per value.
pub const MAX_HEART_BEAT: u64 = 999_999_999;

/// STOMP command names. Commands are case-sensitive.
pub mod command {
    pub const CONNECT: &str = "CONNECT";
    pub const STOMP: &str = "STOMP";
    pub const CONNECTED: &str = "CONNECTED";
    pub const SEND: &str = "SEND";
    pub const SUBSCRIBE: &str = "SUBSCRIBE";
    pub const UNSUBSCRIBE: &str = "UNSUBSCRIBE";
    pub const ACK: &str = "ACK";
    pub const NACK: &str = "NACK";
    pub const BEGIN: &str = "BEGIN";
    pub const COMMIT: &str = "COMMIT";
    pub const ABORT: &str = "ABORT";
    pub const DISCONNECT: &str = "DISCONNECT";
    pub const MESSAGE: &str = "MESSAGE";
    pub const RECEIPT: &str = "RECEIPT";
    pub const ERROR: &str = "ERROR";
}

/// Standard STOMP header names.
pub mod header {
    pub const ACCEPT_VERSION: &str = "accept-version";
    pub const ACK: &str = "ack";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const DESTINATION: &str = "destination";
    pub const HEART_BEAT: &str = "heart-beat";
    pub const HOST: &str = "host";
    pub const ID: &str = "id";
    pub const LOGIN: &str = "login";
    pub const MESSAGE: &str = "message";
    pub const MESSAGE_ID: &str = "message-id";
    pub const PASSCODE: &str = "passcode";
    pub const RECEIPT: &str = "receipt";
    pub const RECEIPT_ID: &str = "receipt-id";
    pub const SERVER: &str = "server";
    pub const SUBSCRIPTION: &str = "subscription";
    pub const TRANSACTION: &str = "transaction";
    pub const VERSION: &str = "version";
}

/// Negotiated STOMP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    V1_0,
    V1_1,
    V1_2,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1_0 => "1.0",
            Version::V1_1 => "1.1",
            Version::V1_2 => "1.2",
        }
    }

    fn from_str(text: &str) -> Option<Version> {
        match text {
            "1.0" => Some(Version::V1_0),
            "1.1" => Some(Version::V1_1),
            "1.2" => Some(Version::V1_2),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered collection of STOMP headers.
///
/// Insertion order is preserved for serialization. A header name may occur
/// more than once; per the STOMP 1.2 repeated-header rule, lookups return
/// the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Headers(Vec::new())
    }

    /// Append a header, keeping any existing occurrences of the name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the first header matching `name` (case-sensitive).
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Replace the value of the first occurrence of `name`, or append the
    /// header if it is not present.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.into(),
            None => self.append(name, value),
        }
    }

    /// Remove every occurrence of `name`.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| k != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Headers(iter.into_iter().collect())
    }
}

/// A single STOMP frame: command, ordered headers and raw body bytes.
///
/// Only SEND, MESSAGE and ERROR frames may carry a body; `validate`
/// enforces this along with the per-command required headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// STOMP command (e.g. CONNECT, SEND, SUBSCRIBE). Case-sensitive.
    pub command: String,
    /// Frame headers in wire order.
    pub headers: Headers,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given command and empty headers/body.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (builder style).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the frame body (builder style).
    pub fn set_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Parse the `content-length` header, if present.
    ///
    /// The value must be an unsigned decimal that fits 32 bits; anything
    /// larger than [`MAX_CONTENT_LENGTH`] fails with `ExceededMaxFrameSize`.
    /// When the header is absent the body extends to the next NUL on the
    /// wire, and `Ok(None)` is returned.
    pub fn content_length(&self) -> Result<Option<usize>, StompError> {
        let text = match self.headers.first(header::CONTENT_LENGTH) {
            Some(text) => text,
            None => return Ok(None),
        };
        let value: u32 = text
            .parse()
            .map_err(|_| StompError::InvalidContentLength)?;
        if value > MAX_CONTENT_LENGTH {
            return Err(StompError::ExceededMaxFrameSize);
        }
        Ok(Some(value as usize))
    }

    /// Negotiate the protocol version from the `accept-version` header.
    ///
    /// The listed versions are sorted lexicographically and scanned in
    /// order; the last recognized version wins, so the highest supported
    /// version offered by the client is chosen. A CONNECT frame without
    /// the header defaults to 1.0; a STOMP frame must carry it.
    pub fn accept_version(&self) -> Result<Version, StompError> {
        let is_connect = self.command == command::CONNECT;
        if !is_connect && self.command != command::STOMP {
            return Err(StompError::NotConnectFrame);
        }

        match self.headers.first(header::ACCEPT_VERSION) {
            Some(accept) => {
                let mut offered: Vec<&str> = accept.split(',').collect();
                offered.sort_unstable();
                let mut negotiated = None;
                for text in offered {
                    if let Some(version) = Version::from_str(text) {
                        negotiated = Some(version);
                    }
                }
                negotiated.ok_or(StompError::UnknownVersion)
            }
            None => {
                if is_connect {
                    // V1.0 clients may omit accept-version entirely.
                    Ok(Version::V1_0)
                } else {
                    Err(StompError::MissingHeader(
                        header::ACCEPT_VERSION.to_string(),
                    ))
                }
            }
        }
    }

    /// Parse the `heart-beat` header into `(cx, cy)` milliseconds.
    ///
    /// Defined only for CONNECT, STOMP and CONNECTED frames. An absent
    /// header yields `(0, 0)` (heart-beating disabled in both directions).
    pub fn heart_beat(&self) -> Result<(u64, u64), StompError> {
        match self.command.as_str() {
            command::CONNECT | command::STOMP | command::CONNECTED => {}
            _ => return Err(StompError::InvalidOperationForFrame),
        }
        match self.headers.first(header::HEART_BEAT) {
            Some(text) => parse_heart_beat(text),
            None => Ok((0, 0)),
        }
    }

    /// Check the frame for required headers and the body rule.
    pub fn validate(&self) -> Result<(), StompError> {
        match self.command.as_str() {
            command::CONNECT | command::STOMP => self.validate_connect()?,
            command::CONNECTED | command::DISCONNECT | command::ERROR => {}
            command::SEND => self.require(&[header::DESTINATION])?,
            command::SUBSCRIBE => self.require(&[header::DESTINATION, header::ID])?,
            command::UNSUBSCRIBE | command::ACK | command::NACK => {
                self.require(&[header::ID])?
            }
            command::BEGIN | command::COMMIT | command::ABORT => {
                self.require(&[header::TRANSACTION])?
            }
            command::MESSAGE => self.require(&[
                header::DESTINATION,
                header::MESSAGE_ID,
                header::SUBSCRIPTION,
            ])?,
            command::RECEIPT => self.require(&[header::RECEIPT_ID])?,
            _ => return Err(StompError::InvalidCommand),
        }

        match self.command.as_str() {
            command::SEND | command::MESSAGE | command::ERROR => Ok(()),
            _ if !self.body.is_empty() => Err(StompError::InvalidOperationForFrame),
            _ => Ok(()),
        }
    }

    fn require(&self, names: &[&str]) -> Result<(), StompError> {
        for name in names {
            if !self.headers.contains(name) {
                return Err(StompError::MissingHeader(name.to_string()));
            }
        }
        Ok(())
    }

    fn validate_connect(&self) -> Result<(), StompError> {
        let version = self.accept_version()?;
        if version == Version::V1_0 {
            // no mandatory headers in V1.0
            return Ok(());
        }

        // The STOMP specification mandates the host header for 1.1 and
        // later. Its value is never used.
        self.require(&[header::HOST])?;

        if let Some(text) = self.headers.first(header::HEART_BEAT) {
            parse_heart_beat(text)?;
        }
        Ok(())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Command: {}", self.command)?;
        for (k, v) in self.headers.iter() {
            writeln!(f, "{}: {}", k, v)?;
        }
        writeln!(f, "Body ({} bytes)", self.body.len())
    }
}

/// Parse a heart-beat header value: two comma-separated decimal values of
/// one to nine digits each.
fn parse_heart_beat(text: &str) -> Result<(u64, u64), StompError> {
    let (cx, cy) = text.split_once(',').ok_or(StompError::InvalidHeartBeat)?;
    Ok((parse_heart_beat_value(cx)?, parse_heart_beat_value(cy)?))
}

fn parse_heart_beat_value(text: &str) -> Result<u64, StompError> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StompError::InvalidHeartBeat);
    }
    // at most nine ASCII digits, so this cannot overflow
    text.parse().map_err(|_| StompError::InvalidHeartBeat)
}
