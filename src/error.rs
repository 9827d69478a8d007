use thiserror::Error;

/// Errors produced by frame validation and session processing.
///
/// When the session engine encounters one of these while handling a client
/// frame, the error's display text becomes the `message` header of the
/// ERROR frame sent back to the client.
#[derive(Error, Debug)]
pub enum StompError {
    /// Command is not part of the STOMP vocabulary.
    #[error("invalid command")]
    InvalidCommand,
    /// Command is valid STOMP but the connected state has no handler for it.
    #[error("unknown command")]
    UnknownCommand,
    /// Command is not permitted in the current session state.
    #[error("unexpected command")]
    UnexpectedCommand,
    /// A command other than CONNECT/STOMP arrived before the session
    /// was established.
    #[error("expected CONNECT or STOMP frame")]
    NotConnected,
    /// Version negotiation was attempted on a frame that is not
    /// CONNECT or STOMP.
    #[error("frame is not a CONNECT or STOMP frame")]
    NotConnectFrame,
    /// A header required by the frame's command is absent.
    #[error("missing header: {0}")]
    MissingHeader(String),
    /// None of the versions offered in accept-version is supported.
    #[error("unknown version")]
    UnknownVersion,
    /// The heart-beat header does not match "cx,cy" with 1-9 digit values.
    #[error("invalid heart-beat")]
    InvalidHeartBeat,
    /// The content-length header is not an unsigned 32-bit decimal.
    #[error("invalid content-length")]
    InvalidContentLength,
    /// The frame body (or declared content-length) exceeds the 16 MiB cap.
    #[error("exceeded maximum frame size")]
    ExceededMaxFrameSize,
    /// CONNECT and STOMP frames must not carry a receipt header.
    #[error("receipt header not allowed in CONNECT or STOMP frame")]
    ReceiptInConnect,
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The requested operation is not defined for this frame's command,
    /// or the frame carries a body its command does not allow.
    #[error("invalid operation for frame")]
    InvalidOperationForFrame,
    /// BEGIN named a transaction id that is already open.
    #[error("transaction already in progress: {0}")]
    TransactionInProgress(String),
    /// SEND/COMMIT/ABORT named a transaction id that is not open.
    #[error("transaction not in progress: {0}")]
    TransactionNotInProgress(String),
    /// I/O-level error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
