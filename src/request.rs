use crate::connection::Conn;
use crate::frame::Frame;
use crate::subscription::Subscription;

/// Requests a session sends to the broker upper layer.
///
/// One request channel per broker carries these from every connection.
/// Sends may block when the upper layer falls behind; that backpressure is
/// intentional and propagates toward the client socket.
#[derive(Debug)]
pub enum Request {
    /// Client-originated frame to route (SEND, SUBSCRIBE, UNSUBSCRIBE,
    /// ACK, NACK).
    Enqueue(Frame),
    /// An auto-ack subscription delivery completed; the subscription is
    /// ready for its next message.
    Subscribe(Subscription),
    /// The session is dropping this subscription.
    Unsubscribe(Subscription),
    /// An unacknowledged MESSAGE must re-enter the broker for redelivery.
    Requeue(Frame),
    /// The session is terminating.
    Disconnected(Conn),
}
