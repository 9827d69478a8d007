//! Per-connection protocol core: the reader task and the session engine.
//!
//! Each accepted socket gets exactly two tasks. The reader assembles bytes
//! into frames and enforces the read-side heart-beat deadline; the session
//! engine owns every piece of session state (negotiated version, timeouts,
//! message-id counter, transactions, subscriptions) and is the only writer
//! to the socket, so no locking is needed anywhere.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::codec::{StompCodec, StompItem};
use crate::config::Config;
use crate::error::StompError;
use crate::frame::{command, header, Frame, Version, MAX_HEART_BEAT};
use crate::request::Request;
use crate::subscription::{AckMode, Subscription, SubscriptionList};
use crate::transaction::TxStore;

/// Maximum number of pending frames allowed to a client before senders
/// to this connection start blocking. Keeps per-connection memory small
/// while absorbing jitter.
const MAX_PENDING_WRITES: usize = 16;

/// Maximum number of read frames buffered before the reader task blocks,
/// pushing backpressure onto the socket.
const MAX_PENDING_READS: usize = 16;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Error returned when handing work to a session whose connection has
/// already closed.
#[derive(Error, Debug)]
#[error("connection closed")]
pub struct ClosedError;

/// Handle to a live client connection.
///
/// The upper layer keeps one per session and uses it to push outbound
/// frames and subscription deliveries. Cloneable; the session itself runs
/// on its own task and is reached only through the handle's channels.
#[derive(Debug, Clone)]
pub struct Conn {
    id: u64,
    frame_tx: mpsc::Sender<Frame>,
    sub_tx: mpsc::Sender<Subscription>,
}

impl Conn {
    /// Start the reader and session tasks for an accepted transport and
    /// return the connection handle.
    ///
    /// All client requests are reported to the upper layer through
    /// `request_tx`; see [`Request`] for the vocabulary.
    pub fn spawn<S>(
        config: Arc<dyn Config>,
        transport: S,
        request_tx: mpsc::Sender<Request>,
    ) -> Conn
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
        let (read_half, write_half) = tokio::io::split(transport);
        let (read_tx, read_rx) = mpsc::channel(MAX_PENDING_READS);
        let (frame_tx, frame_rx) = mpsc::channel(MAX_PENDING_WRITES);
        let (sub_tx, sub_rx) = mpsc::channel(MAX_PENDING_WRITES);
        let handle = Conn {
            id,
            frame_tx,
            sub_tx,
        };

        let reader = FramedRead::new(read_half, StompCodec::new());
        tokio::spawn(read_loop(reader, read_tx, config.clone(), id));

        let session = Session {
            config,
            writer: FramedWrite::new(write_half, StompCodec::new()),
            request_tx,
            handle: handle.clone(),
            state: State::Connecting,
            version: Version::V1_0,
            write_timeout: Duration::ZERO,
            last_message_id: 0,
            tx_store: TxStore::new(),
            subs: HashMap::new(),
            sub_list: SubscriptionList::new(),
        };
        tokio::spawn(run(session, read_rx, frame_rx, sub_rx));
        handle
    }

    /// Process-unique connection id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a frame for delivery with no acknowledgement required (topic
    /// fan-out, server-initiated ERROR). Blocks while the session's
    /// outbound queue is full.
    pub async fn send(&self, frame: Frame) -> Result<(), ClosedError> {
        self.frame_tx.send(frame).await.map_err(|_| ClosedError)
    }

    /// Send an ERROR frame to the client. The session disconnects as soon
    /// as the frame has been transmitted.
    pub async fn send_error(&self, err: &StompError) -> Result<(), ClosedError> {
        let frame = Frame::new(command::ERROR).header(header::MESSAGE, err.to_string());
        self.send(frame).await
    }

    /// Queue a subscription delivery. The subscription must carry the
    /// MESSAGE frame to deliver; depending on its ack mode the session
    /// either reports completion straight back ([`Request::Subscribe`]) or
    /// parks the subscription until the client acknowledges.
    pub async fn deliver(&self, sub: Subscription) -> Result<(), ClosedError> {
        self.sub_tx.send(sub).await.map_err(|_| ClosedError)
    }
}

/// Minimum heart-beat period the server insists on, in milliseconds.
fn server_min_heart_beat(config: &dyn Config) -> u64 {
    (config.heart_beat().as_millis() as u64).min(MAX_HEART_BEAT)
}

/// Reader task: assembles frames from the socket and forwards them on the
/// inbound channel. Also enforces the read-side heart-beat deadline, which
/// it bootstraps from the first data frame so no state is shared with the
/// session engine.
async fn read_loop<R>(
    mut reader: FramedRead<R, StompCodec>,
    read_tx: mpsc::Sender<Frame>,
    config: Arc<dyn Config>,
    conn_id: u64,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut expecting_connect = true;
    let mut read_timeout = Duration::ZERO;
    loop {
        let item = if read_timeout.is_zero() {
            reader.next().await
        } else {
            match tokio::time::timeout(read_timeout, reader.next()).await {
                Ok(item) => item,
                Err(_) => {
                    debug!(conn = conn_id, "heart-beat deadline expired");
                    break;
                }
            }
        };

        let frame = match item {
            None => {
                debug!(conn = conn_id, "connection closed");
                break;
            }
            Some(Err(e)) => {
                debug!(conn = conn_id, error = %e, "read failed");
                break;
            }
            // heart-beats only refresh the deadline, which happens by
            // virtue of having completed a read
            Some(Ok(StompItem::Heartbeat)) => continue,
            Some(Ok(StompItem::Frame(frame))) => frame,
        };

        if expecting_connect {
            expecting_connect = false;
            // Best-effort peek at the CONNECT heart-beat header. On any
            // parse failure the deadline stays at zero; the session engine
            // validates the frame authoritatively and reports the error.
            if let Ok((cx, _)) = frame.heart_beat() {
                if cx > 0 {
                    let cx = cx.max(server_min_heart_beat(config.as_ref()));
                    read_timeout = Duration::from_millis(cx);
                }
            }
        }

        if read_tx.send(frame).await.is_err() {
            break;
        }
    }
    // Dropping read_tx closes the inbound channel, which is how the
    // session engine learns the socket is done. It is the only channel
    // closed from this side.
}

/// Session state machine states.
enum State {
    Connecting,
    Connected,
}

/// What the event loop should do after handling an event.
enum Flow {
    Continue,
    Disconnect,
}

type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<Flow, StompError>> + Send + 'a>>;

/// All per-session state. Owned by the engine task; never shared.
struct Session<W> {
    config: Arc<dyn Config>,
    writer: FramedWrite<W, StompCodec>,
    request_tx: mpsc::Sender<Request>,
    handle: Conn,
    state: State,
    version: Version,
    write_timeout: Duration,
    last_message_id: u64,
    tx_store: TxStore,
    subs: HashMap<String, Subscription>,
    sub_list: SubscriptionList,
}

/// Session engine event loop. Multiplexes inbound frames, fire-and-forget
/// outbound frames, subscription deliveries and the write heart-beat
/// timer; terminates on the first write failure, transmitted ERROR,
/// handler error or closed channel, then runs cleanup.
async fn run<W>(
    mut session: Session<W>,
    mut read_rx: mpsc::Receiver<Frame>,
    mut frame_rx: mpsc::Receiver<Frame>,
    mut sub_rx: mpsc::Receiver<Subscription>,
) where
    W: AsyncWrite + Unpin + Send + 'static,
{
    loop {
        // re-armed by every event, so it only fires after a full quiet
        // window
        let heart_beat_due = tokio::time::sleep(session.write_timeout);

        let flow = tokio::select! {
            maybe = read_rx.recv() => match maybe {
                Some(frame) => session.on_client_frame(frame).await,
                None => Flow::Disconnect,
            },
            maybe = frame_rx.recv() => match maybe {
                Some(frame) => session.on_outbound_frame(frame).await,
                None => Flow::Disconnect,
            },
            maybe = sub_rx.recv() => match maybe {
                Some(sub) => session.on_delivery(sub).await,
                None => Flow::Disconnect,
            },
            _ = heart_beat_due, if !session.write_timeout.is_zero() => {
                session.on_write_heart_beat().await
            }
        };

        if let Flow::Disconnect = flow {
            break;
        }
    }
    session.cleanup(&mut frame_rx, &mut sub_rx).await;
}

fn required_header(frame: &Frame, name: &str) -> Result<String, StompError> {
    frame
        .headers
        .first(name)
        .map(str::to_string)
        .ok_or_else(|| StompError::MissingHeader(name.to_string()))
}

impl<W> Session<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn on_client_frame(&mut self, mut frame: Frame) -> Flow {
        if let Err(err) = frame.validate() {
            self.send_error_immediately(&err, &frame).await;
            return Flow::Disconnect;
        }
        match self.dispatch(&mut frame).await {
            Ok(flow) => flow,
            Err(err) => {
                // By now any receipt header has either been answered (and
                // stripped), or is still on the frame and gets echoed as
                // receipt-id here.
                self.send_error_immediately(&err, &frame).await;
                Flow::Disconnect
            }
        }
    }

    /// Route a validated frame to its handler according to session state.
    /// Also re-entered by commit replay, with the stored frames.
    ///
    /// Explicitly boxed (rather than a plain `async fn`) so the recursive
    /// call through `handle_commit` has a concrete, already-erased future
    /// type to bottom out on; otherwise rustc cannot prove the opaque
    /// future type `Send` through the cycle.
    fn dispatch<'a>(&'a mut self, frame: &'a mut Frame) -> DispatchFuture<'a> {
        Box::pin(async move {
            match self.state {
                State::Connecting => match frame.command.as_str() {
                    command::CONNECT | command::STOMP => self.handle_connect(frame).await,
                    _ => Err(StompError::NotConnected),
                },
                State::Connected => match frame.command.as_str() {
                    command::CONNECT | command::STOMP => Err(StompError::UnexpectedCommand),
                    command::DISCONNECT => self.handle_disconnect(frame).await,
                    command::BEGIN => self.handle_begin(frame).await,
                    command::COMMIT => self.handle_commit(frame).await,
                    command::ABORT => self.handle_abort(frame).await,
                    command::SEND => self.handle_send(frame).await,
                    command::SUBSCRIBE => self.forward_to_broker(frame).await,
                    command::UNSUBSCRIBE => self.handle_unsubscribe(frame).await,
                    command::ACK => self.handle_ack(frame).await,
                    command::NACK => self.handle_nack(frame).await,
                    command::MESSAGE | command::RECEIPT | command::ERROR => {
                        // only ever sent by a server, never by a client
                        Err(StompError::UnexpectedCommand)
                    }
                    _ => Err(StompError::UnknownCommand),
                },
            }
        })
    }

    async fn handle_connect(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        if frame.headers.contains(header::RECEIPT) {
            return Err(StompError::ReceiptInConnect);
        }

        let login = frame.headers.first(header::LOGIN);
        let passcode = frame.headers.first(header::PASSCODE);
        if !self.config.authenticate(login, passcode) {
            // slow down a rogue client scanning for credentials
            tokio::time::sleep(self.config.auth_failure_delay()).await;
            return Err(StompError::AuthenticationFailed);
        }

        self.version = frame.accept_version()?;

        let (mut cx, mut cy) = frame.heart_beat()?;
        let min = server_min_heart_beat(self.config.as_ref());
        // clients asking for shorter periods than the server minimum get
        // the longer period
        if cx > 0 && cx < min {
            cx = min;
        }
        if cy > 0 && cy < min {
            cy = min;
        }
        self.write_timeout = Duration::from_millis(cy);

        // The client's read side is the server's write side and vice
        // versa, hence the swapped order. The header is included even for
        // V1.0 clients, which tolerate it.
        let connected = Frame::new(command::CONNECTED)
            .header(header::VERSION, self.version.as_str())
            .header(header::SERVER, self.config.server())
            .header(header::HEART_BEAT, format!("{},{}", cy, cx));
        self.writer.send(StompItem::Frame(connected)).await?;

        info!(conn = self.handle.id(), version = %self.version, "client connected");
        self.state = State::Connected;
        Ok(Flow::Continue)
    }

    async fn handle_disconnect(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        // After a DISCONNECT no further frames go to the client, except
        // the receipt it may have asked for. A failed receipt write is
        // ignored; the connection is closing either way.
        let _ = self.send_receipt_immediately(frame).await;
        Ok(Flow::Disconnect)
    }

    async fn handle_begin(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        let tx = required_header(frame, header::TRANSACTION)?;
        self.send_receipt_immediately(frame).await?;
        self.tx_store.begin(&tx)?;
        Ok(Flow::Continue)
    }

    async fn handle_commit(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        let tx = required_header(frame, header::TRANSACTION)?;
        self.send_receipt_immediately(frame).await?;
        // Replay every buffered frame through state dispatch. Transaction
        // and receipt headers were stripped before storage, so a stored
        // SEND re-enters as a plain SEND and receipts are not repeated.
        for mut stored in self.tx_store.commit(&tx)? {
            let replay: DispatchFuture<'_> = Box::pin(self.dispatch(&mut stored));
            replay.await?;
        }
        Ok(Flow::Continue)
    }

    async fn handle_abort(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        let tx = required_header(frame, header::TRANSACTION)?;
        self.send_receipt_immediately(frame).await?;
        self.tx_store.abort(&tx)?;
        Ok(Flow::Continue)
    }

    async fn handle_send(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        self.send_receipt_immediately(frame).await?;
        match frame.headers.first(header::TRANSACTION).map(str::to_string) {
            Some(tx) => {
                self.tx_store.add(&tx, std::mem::take(frame))?;
                Ok(Flow::Continue)
            }
            None => {
                if self
                    .request_tx
                    .send(Request::Enqueue(std::mem::take(frame)))
                    .await
                    .is_err()
                {
                    return Ok(Flow::Disconnect);
                }
                Ok(Flow::Continue)
            }
        }
    }

    /// Receipt, then hand the frame to the upper layer unchanged. Used
    /// directly for SUBSCRIBE and as the first step of UNSUBSCRIBE, ACK
    /// and NACK.
    async fn forward_to_broker(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        self.send_receipt_immediately(frame).await?;
        if self
            .request_tx
            .send(Request::Enqueue(std::mem::take(frame)))
            .await
            .is_err()
        {
            return Ok(Flow::Disconnect);
        }
        Ok(Flow::Continue)
    }

    async fn handle_unsubscribe(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        let id = required_header(frame, header::ID)?;
        let flow = self.forward_to_broker(frame).await?;
        // The subscription is being dismissed; a delivery still awaiting
        // acknowledgement goes back to the broker.
        self.subs.remove(&id);
        if let Some(mut sub) = self.sub_list.find_by_id_and_remove(&id) {
            if let Some(pending) = sub.take_frame() {
                let _ = self.request_tx.send(Request::Requeue(pending)).await;
            }
        }
        Ok(flow)
    }

    async fn handle_ack(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        let ack_id = required_header(frame, header::ID)?;
        let flow = self.forward_to_broker(frame).await?;
        // The delivery is settled; the frame must not be requeued when the
        // session eventually terminates.
        self.sub_list.remove_by_message_id(&ack_id);
        Ok(flow)
    }

    async fn handle_nack(&mut self, frame: &mut Frame) -> Result<Flow, StompError> {
        let ack_id = required_header(frame, header::ID)?;
        let flow = self.forward_to_broker(frame).await?;
        if let Some(mut sub) = self.sub_list.remove_by_message_id(&ack_id) {
            if let Some(rejected) = sub.take_frame() {
                let _ = self.request_tx.send(Request::Requeue(rejected)).await;
            }
        }
        Ok(flow)
    }

    /// Fire-and-forget outbound frame from the upper layer.
    async fn on_outbound_frame(&mut self, mut frame: Frame) -> Flow {
        // topic messages are delivered without acknowledgement
        self.allocate_message_id(&mut frame, AckMode::Auto);
        let is_error = frame.command == command::ERROR;
        if self.writer.send(StompItem::Frame(frame)).await.is_err() {
            return Flow::Disconnect;
        }
        if is_error {
            // the ERROR frame has been flushed; drop the client
            return Flow::Disconnect;
        }
        Flow::Continue
    }

    /// Subscription delivery from the upper layer; may require client
    /// acknowledgement depending on the subscription's ack mode.
    async fn on_delivery(&mut self, mut sub: Subscription) -> Flow {
        let mut frame = match sub.take_frame() {
            Some(frame) => frame,
            None => {
                warn!(conn = self.handle.id(), sub = sub.id(), "delivery without frame");
                return Flow::Continue;
            }
        };
        self.allocate_message_id(&mut frame, sub.ack());

        // Deliveries are how the session learns which subscriptions exist;
        // remember it so cleanup can unsubscribe it.
        self.subs.insert(sub.id().to_string(), sub.detached());

        match sub.ack() {
            AckMode::Auto => {
                if self.writer.send(StompItem::Frame(frame)).await.is_err() {
                    return Flow::Disconnect;
                }
                // no acknowledgement coming; the subscription is free for
                // its next message right away
                if self.request_tx.send(Request::Subscribe(sub)).await.is_err() {
                    return Flow::Disconnect;
                }
                Flow::Continue
            }
            AckMode::Client | AckMode::ClientIndividual => {
                let wire = frame.clone();
                sub.set_frame(frame);
                // park before the write: if the write fails, cleanup still
                // requeues the frame
                self.sub_list.push(sub);
                if self.writer.send(StompItem::Frame(wire)).await.is_err() {
                    return Flow::Disconnect;
                }
                Flow::Continue
            }
        }
    }

    async fn on_write_heart_beat(&mut self) -> Flow {
        match self.writer.send(StompItem::Heartbeat).await {
            Ok(()) => Flow::Continue,
            Err(_) => Flow::Disconnect,
        }
    }

    /// Stamp a MESSAGE frame with the next message-id and set up its ack
    /// header: removed for auto subscriptions, set to the message-id
    /// otherwise (STOMP 1.2 semantics).
    fn allocate_message_id(&mut self, frame: &mut Frame, ack: AckMode) {
        if frame.command != command::MESSAGE {
            return;
        }
        self.last_message_id += 1;
        let message_id = self.last_message_id.to_string();
        frame.headers.set(header::MESSAGE_ID, message_id.clone());
        match ack {
            AckMode::Auto => frame.headers.remove(header::ACK),
            AckMode::Client | AckMode::ClientIndividual => {
                frame.headers.set(header::ACK, message_id)
            }
        }
    }

    /// If the frame asks for a receipt, answer it right away and strip the
    /// header. The strip matters for transactions: the stored frame no
    /// longer carries a receipt header, so commit replay cannot
    /// acknowledge it a second time.
    async fn send_receipt_immediately(&mut self, frame: &mut Frame) -> Result<(), StompError> {
        let receipt = match frame.headers.first(header::RECEIPT).map(str::to_string) {
            Some(receipt) => receipt,
            None => return Ok(()),
        };
        frame.headers.remove(header::RECEIPT);
        let receipt_frame = Frame::new(command::RECEIPT).header(header::RECEIPT_ID, receipt);
        self.writer.send(StompItem::Frame(receipt_frame)).await?;
        Ok(())
    }

    /// Write an ERROR frame describing `err`. If the offending frame still
    /// carries a receipt header, echo it as receipt-id. Write failures are
    /// ignored; the connection is about to close regardless.
    async fn send_error_immediately(&mut self, err: &StompError, frame: &Frame) {
        let mut error_frame =
            Frame::new(command::ERROR).header(header::MESSAGE, err.to_string());
        if let Some(receipt) = frame.headers.first(header::RECEIPT) {
            error_frame = error_frame.header(header::RECEIPT_ID, receipt);
        }
        let _ = self.writer.send(StompItem::Frame(error_frame)).await;
    }

    /// Hand session-held resources back to the upper layer and close the
    /// socket. Runs on every terminal exit path.
    async fn cleanup(
        mut self,
        frame_rx: &mut mpsc::Receiver<Frame>,
        sub_rx: &mut mpsc::Receiver<Subscription>,
    ) {
        self.tx_store.init();
        drain_frames(frame_rx);

        // Unsubscribe everything before requeueing anything: a message
        // requeued first could be routed straight back to this session.
        for (_, sub) in self.subs.drain() {
            let _ = self.request_tx.send(Request::Unsubscribe(sub)).await;
        }

        // every parked subscription holds a frame awaiting redelivery
        while let Some(mut sub) = self.sub_list.get() {
            if let Some(pending) = sub.take_frame() {
                let _ = self.request_tx.send(Request::Requeue(pending)).await;
            }
        }

        drain_frames(frame_rx);
        self.requeue_deliveries(sub_rx).await;

        let _ = self
            .request_tx
            .send(Request::Disconnected(self.handle.clone()))
            .await;

        // once more, for deliveries racing the disconnect notification
        drain_frames(frame_rx);
        self.requeue_deliveries(sub_rx).await;

        debug!(conn = self.handle.id(), version = %self.version, "session closed");
        let _ = self.writer.close().await;
    }

    async fn requeue_deliveries(&mut self, sub_rx: &mut mpsc::Receiver<Subscription>) {
        while let Ok(mut sub) = sub_rx.try_recv() {
            if let Some(pending) = sub.take_frame() {
                let _ = self.request_tx.send(Request::Requeue(pending)).await;
            }
        }
    }
}

/// Discard everything buffered on the fire-and-forget channel. These are
/// topic MESSAGE or ERROR frames; they are not acknowledged and are simply
/// dropped.
fn drain_frames(frame_rx: &mut mpsc::Receiver<Frame>) {
    while frame_rx.try_recv().is_ok() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;

    fn test_session() -> (
        Session<tokio::io::WriteHalf<tokio::io::DuplexStream>>,
        tokio::io::DuplexStream,
        mpsc::Receiver<Request>,
    ) {
        let (client, server) = tokio::io::duplex(4096);
        let (_read_half, write_half) = tokio::io::split(server);
        let (request_tx, request_rx) = mpsc::channel(8);
        let (frame_tx, _frame_rx) = mpsc::channel(1);
        let (sub_tx, _sub_rx) = mpsc::channel(1);
        let session = Session {
            config: Arc::new(BrokerConfig::new()),
            writer: FramedWrite::new(write_half, StompCodec::new()),
            request_tx,
            handle: Conn {
                id: 0,
                frame_tx,
                sub_tx,
            },
            state: State::Connected,
            version: Version::V1_2,
            write_timeout: Duration::ZERO,
            last_message_id: 0,
            tx_store: TxStore::new(),
            subs: HashMap::new(),
            sub_list: SubscriptionList::new(),
        };
        (session, client, request_rx)
    }

    #[tokio::test]
    async fn message_ids_count_up_from_one() {
        let (mut session, _client, _request_rx) = test_session();

        let mut first = Frame::new(command::MESSAGE).header(header::ACK, "stale");
        session.allocate_message_id(&mut first, AckMode::Auto);
        assert_eq!(first.headers.first(header::MESSAGE_ID), Some("1"));
        assert!(first.headers.first(header::ACK).is_none());

        let mut second = Frame::new(command::MESSAGE);
        session.allocate_message_id(&mut second, AckMode::Client);
        assert_eq!(second.headers.first(header::MESSAGE_ID), Some("2"));
        assert_eq!(second.headers.first(header::ACK), Some("2"));
    }

    #[tokio::test]
    async fn non_message_frames_get_no_message_id() {
        let (mut session, _client, _request_rx) = test_session();
        let mut frame = Frame::new(command::RECEIPT).header(header::RECEIPT_ID, "r1");
        session.allocate_message_id(&mut frame, AckMode::Auto);
        assert!(frame.headers.first(header::MESSAGE_ID).is_none());
        assert_eq!(session.last_message_id, 0);
    }

    #[tokio::test]
    async fn receipt_is_stripped_after_answering() {
        let (mut session, _client, _request_rx) = test_session();
        let mut frame = Frame::new(command::SEND)
            .header(header::DESTINATION, "/queue/a")
            .header(header::RECEIPT, "r9");
        session.send_receipt_immediately(&mut frame).await.unwrap();
        assert!(!frame.headers.contains(header::RECEIPT));
        // a second call finds nothing to answer
        session.send_receipt_immediately(&mut frame).await.unwrap();
    }
}
