use std::collections::VecDeque;

use crate::frame::header;
use crate::frame::Frame;

/// Subscription acknowledgement modes as defined by STOMP 1.2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AckMode {
    #[default]
    Auto,
    Client,
    ClientIndividual,
}

impl AckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckMode::Auto => "auto",
            AckMode::Client => "client",
            AckMode::ClientIndividual => "client-individual",
        }
    }

    /// Interpret a SUBSCRIBE `ack` header value. Absent or unrecognized
    /// values mean `auto` (STOMP 1.2 default).
    pub fn from_header(value: Option<&str>) -> AckMode {
        match value {
            Some("client") => AckMode::Client,
            Some("client-individual") => AckMode::ClientIndividual,
            _ => AckMode::Auto,
        }
    }
}

/// A client subscription as tracked by the session.
///
/// The upper layer creates one per SUBSCRIBE it registers and attaches a
/// MESSAGE frame whenever it wants the session to deliver on it. While an
/// unacknowledged MESSAGE is outstanding, the subscription (still holding
/// that frame) sits in the session's pending-ack list; the frame slot is
/// empty otherwise.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: String,
    destination: String,
    ack: AckMode,
    frame: Option<Frame>,
}

impl Subscription {
    pub fn new(id: impl Into<String>, destination: impl Into<String>, ack: AckMode) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
            ack,
            frame: None,
        }
    }

    /// Attach the MESSAGE frame to deliver (builder style).
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn ack(&self) -> AckMode {
        self.ack
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn take_frame(&mut self) -> Option<Frame> {
        self.frame.take()
    }

    pub(crate) fn set_frame(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }

    /// Copy of this subscription without the held frame, for bookkeeping
    /// maps that must not alias the pending-ack list's frame.
    pub(crate) fn detached(&self) -> Subscription {
        Subscription {
            id: self.id.clone(),
            destination: self.destination.clone(),
            ack: self.ack,
            frame: None,
        }
    }
}

/// Ordered list of subscriptions awaiting client acknowledgement.
///
/// Each entry holds the unacknowledged MESSAGE in its frame slot. A
/// subscription can only be in one list at a time: it is moved in on push
/// and moved back out on removal.
#[derive(Debug, Default)]
pub struct SubscriptionList {
    subs: VecDeque<Subscription>,
}

impl SubscriptionList {
    pub fn new() -> Self {
        SubscriptionList {
            subs: VecDeque::new(),
        }
    }

    /// Add a subscription to the back of the list.
    pub fn push(&mut self, sub: Subscription) {
        self.subs.push_back(sub);
    }

    /// Remove and return the first subscription, oldest delivery first.
    pub fn get(&mut self) -> Option<Subscription> {
        self.subs.pop_front()
    }

    /// Remove the subscription with the given subscription id.
    pub fn find_by_id_and_remove(&mut self, id: &str) -> Option<Subscription> {
        let pos = self.subs.iter().position(|sub| sub.id == id)?;
        self.subs.remove(pos)
    }

    /// Remove the subscription whose held MESSAGE carries the given
    /// message-id. This is how ACK/NACK frames are matched back to the
    /// outstanding delivery.
    pub fn remove_by_message_id(&mut self, message_id: &str) -> Option<Subscription> {
        let pos = self.subs.iter().position(|sub| {
            sub.frame
                .as_ref()
                .and_then(|f| f.headers.first(header::MESSAGE_ID))
                == Some(message_id)
        })?;
        self.subs.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}
