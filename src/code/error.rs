use std::fmt;

use crate::{bytes, midi};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Listing devices")]
    Discovery(#[source] midi::Error),

    #[error("Finding device")]
    DeviceNotFound(#[source] midi::Error),

    #[error("Opening device")]
    Open(#[source] midi::Error),

    #[error(transparent)]
    Transport(#[from] midi::Error),

    #[error("unrecognized status byte: {:x}", .0)]
    UnrecognizedStatus(u8),

    #[error("empty packet")]
    EmptyPacket,

    #[error("truncated packet for status byte {:x}", .0)]
    TruncatedPacket(u8),

    #[error("{}", .0)]
    Handlers(HandlerErrors),

    #[error("Packet source closed")]
    SourceClosed,

    #[error("Dispatcher is not running")]
    DispatcherGone,
}

/// Failures of the handlers for one event, in registration order.
#[derive(Debug, Default)]
pub struct HandlerErrors(Vec<anyhow::Error>);

impl HandlerErrors {
    pub fn push(&mut self, err: anyhow::Error) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Handlers(self))
        }
    }
}

impl fmt::Display for HandlerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        if let Some(first) = iter.next() {
            write!(f, "{first:#}")?;
        }

        for err in iter {
            write!(f, ", and {err:#}")?;
        }

        Ok(())
    }
}

/// A per-packet fault: the packet is dropped, dispatching goes on.
#[derive(Debug)]
pub struct Diagnostic {
    pub error: Error,
    pub packet: bytes::Displayable<'static>,
}

impl Diagnostic {
    pub fn new(error: Error, msg: &midi::Msg) -> Self {
        Self {
            error,
            packet: msg.display().to_owned(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (packet {})", self.error, self.packet)
    }
}
