use super::Error;
use crate::bytes;

/// A raw MIDI message as received from the device.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn display(&self) -> bytes::Displayable {
        bytes::Displayable::from(self.0.as_ref())
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl From<&[u8]> for Msg {
    fn from(buf: &[u8]) -> Self {
        Self(buf.into())
    }
}

impl std::ops::Deref for Msg {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// One read from the packet source: the bytes received
/// and the transport fault, if any, which occurred while reading them.
#[derive(Debug, Default)]
pub struct Packet {
    pub msg: Msg,
    pub err: Option<Error>,
}

impl Packet {
    pub fn failed(err: Error) -> Self {
        Self {
            msg: Msg::default(),
            err: Some(err),
        }
    }
}

impl From<Msg> for Packet {
    fn from(msg: Msg) -> Self {
        Self { msg, err: None }
    }
}

impl<const S: usize> From<[u8; S]> for Packet {
    fn from(buf: [u8; S]) -> Self {
        Msg::from(buf).into()
    }
}

impl From<&[u8]> for Packet {
    fn from(buf: &[u8]) -> Self {
        Msg::from(buf).into()
    }
}
