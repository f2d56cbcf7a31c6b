mod error;
pub use error::Error;

mod io;
pub use io::MidiIn;

pub mod msg;
pub use msg::{Msg, Packet};

pub mod port;
pub use port::PortsIn;

/// Control Change status family.
pub const CC: Tag = Tag::from(0xb0);
/// Note On status family.
pub const NOTE: Tag = Tag::from(0x90);

/// The status family, i.e. the upper nibble of a status byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0xf0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel(u8);

impl Channel {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0x0f)
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

impl std::ops::BitOr<Channel> for Tag {
    type Output = u8;

    fn bitor(self, chan: Channel) -> Self::Output {
        self.0 | chan.0
    }
}
