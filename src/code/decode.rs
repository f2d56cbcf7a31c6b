use super::{config, Button, Config, Encoder, Error, Event};
use crate::midi;

/// Maps the packets sent by the Code to [`Event`]s.
#[derive(Clone, Copy, Debug)]
pub struct Decoder {
    cc: u8,
    note: u8,
    button_offset: i32,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(midi::Channel::default(), config::BUTTON_OFFSET)
    }
}

impl Decoder {
    pub fn new(channel: midi::Channel, button_offset: u8) -> Self {
        Self {
            cc: midi::CC | channel,
            note: midi::NOTE | channel,
            button_offset: i32::from(button_offset),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.channel, config.button_offset)
    }

    /// Decodes `packet`, passing its transport error through if any.
    ///
    /// The transport error is taken out of `packet`, the bytes are left
    /// untouched so they can be reported.
    pub fn decode(&self, packet: &mut midi::Packet) -> Result<Event, Error> {
        if let Some(err) = packet.err.take() {
            return Err(err.into());
        }

        self.decode_msg(&packet.msg)
    }

    pub fn decode_msg(&self, buf: &[u8]) -> Result<Event, Error> {
        let status = *buf.first().ok_or(Error::EmptyPacket)?;

        if status != self.cc && status != self.note {
            return Err(Error::UnrecognizedStatus(status));
        }

        let (data1, data2) = match buf.get(1..=2) {
            Some(&[data1, data2]) => (data1, data2),
            _ => return Err(Error::TruncatedPacket(status)),
        };

        let event = if status == self.cc {
            Encoder {
                index: i32::from(data1),
                value: data2,
            }
            .into()
        } else {
            Button {
                index: i32::from(data1) - self.button_offset,
                value: data2,
            }
            .into()
        };

        Ok(event)
    }
}
