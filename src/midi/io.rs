use std::sync::Arc;

/// A MIDI input which is either connected to a port
/// or holding the client and callback data until it gets connected.
pub enum MidiIn<D: 'static> {
    Connected(midir::MidiInputConnection<D>),
    Disconnected((midir::MidiInput, D)),
    None,
}

impl<D: 'static> Default for MidiIn<D> {
    fn default() -> Self {
        Self::None
    }
}

impl<D: Send + Clone + 'static> MidiIn<D> {
    pub fn try_new(client_name: &str, data: D) -> Result<Self, super::Error> {
        Ok(Self::Disconnected((midir::MidiInput::new(client_name)?, data)))
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub fn connect<C>(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiInputPort,
        client_port_name: &str,
        callback: C,
    ) -> Result<(), super::Error>
    where
        C: FnMut(u64, &[u8], &mut D) + Send + 'static,
    {
        self.disconnect();
        match std::mem::take(self) {
            Self::Disconnected((midi_input, data)) => {
                match midi_input.connect(port, client_port_name, callback, data.clone()) {
                    Ok(conn) => *self = Self::Connected(conn),
                    Err(err) => {
                        // err.into_inner() doesn't give the data back,
                        // hence the Clone bound on D.
                        *self = Self::Disconnected((err.into_inner(), data));
                        let err = super::Error::Connection(port_name);
                        log::error!("{err}");
                        return Err(err);
                    }
                }
            }
            other => {
                *self = other;
                return Err(super::Error::PortConnection);
            }
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Self::Connected(conn) = std::mem::take(self) {
                *self = Self::Disconnected(conn.close());
            }
        }
    }
}
