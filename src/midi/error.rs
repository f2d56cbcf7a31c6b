use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI initialization failed")]
    Init(#[from] midir::InitError),

    #[error("Error connecting to MIDI port {}", .0)]
    Connection(Arc<str>),

    #[error("MIDI port connection failed")]
    PortConnection,

    #[error("Couldn't retrieve a MIDI port name")]
    PortInfoError(#[from] midir::PortInfoError),

    #[error("MIDI port not found: {}", .0)]
    PortNotFound(Arc<str>),

    #[error("{} MIDI ports match {}", .count, .name)]
    AmbiguousPort { name: Arc<str>, count: usize },

    #[error("Error reading from MIDI port: {}", .0)]
    Read(Arc<str>),
}
