//! Talking to the Livid Code v2 MIDI controller.
//!
//! [`Code`] opens the device and spawns a dispatcher thread which decodes
//! the incoming packets into [`Event`]s and hands them to the [`Handler`]s
//! registered with [`Code::add_handler`].
//!
//! Per-packet faults never stop the dispatcher: they are logged and
//! published on the [`Code::diagnostics`] channel.

use crossbeam_channel as channel;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

pub mod config;
pub use config::Config;

mod decode;
pub use decode::Decoder;

pub mod dispatcher;
use dispatcher::{Request, Watch};

pub mod error;
pub use error::{Diagnostic, Error, HandlerErrors};

pub mod event;
pub use event::{Button, Encoder, Event};

mod handler;
pub use handler::{Handler, HandlerId, Registry};

use crate::midi;

/// A connection to a Livid Code v2.
pub struct Code {
    ports: Option<midi::PortsIn<channel::Sender<midi::Packet>>>,
    req_tx: channel::Sender<Request>,
    diag_rx: channel::Receiver<Diagnostic>,
    next_id: AtomicU64,
    dispatcher_thread: Option<std::thread::JoinHandle<()>>,
}

impl Code {
    /// Opens the device named after `config.device_name`.
    pub fn try_new(config: Config) -> Result<Self, Error> {
        let (packet_tx, packet_rx) = channel::unbounded();

        let mut ports = midi::PortsIn::try_new(config.client_name.clone(), packet_tx)
            .map_err(Error::Discovery)?;
        ports.refresh().map_err(Error::Discovery)?;

        let port_name = ports
            .find(&config.device_name)
            .map_err(Error::DeviceNotFound)?;

        ports
            .connect(port_name.clone(), |_ts, msg, packet_tx| {
                let _ = packet_tx.send(midi::Packet::from(msg));
            })
            .map_err(Error::Open)?;

        // The MIDI connection outlives the device, so the port is watched
        // in order to tell the handlers when the device goes away.
        let watch = Watch {
            interval: config.watch_interval,
            is_present: Box::new({
                let client_name = config.client_name.clone();
                move || match midi::port::is_present(&client_name, &port_name) {
                    Ok(is_present) => is_present,
                    Err(err) => {
                        log::debug!("Couldn't check for port {port_name}: {err}");
                        true
                    }
                }
            }),
        };

        let mut this = Self::spawn(config, packet_rx, Some(watch));
        this.ports = Some(ports);

        Ok(this)
    }

    /// Dispatches the packets received from `packet_rx`
    /// instead of those from a MIDI port.
    ///
    /// The dispatcher stops when all the senders are dropped.
    pub fn with_source(config: Config, packet_rx: channel::Receiver<midi::Packet>) -> Self {
        Self::spawn(config, packet_rx, None)
    }

    fn spawn(
        config: Config,
        packet_rx: channel::Receiver<midi::Packet>,
        watch: Option<Watch>,
    ) -> Self {
        let (req_tx, req_rx) = channel::unbounded();
        let (diag_tx, diag_rx) = channel::bounded(config.diagnostics_capacity.max(1));

        let dispatcher_thread = dispatcher::Spawner {
            config,
            packet_rx,
            req_rx,
            diag_tx,
            watch,
        }
        .spawn();

        Self {
            ports: None,
            req_tx,
            diag_rx,
            next_id: AtomicU64::new(0),
            dispatcher_thread: Some(dispatcher_thread),
        }
    }

    /// Lists the MIDI In ports which could be opened.
    pub fn list_devices(config: &Config) -> Result<Vec<Arc<str>>, Error> {
        let mut ports =
            midi::PortsIn::try_new(config.client_name.clone(), ()).map_err(Error::Discovery)?;
        ports.refresh().map_err(Error::Discovery)?;

        Ok(ports.list().collect())
    }

    /// The name of the MIDI port in use, if any.
    pub fn port_name(&self) -> Option<Arc<str>> {
        self.ports.as_ref().and_then(midi::PortsIn::cur)
    }

    /// Adds a handler which will receive all the events coming
    /// from the device from now on.
    ///
    /// Doesn't wait for the dispatcher to register the handler.
    pub fn add_handler(&self, handler: impl Handler) -> Result<HandlerId, Error> {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.req_tx
            .send(Request::AddHandler(id, Box::new(handler)))
            .map_err(|_| Error::DispatcherGone)?;

        Ok(id)
    }

    pub fn remove_handler(&self, id: HandlerId) -> Result<(), Error> {
        self.req_tx
            .send(Request::RemoveHandler(id))
            .map_err(|_| Error::DispatcherGone)
    }

    /// Sets the value of a button on the Code.
    ///
    /// Not wired to the device yet.
    pub fn set_button(&self, _btn: Button) -> Result<(), Error> {
        Ok(())
    }

    /// Sets the value of an encoder on the Code.
    ///
    /// Not wired to the device yet.
    pub fn set_encoder(&self, _enc: Encoder) -> Result<(), Error> {
        Ok(())
    }

    /// The per-packet faults, most recent last.
    ///
    /// Diagnostics are dropped while this channel is full,
    /// they are logged anyway.
    pub fn diagnostics(&self) -> &channel::Receiver<Diagnostic> {
        &self.diag_rx
    }

    /// Blocks until the dispatcher stops, i.e. when the device
    /// disappears or the packet source closes.
    pub fn join(mut self) {
        if let Some(dispatcher_thread) = self.dispatcher_thread.take() {
            if dispatcher_thread.join().is_err() {
                log::error!("Dispatcher thread panicked");
            }
        }
    }

    /// Stops the dispatcher and closes the device.
    ///
    /// The handlers are dropped without being notified.
    pub fn shutdown(&mut self) {
        if let Some(dispatcher_thread) = self.dispatcher_thread.take() {
            if let Err(err) = self.req_tx.send(Request::Shutdown) {
                log::debug!("Couldn't request dispatcher shutdown: {err}");
            }
            if dispatcher_thread.join().is_err() {
                log::error!("Dispatcher thread panicked");
            }
        }

        if let Some(mut ports) = self.ports.take() {
            ports.disconnect();
        }
    }
}

impl Drop for Code {
    fn drop(&mut self) {
        self.shutdown();
    }
}
