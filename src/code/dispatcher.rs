use crossbeam_channel as channel;
use std::{ops::ControlFlow, time::Duration};

use super::{Config, Decoder, Diagnostic, Error, Handler, HandlerId, Registry};
use crate::midi;

pub enum Request {
    AddHandler(HandlerId, Box<dyn Handler>),
    RemoveHandler(HandlerId),
    Shutdown,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::AddHandler(id, _) => f.debug_tuple("AddHandler").field(id).finish(),
            Request::RemoveHandler(id) => f.debug_tuple("RemoveHandler").field(id).finish(),
            Request::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Polls the packet source for presence.
///
/// MIDI backends keep a connection open after the device is unplugged,
/// so the packet channel alone can't tell the device went away.
pub struct Watch {
    pub interval: Duration,
    pub is_present: Box<dyn FnMut() -> bool + Send>,
}

pub struct Spawner {
    pub config: Config,
    pub packet_rx: channel::Receiver<midi::Packet>,
    pub req_rx: channel::Receiver<Request>,
    pub diag_tx: channel::Sender<Diagnostic>,
    pub watch: Option<Watch>,
}

impl Spawner {
    pub fn spawn(self) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let mut dispatcher = Dispatcher::new(&self.config, self.diag_tx);
            if let Some(watch) = self.watch {
                dispatcher = dispatcher.with_watch(watch);
            }
            dispatcher.run_loop(self.packet_rx, self.req_rx);
        })
    }
}

/// Decodes the incoming packets and hands the resulting events
/// to the registered handlers.
///
/// The handlers registry is only ever accessed from the dispatcher thread.
/// Registrations are received through a channel and applied between
/// two packets, so all the handlers see the same sequence of events
/// from the moment they are registered.
pub struct Dispatcher {
    decoder: Decoder,
    registry: Registry,
    diag_tx: channel::Sender<Diagnostic>,
    diag_overflow: bool,
    watch: Option<Watch>,
}

impl Dispatcher {
    pub fn new(config: &Config, diag_tx: channel::Sender<Diagnostic>) -> Self {
        Self {
            decoder: Decoder::from_config(config),
            registry: Registry::new(config.handler_budget),
            diag_tx,
            diag_overflow: false,
            watch: None,
        }
    }

    pub fn with_watch(mut self, watch: Watch) -> Self {
        self.watch = Some(watch);
        self
    }

    pub fn handle_request(&mut self, request: Request) -> ControlFlow<()> {
        use Request::*;

        match request {
            AddHandler(id, handler) => self.registry.add(id, handler),
            RemoveHandler(id) => {
                self.registry.remove(id);
            }
            Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    pub fn handle_packet(&mut self, mut packet: midi::Packet) {
        let res = self
            .decoder
            .decode(&mut packet)
            .and_then(|event| self.registry.dispatch(event));

        if let Err(err) = res {
            self.report(Diagnostic::new(err, &packet.msg));
        }
    }

    fn report(&mut self, diag: Diagnostic) {
        log::error!("{diag}");

        match self.diag_tx.try_send(diag) {
            Ok(()) => {
                if self.diag_overflow {
                    log::debug!("Diagnostics channel drained, resuming");
                    self.diag_overflow = false;
                }
            }
            Err(channel::TrySendError::Full(_)) => {
                // Warn once per overflow, the error line above is always logged.
                if !self.diag_overflow {
                    log::warn!("Diagnostics channel full, dropping diagnostics until drained");
                    self.diag_overflow = true;
                }
            }
            Err(channel::TrySendError::Disconnected(_)) => (),
        }
    }

    /// Applies the pending requests.
    fn drain_requests(&mut self, req_rx: &channel::Receiver<Request>) -> ControlFlow<()> {
        for request in req_rx.try_iter() {
            if self.handle_request(request).is_break() {
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    fn close(&mut self) {
        let err = Error::SourceClosed;
        log::info!("{err}");
        self.registry.notify_err(&err);
    }

    pub fn run_loop(
        mut self,
        packet_rx: channel::Receiver<midi::Packet>,
        req_rx: channel::Receiver<Request>,
    ) {
        let mut watch = self.watch.take();
        let ticker = match watch {
            Some(ref watch) => channel::tick(watch.interval),
            None => channel::never(),
        };

        loop {
            channel::select! {
                recv(packet_rx) -> packet => {
                    match packet {
                        Ok(packet) => {
                            // Handlers registered before this packet was
                            // received must get its event.
                            if self.drain_requests(&req_rx).is_break() {
                                break;
                            }
                            self.handle_packet(packet);
                        }
                        Err(_) => {
                            self.close();
                            break;
                        }
                    }
                }
                recv(req_rx) -> request => {
                    match request {
                        Ok(request) => {
                            if self.handle_request(request).is_break() {
                                break;
                            }
                        }
                        Err(err) => {
                            log::debug!("Request channel: {err}");
                            break;
                        }
                    }
                }
                recv(ticker) -> _ => {
                    let is_present = watch
                        .as_mut()
                        .map_or(true, |watch| (watch.is_present)());
                    if !is_present {
                        // Handlers already requested must be notified too.
                        if self.drain_requests(&req_rx).is_continue() {
                            self.close();
                        }
                        break;
                    }
                }
            }
        }

        log::debug!("Shutting down dispatcher loop");
    }
}
