use std::time::{Duration, Instant};

use super::{Button, Encoder, Error, Event, HandlerErrors};

/// Receives the events coming from the Code.
///
/// Handlers are called one after the other from the dispatcher thread,
/// so a handler which blocks delays the ones registered after it.
pub trait Handler: Send + 'static {
    fn button(&mut self, btn: Button) -> anyhow::Result<()>;
    fn encoder(&mut self, enc: Encoder) -> anyhow::Result<()>;

    /// Called once the dispatcher stops delivering events for good.
    fn err(&mut self, err: &Error);
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HandlerId(pub(super) u64);

/// The handlers in registration order.
///
/// Owned by the dispatcher thread, no locking involved.
#[derive(Default)]
pub struct Registry {
    handlers: Vec<(HandlerId, Box<dyn Handler>)>,
    budget: Option<Duration>,
}

impl Registry {
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            handlers: Vec::new(),
            budget,
        }
    }

    pub fn add(&mut self, id: HandlerId, handler: Box<dyn Handler>) {
        self.handlers.push((id, handler));
        log::debug!("Added handler {}, {} registered", id.0, self.len());
    }

    pub fn remove(&mut self, id: HandlerId) -> bool {
        let len = self.handlers.len();
        self.handlers.retain(|(cur, _)| *cur != id);

        let removed = self.handlers.len() != len;
        if removed {
            log::debug!("Removed handler {}, {} left", id.0, self.len());
        } else {
            log::warn!("Attempt to remove unknown handler {}", id.0);
        }

        removed
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Hands `event` to every handler, collecting their failures.
    pub fn dispatch(&mut self, event: Event) -> Result<(), Error> {
        let mut errs = HandlerErrors::default();

        for (id, handler) in self.handlers.iter_mut() {
            let start = Instant::now();

            let res = match event {
                Event::Button(btn) => handler.button(btn),
                Event::Encoder(enc) => handler.encoder(enc),
            };

            if let Some(budget) = self.budget {
                let elapsed = start.elapsed();
                if elapsed > budget {
                    log::warn!(
                        "Handler {} took {elapsed:?} for {event:?} (budget {budget:?})",
                        id.0
                    );
                }
            }

            if let Err(err) = res {
                errs.push(err);
            }
        }

        errs.into_result()
    }

    pub fn notify_err(&mut self, err: &Error) {
        log::debug!("Notifying {} handlers: {err}", self.len());
        for (_, handler) in self.handlers.iter_mut() {
            handler.err(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        fail: bool,
        delay: Duration,
    }

    impl Recorder {
        fn boxed(name: &'static str, log: &Log, fail: bool) -> Box<dyn Handler> {
            Box::new(Self {
                name,
                log: log.clone(),
                fail,
                delay: Duration::ZERO,
            })
        }

        fn slow(name: &'static str, log: &Log, delay: Duration) -> Box<dyn Handler> {
            Box::new(Self {
                name,
                log: log.clone(),
                fail: false,
                delay,
            })
        }

        fn record(&self, what: String) -> anyhow::Result<()> {
            std::thread::sleep(self.delay);
            self.log.lock().unwrap().push(format!("{} {what}", self.name));
            if self.fail {
                anyhow::bail!("{} failed", self.name);
            }
            Ok(())
        }
    }

    impl Handler for Recorder {
        fn button(&mut self, btn: Button) -> anyhow::Result<()> {
            self.record(format!("btn {}", btn.index))
        }

        fn encoder(&mut self, enc: Encoder) -> anyhow::Result<()> {
            self.record(format!("enc {}", enc.index))
        }

        fn err(&mut self, err: &Error) {
            self.log.lock().unwrap().push(format!("{} err {err}", self.name));
        }
    }

    #[test]
    fn registration_order() {
        let log = Log::default();
        let mut registry = Registry::default();
        registry.add(HandlerId(0), Recorder::boxed("a", &log, false));
        registry.add(HandlerId(1), Recorder::boxed("b", &log, false));
        registry.add(HandlerId(2), Recorder::boxed("c", &log, false));

        registry
            .dispatch(Encoder { index: 3, value: 64 }.into())
            .unwrap();

        assert_eq!(*log.lock().unwrap(), ["a enc 3", "b enc 3", "c enc 3"]);
    }

    #[test]
    fn failures_do_not_stop_delivery() {
        let log = Log::default();
        let mut registry = Registry::default();
        registry.add(HandlerId(0), Recorder::boxed("a", &log, true));
        registry.add(HandlerId(1), Recorder::boxed("b", &log, false));
        registry.add(HandlerId(2), Recorder::boxed("c", &log, true));

        let err = registry
            .dispatch(Button { index: 5, value: 100 }.into())
            .unwrap_err();

        assert_eq!(err.to_string(), "a failed, and c failed");
        assert_eq!(*log.lock().unwrap(), ["a btn 5", "b btn 5", "c btn 5"]);
    }

    #[test]
    fn over_budget_handler_is_not_interrupted() {
        let log = Log::default();
        let mut registry = Registry::new(Some(Duration::from_millis(1)));
        registry.add(HandlerId(0), Recorder::boxed("a", &log, true));
        registry.add(HandlerId(1), Recorder::slow("b", &log, Duration::from_millis(5)));
        registry.add(HandlerId(2), Recorder::boxed("c", &log, true));

        let err = registry
            .dispatch(Encoder { index: 7, value: 65 }.into())
            .unwrap_err();

        // Same outcome as without a budget: the slow handler ran to completion
        // and the ones registered after it still got the event.
        assert_eq!(err.to_string(), "a failed, and c failed");
        assert_eq!(*log.lock().unwrap(), ["a enc 7", "b enc 7", "c enc 7"]);
    }

    #[test]
    fn no_handlers() {
        let mut registry = Registry::default();
        assert_eq!(registry.len(), 0);
        assert!(registry
            .dispatch(Button { index: 1, value: 0 }.into())
            .is_ok());
    }

    #[test]
    fn remove() {
        let log = Log::default();
        let mut registry = Registry::default();
        registry.add(HandlerId(0), Recorder::boxed("a", &log, false));
        registry.add(HandlerId(1), Recorder::boxed("b", &log, false));

        assert!(registry.remove(HandlerId(0)));
        assert!(!registry.remove(HandlerId(0)));
        assert_eq!(registry.len(), 1);

        registry
            .dispatch(Button { index: 2, value: 1 }.into())
            .unwrap();
        assert_eq!(*log.lock().unwrap(), ["b btn 2"]);
    }

    #[test]
    fn notify_err() {
        let log = Log::default();
        let mut registry = Registry::new(Some(Duration::from_secs(1)));
        registry.add(HandlerId(0), Recorder::boxed("a", &log, false));
        registry.add(HandlerId(1), Recorder::boxed("b", &log, false));

        registry.notify_err(&Error::SourceClosed);

        assert_eq!(
            *log.lock().unwrap(),
            ["a err Packet source closed", "b err Packet source closed"]
        );
    }
}
