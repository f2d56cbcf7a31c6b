use std::{sync::Arc, time::Duration};

use crate::midi;

/// Name of the Code's MIDI port.
pub const CONTROLS: &str = "Controls";
/// The Code sends button presses as notes starting from this note number.
pub const BUTTON_OFFSET: u8 = 32;

pub const DEFAULT_CLIENT_NAME: &str = "livid-code";
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 64;
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
pub struct Config {
    /// The MIDI In port to open.
    pub device_name: Arc<str>,
    /// The name under which we register as a MIDI client.
    pub client_name: Arc<str>,
    /// The channel the device sends on.
    pub channel: midi::Channel,
    pub button_offset: u8,
    /// Handler calls lasting longer than this are reported.
    /// They are never interrupted.
    pub handler_budget: Option<Duration>,
    pub diagnostics_capacity: usize,
    /// How often the device port is checked for presence.
    pub watch_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: CONTROLS.into(),
            client_name: DEFAULT_CLIENT_NAME.into(),
            channel: midi::Channel::default(),
            button_offset: BUTTON_OFFSET,
            handler_budget: None,
            diagnostics_capacity: DEFAULT_DIAGNOSTICS_CAPACITY,
            watch_interval: DEFAULT_WATCH_INTERVAL,
        }
    }
}

impl Config {
    pub fn with_device_name(mut self, device_name: impl Into<Arc<str>>) -> Self {
        self.device_name = device_name.into();
        self
    }

    pub fn with_client_name(mut self, client_name: impl Into<Arc<str>>) -> Self {
        self.client_name = client_name.into();
        self
    }

    pub fn with_channel(mut self, channel: midi::Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_button_offset(mut self, button_offset: u8) -> Self {
        self.button_offset = button_offset;
        self
    }

    pub fn with_handler_budget(mut self, budget: Duration) -> Self {
        self.handler_budget = Some(budget);
        self
    }

    /// The diagnostics channel always holds at least one entry.
    pub fn with_diagnostics_capacity(mut self, capacity: usize) -> Self {
        self.diagnostics_capacity = capacity.max(1);
        self
    }

    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }
}
