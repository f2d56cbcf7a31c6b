pub mod bytes;

pub mod code;
pub use code::{Button, Code, Config, Encoder, Event, Handler};

pub mod midi;
