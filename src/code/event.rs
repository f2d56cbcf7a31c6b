/// One of the buttons on the Code.
///
/// Buttons are numbered 1 to 13, 1 being the upper left button,
/// 5 being the bottom left button and 13 being the bottom right button.
///
/// `index` is signed: notes below the device's button offset
/// yield a negative index which is passed on as is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Button {
    pub index: i32,
    pub value: u8,
}

/// The value of one of the encoders on the Code.
///
/// Encoders are numbered 1 to 32, 1 being the upper left encoder,
/// 4 being the bottom left encoder and so on horizontally across
/// the controller, the bottom right encoder being 32.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Encoder {
    pub index: i32,
    pub value: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    Button(Button),
    Encoder(Encoder),
}

impl From<Button> for Event {
    fn from(btn: Button) -> Self {
        Self::Button(btn)
    }
}

impl From<Encoder> for Event {
    fn from(enc: Encoder) -> Self {
        Self::Encoder(enc)
    }
}
