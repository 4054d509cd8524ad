/// One polled reading of the input device.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Stick deflection; zero means the device is idle.
    pub distance: f64,
    /// Heading in radians, meaningful when `distance` is nonzero.
    pub angle: f64,
    /// The player is touching/holding the device.
    pub held: bool,
    /// The pulse button is down. Each rising edge counts as one pulse.
    pub pulse_active: bool,
}

impl InputSnapshot {
    pub fn released() -> Self {
        Self::default()
    }

    pub fn holding_still() -> Self {
        InputSnapshot {
            held: true,
            ..Self::default()
        }
    }

    pub fn pushing(angle: f64) -> Self {
        InputSnapshot {
            distance: 1.0,
            angle,
            held: true,
            pulse_active: false,
        }
    }
}

/// Sampled once per tick.
pub trait InputDevice {
    fn sample(&mut self) -> InputSnapshot;
}

/// A device stuck in one position.
impl InputDevice for InputSnapshot {
    fn sample(&mut self) -> InputSnapshot {
        *self
    }
}
