// Model of the data produced by one pass of the monitoring loop

/// One distance measurement from the ultrasonic sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceReading {
    /// Echo pulse converted to centimeters
    Centimeters(f32),
    /// No echo edge before the deadline
    NoEcho,
}

impl DistanceReading {
    /// Value shown and transmitted when no echo was seen
    pub const SENTINEL_CM: f32 = -1.0;

    /// Collapse to the displayed/transmitted value: the measured distance,
    /// or the `-1.0` sentinel for a missed echo
    pub fn as_cm(self) -> f32 {
        match self {
            DistanceReading::Centimeters(cm) => cm,
            DistanceReading::NoEcho => Self::SENTINEL_CM,
        }
    }
}

/// Everything one iteration produces; dropped at the end of the pass
pub struct Reading {
    pub distance: DistanceReading,
    pub motion: bool,
}
