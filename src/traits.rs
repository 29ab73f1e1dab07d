//! Hardware abstraction traits
//!
//! Every driver takes its pins, clock, and serial link as explicit values
//! implementing these traits, so the same code runs against the real
//! peripherals in [`crate::hardware`] or the simulated ones in [`crate::sim`].

/// Trait for a digital output line (trigger, LED, buzzer)
pub trait OutputPin {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// Trait for a digital input line (echo, motion detector)
pub trait InputPin {
    fn is_high(&self) -> bool;
}

/// Trait for the timing source used by the drivers
pub trait Clock {
    /// Milliseconds since an arbitrary epoch; must be monotonic
    fn now_ms(&self) -> u64;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Trait for a byte-oriented serial link (the modem UART)
pub trait SerialPort {
    /// Write all bytes
    fn write(&mut self, bytes: &[u8]) -> Result<(), &'static str>;

    /// Read one byte if one is available, without blocking
    fn read_byte(&mut self) -> Option<u8>;
}

/// Trait for display devices
pub trait Display {
    /// Initialize the display
    fn init(&mut self) -> Result<(), &'static str>;

    /// Clear the display
    fn clear(&mut self) -> Result<(), &'static str>;

    /// Draw text at specified position
    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), &'static str>;

    /// Update/flush the display (show the buffer)
    fn update(&mut self) -> Result<(), &'static str>;
}
