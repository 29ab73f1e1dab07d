//! Simulated peripherals
//!
//! In-memory implementations of the hardware traits, driven by a shared
//! virtual clock. The host unit tests and the on-target self-test binary run
//! the drivers against these instead of real pins.

use core::cell::Cell;

use heapless::{Deque, String, Vec};

use crate::traits::{Clock, Display, InputPin, OutputPin, SerialPort};

/// Cost charged to every clock read, so polling loops make progress
const POLL_COST_MS: u64 = 1;

/// Virtual millisecond clock shared by all simulated peripherals
pub struct SimClock {
    now: Cell<u64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    /// Current virtual time, without charging a poll cost
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    fn tick(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

// Implemented on the reference so pins and the driver can share one clock
impl Clock for &SimClock {
    fn now_ms(&self) -> u64 {
        self.tick(POLL_COST_MS);
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.tick(ms as u64);
    }
}

/// Echo line that rises and falls at scheduled virtual times
pub struct SimEchoPin<'a> {
    clock: &'a SimClock,
    rise_at: Option<u64>,
    fall_at: Option<u64>,
}

impl<'a> SimEchoPin<'a> {
    /// Echo that never arrives
    pub fn silent(clock: &'a SimClock) -> Self {
        Self {
            clock,
            rise_at: None,
            fall_at: None,
        }
    }

    /// Echo that rises at `rise_at` and never falls
    pub fn stuck_high(clock: &'a SimClock, rise_at: u64) -> Self {
        Self {
            clock,
            rise_at: Some(rise_at),
            fall_at: None,
        }
    }

    /// Echo pulse of `width_ms` starting at `rise_at`
    pub fn pulse(clock: &'a SimClock, rise_at: u64, width_ms: u64) -> Self {
        Self {
            clock,
            rise_at: Some(rise_at),
            fall_at: Some(rise_at + width_ms),
        }
    }
}

impl InputPin for SimEchoPin<'_> {
    fn is_high(&self) -> bool {
        let now = self.clock.now();
        match (self.rise_at, self.fall_at) {
            (Some(rise), Some(fall)) => now >= rise && now < fall,
            (Some(rise), None) => now >= rise,
            _ => false,
        }
    }
}

/// Input pin held at a fixed level (motion detector)
pub struct SimLevelPin(pub bool);

impl InputPin for SimLevelPin {
    fn is_high(&self) -> bool {
        self.0
    }
}

/// Output pin that records every level transition with its timestamp
pub struct SimOutputPin<'a> {
    clock: &'a SimClock,
    state: bool,
    pub transitions: Vec<(u64, bool), 32>,
}

impl<'a> SimOutputPin<'a> {
    pub fn new(clock: &'a SimClock) -> Self {
        Self {
            clock,
            state: false,
            transitions: Vec::new(),
        }
    }

    pub fn is_high(&self) -> bool {
        self.state
    }
}

impl OutputPin for SimOutputPin<'_> {
    fn set_high(&mut self) {
        self.state = true;
        let _ = self.transitions.push((self.clock.now(), true));
    }

    fn set_low(&mut self) {
        self.state = false;
        let _ = self.transitions.push((self.clock.now(), false));
    }
}

/// Serial port that captures writes and replays scripted modem responses
pub struct SimSerial {
    pub tx: Vec<u8, 1024>,
    rx: Deque<u8, 256>,
}

impl SimSerial {
    pub fn new() -> Self {
        Self {
            tx: Vec::new(),
            rx: Deque::new(),
        }
    }

    /// Queue bytes for the driver's next reads
    pub fn push_response(&mut self, bytes: &[u8]) {
        for byte in bytes {
            let _ = self.rx.push_back(*byte);
        }
    }

    /// Everything written so far, as text
    pub fn transcript(&self) -> &str {
        core::str::from_utf8(&self.tx).unwrap_or("")
    }
}

impl Default for SimSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for SimSerial {
    fn write(&mut self, bytes: &[u8]) -> Result<(), &'static str> {
        self.tx
            .extend_from_slice(bytes)
            .map_err(|_| "sim tx buffer full")
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

/// Display that records the text drawn to it
pub struct SimDisplay {
    pub lines: Vec<String<32>, 8>,
    pub clear_count: u32,
    pub update_count: u32,
}

impl SimDisplay {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            clear_count: 0,
            update_count: 0,
        }
    }
}

impl Default for SimDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SimDisplay {
    fn init(&mut self) -> Result<(), &'static str> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), &'static str> {
        self.lines.clear();
        self.clear_count += 1;
        Ok(())
    }

    fn draw_text(&mut self, text: &str, _x: i32, _y: i32) -> Result<(), &'static str> {
        let mut line = String::new();
        let _ = line.push_str(text);
        self.lines.push(line).map_err(|_| "sim display full")
    }

    fn update(&mut self) -> Result<(), &'static str> {
        self.update_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Clock;

    #[test]
    fn clock_charges_poll_cost_on_reads() {
        let sim = SimClock::new();
        let mut clock = &sim;
        assert_eq!(clock.now_ms(), 1);
        assert_eq!(clock.now_ms(), 2);
        clock.delay_ms(10);
        assert_eq!(sim.now(), 12);
    }

    #[test]
    fn echo_pulse_follows_schedule() {
        let sim = SimClock::new();
        let echo = SimEchoPin::pulse(&sim, 5, 10);
        assert!(!echo.is_high());
        sim.tick(5);
        assert!(echo.is_high());
        sim.tick(10);
        assert!(!echo.is_high());
    }
}
