//! HC-SR04 ultrasonic distance driver
//!
//! Raises the trigger line for a fixed pulse, then times the echo pulse and
//! converts its width to centimeters. Either echo edge missing its deadline
//! yields [`DistanceReading::NoEcho`].

use crate::model::DistanceReading;
use crate::traits::{Clock, InputPin, OutputPin};

/// Trigger line hold time
const TRIGGER_PULSE_MS: u32 = 10;

/// Deadline for each echo edge, counted from when polling starts
pub const ECHO_TIMEOUT_MS: u64 = 100;

/// Speed of sound scaled to centimeters per clock tick, before the
/// round-trip halving.
///
/// 343 m/s at 20 C is 0.0343 cm/us; the classic HC-SR04 factor 0.034
/// assumes microsecond echo timing. This driver times echoes with the
/// platform [`Clock`], whose tick may be coarser than a microsecond, so
/// calibrate against a known distance on real hardware before trusting
/// absolute readings.
pub const SOUND_SPEED_CM_PER_TICK: f32 = 0.034;

/// Outcome of waiting for one signal edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWait {
    /// The line reached the wanted level; tick at which it was first seen
    Reached(u64),
    /// Deadline passed first
    TimedOut,
}

/// Poll `pin` until it reads `want_high`, or until `deadline_ms` have
/// elapsed on `clock` since the call
pub fn wait_for_level<P: InputPin, C: Clock>(
    pin: &P,
    clock: &C,
    want_high: bool,
    deadline_ms: u64,
) -> EdgeWait {
    let start = clock.now_ms();
    loop {
        if pin.is_high() == want_high {
            return EdgeWait::Reached(clock.now_ms());
        }
        if clock.now_ms() - start > deadline_ms {
            return EdgeWait::TimedOut;
        }
    }
}

/// Ultrasonic rangefinder behind a trigger output and an echo input
pub struct UltrasonicSensor<T, E> {
    trigger: T,
    echo: E,
}

impl<T: OutputPin, E: InputPin> UltrasonicSensor<T, E> {
    pub fn new(trigger: T, echo: E) -> Self {
        Self { trigger, echo }
    }

    /// Fire one trigger pulse and time the returning echo.
    ///
    /// Blocks the caller for up to two echo deadlines in the worst case.
    pub fn measure<C: Clock>(&mut self, clock: &mut C) -> DistanceReading {
        self.trigger.set_high();
        clock.delay_ms(TRIGGER_PULSE_MS);
        self.trigger.set_low();

        let rise = match wait_for_level(&self.echo, clock, true, ECHO_TIMEOUT_MS) {
            EdgeWait::Reached(tick) => tick,
            EdgeWait::TimedOut => return DistanceReading::NoEcho,
        };

        let fall = match wait_for_level(&self.echo, clock, false, ECHO_TIMEOUT_MS) {
            EdgeWait::Reached(tick) => tick,
            EdgeWait::TimedOut => return DistanceReading::NoEcho,
        };

        let pulse_ticks = (fall - rise) as f32;
        DistanceReading::Centimeters(pulse_ticks * SOUND_SPEED_CM_PER_TICK / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimEchoPin, SimOutputPin};

    #[test]
    fn pulse_width_converts_to_centimeters() {
        let sim = SimClock::new();
        // Trigger takes 10ms plus one poll; schedule the rise shortly after.
        // The 80-tick width stays inside the fall deadline.
        let echo = SimEchoPin::pulse(&sim, 20, 80);
        let mut sensor = UltrasonicSensor::new(SimOutputPin::new(&sim), echo);

        let mut clock = &sim;
        match sensor.measure(&mut clock) {
            DistanceReading::Centimeters(cm) => {
                // 80 * 0.034 / 2 = 1.36
                assert!((cm - 1.36).abs() < 0.001, "got {cm}");
            }
            DistanceReading::NoEcho => panic!("expected a reading"),
        }
    }

    #[test]
    fn conversion_matches_reference_scenario() {
        // The documented calibration scenario: 588 ticks -> ~10 cm
        let cm = 588.0 * SOUND_SPEED_CM_PER_TICK / 2.0;
        assert!((cm - 9.996).abs() < 0.001);
    }

    #[test]
    fn pulse_longer_than_the_deadline_times_out() {
        let sim = SimClock::new();
        let echo = SimEchoPin::pulse(&sim, 20, 588);
        let mut sensor = UltrasonicSensor::new(SimOutputPin::new(&sim), echo);

        let mut clock = &sim;
        assert_eq!(sensor.measure(&mut clock), DistanceReading::NoEcho);
    }

    #[test]
    fn missing_rise_times_out_to_sentinel() {
        let sim = SimClock::new();
        let echo = SimEchoPin::silent(&sim);
        let mut sensor = UltrasonicSensor::new(SimOutputPin::new(&sim), echo);

        let mut clock = &sim;
        let reading = sensor.measure(&mut clock);
        assert_eq!(reading, DistanceReading::NoEcho);
        assert_eq!(reading.as_cm(), -1.0);
    }

    #[test]
    fn missing_fall_times_out_to_sentinel() {
        let sim = SimClock::new();
        let echo = SimEchoPin::stuck_high(&sim, 20);
        let mut sensor = UltrasonicSensor::new(SimOutputPin::new(&sim), echo);

        let mut clock = &sim;
        assert_eq!(sensor.measure(&mut clock), DistanceReading::NoEcho);
    }

    #[test]
    fn trigger_line_is_left_low() {
        let sim = SimClock::new();
        let echo = SimEchoPin::silent(&sim);
        let mut sensor = UltrasonicSensor::new(SimOutputPin::new(&sim), echo);

        let mut clock = &sim;
        let _ = sensor.measure(&mut clock);
        assert!(!sensor.trigger.is_high());
        // One high transition held for the trigger pulse, then low
        assert_eq!(sensor.trigger.transitions.len(), 2);
        let (up, _) = sensor.trigger.transitions[0];
        let (down, _) = sensor.trigger.transitions[1];
        assert!(down - up >= TRIGGER_PULSE_MS as u64);
    }
}
