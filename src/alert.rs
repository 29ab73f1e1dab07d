//! Motion alert actuator

use crate::traits::{Clock, OutputPin};

/// How long the indicator and sounder stay on
pub const ALERT_DURATION_MS: u32 = 1_000;

/// LED and buzzer pair raised together when motion is detected
pub struct AlertActuator<L, B> {
    led: L,
    buzzer: B,
}

impl<L: OutputPin, B: OutputPin> AlertActuator<L, B> {
    pub fn new(led: L, buzzer: B) -> Self {
        Self { led, buzzer }
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }

    /// Raise both outputs, hold for the alert duration, drop both.
    /// Both pins are back low when this returns.
    pub fn trigger<C: Clock>(&mut self, clock: &mut C) {
        self.led.set_high();
        self.buzzer.set_high();
        clock.delay_ms(ALERT_DURATION_MS);
        self.led.set_low();
        self.buzzer.set_low();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimOutputPin};

    #[test]
    fn outputs_are_low_after_every_trigger() {
        let sim = SimClock::new();
        let mut alert = AlertActuator::new(SimOutputPin::new(&sim), SimOutputPin::new(&sim));

        let mut clock = &sim;
        for _ in 0..3 {
            alert.trigger(&mut clock);
            assert!(!alert.led.is_high());
            assert!(!alert.buzzer.is_high());
        }
    }

    #[test]
    fn outputs_hold_for_the_alert_duration() {
        let sim = SimClock::new();
        let mut alert = AlertActuator::new(SimOutputPin::new(&sim), SimOutputPin::new(&sim));

        let mut clock = &sim;
        alert.trigger(&mut clock);

        let (raised, level) = alert.led.transitions[0];
        assert!(level);
        let (dropped, level) = alert.led.transitions[1];
        assert!(!level);
        assert!(dropped - raised >= ALERT_DURATION_MS as u64);

        let (raised, _) = alert.buzzer.transitions[0];
        let (dropped, _) = alert.buzzer.transitions[1];
        assert!(dropped - raised >= ALERT_DURATION_MS as u64);
    }
}
