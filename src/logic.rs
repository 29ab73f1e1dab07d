//! One pass of the monitoring loop (hardware-independent)

use core::fmt::Write;

use heapless::String;

use crate::alert::AlertActuator;
use crate::model::{DistanceReading, Reading};
use crate::modem::Modem;
use crate::sensor::UltrasonicSensor;
use crate::telemetry::{self, TelemetryConfig, TelemetryError};
use crate::traits::{Clock, Display, InputPin, OutputPin, SerialPort};

/// The line shown on the display and echoed on the debug serial
pub fn format_distance_line(distance: DistanceReading) -> String<32> {
    let mut line = String::new();
    let _ = write!(line, "Distance: {:.2} cm", distance.as_cm());
    line
}

/// What one iteration produced, for the caller to echo and log
pub struct IterationOutcome {
    pub reading: Reading,
    pub telemetry: Result<(), TelemetryError>,
}

/// Run one iteration: measure, show, uplink, check motion, alert.
///
/// A missed echo flows through as the sentinel; a failed uplink step is
/// reported in the outcome and the loop carries on.
#[allow(clippy::too_many_arguments)]
pub fn run_iteration<T, E, P, L, B, D, U, C, MC>(
    sensor: &mut UltrasonicSensor<T, E>,
    motion: &P,
    alert: &mut AlertActuator<L, B>,
    display: &mut D,
    modem: &mut Modem<U, MC>,
    telemetry_config: &TelemetryConfig<'_>,
    clock: &mut C,
) -> Result<IterationOutcome, &'static str>
where
    T: OutputPin,
    E: InputPin,
    P: InputPin,
    L: OutputPin,
    B: OutputPin,
    D: Display,
    U: SerialPort,
    C: Clock,
    MC: Clock,
{
    let distance = sensor.measure(clock);

    display.clear()?;
    let line = format_distance_line(distance);
    display.draw_text(line.as_str(), 10, 10)?;
    display.update()?;

    let telemetry = telemetry::send_reading(modem, telemetry_config, distance);

    let motion_detected = motion.is_high();
    if motion_detected {
        alert.trigger(clock);
    }

    Ok(IterationOutcome {
        reading: Reading {
            distance,
            motion: motion_detected,
        },
        telemetry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimDisplay, SimEchoPin, SimLevelPin, SimOutputPin, SimSerial};

    const CONFIG: TelemetryConfig<'static> = TelemetryConfig {
        host: "api.thingspeak.com",
        port: 80,
        api_key: "KEY",
    };

    fn scripted_modem(sim: &SimClock) -> Modem<SimSerial, &SimClock> {
        let mut serial = SimSerial::new();
        serial.push_response(b"OK\r\n");
        serial.push_response(b"> ");
        serial.push_response(b"SEND OK\r\n");
        serial.push_response(b"OK\r\n");
        Modem::new(serial, sim)
    }

    #[test]
    fn distance_line_has_two_decimals() {
        let line = format_distance_line(DistanceReading::Centimeters(9.996));
        assert_eq!(line.as_str(), "Distance: 10.00 cm");

        let line = format_distance_line(DistanceReading::NoEcho);
        assert_eq!(line.as_str(), "Distance: -1.00 cm");
    }

    #[test]
    fn iteration_displays_uplinks_and_alerts() {
        let sim = SimClock::new();
        let mut sensor =
            UltrasonicSensor::new(SimOutputPin::new(&sim), SimEchoPin::pulse(&sim, 20, 80));
        let motion = SimLevelPin(true);
        let mut alert = AlertActuator::new(SimOutputPin::new(&sim), SimOutputPin::new(&sim));
        let mut display = SimDisplay::new();
        let mut modem = scripted_modem(&sim);
        let mut clock = &sim;

        let outcome = run_iteration(
            &mut sensor,
            &motion,
            &mut alert,
            &mut display,
            &mut modem,
            &CONFIG,
            &mut clock,
        )
        .unwrap();

        assert!(outcome.telemetry.is_ok());
        assert!(outcome.reading.motion);
        assert_eq!(display.clear_count, 1);
        assert_eq!(display.update_count, 1);
        assert_eq!(display.lines[0].as_str(), "Distance: 1.36 cm");
        assert!(modem
            .serial()
            .transcript()
            .contains("GET /update?key=KEY&field1=1.36\r\n"));
        // Alert ran: one full high/low cycle on both pins
        assert_eq!(alert.led().transitions.len(), 2);
        assert!(!alert.led().is_high());
        assert!(!alert.buzzer().is_high());
    }

    #[test]
    fn no_motion_leaves_the_alert_untouched() {
        let sim = SimClock::new();
        let mut sensor =
            UltrasonicSensor::new(SimOutputPin::new(&sim), SimEchoPin::silent(&sim));
        let motion = SimLevelPin(false);
        let mut alert = AlertActuator::new(SimOutputPin::new(&sim), SimOutputPin::new(&sim));
        let mut display = SimDisplay::new();
        let mut modem = scripted_modem(&sim);
        let mut clock = &sim;

        let outcome = run_iteration(
            &mut sensor,
            &motion,
            &mut alert,
            &mut display,
            &mut modem,
            &CONFIG,
            &mut clock,
        )
        .unwrap();

        assert!(!outcome.reading.motion);
        assert_eq!(outcome.reading.distance, DistanceReading::NoEcho);
        assert!(alert.led().transitions.is_empty());
        // The sentinel is still displayed and transmitted
        assert_eq!(display.lines[0].as_str(), "Distance: -1.00 cm");
        assert!(modem
            .serial()
            .transcript()
            .contains("field1=-1.00"));
    }
}
