//! ThingSpeak telemetry uplink
//!
//! Formats the HTTP GET request carrying one distance reading and drives the
//! modem through the fixed open / length / payload / close session. A missed
//! echo is still reported, as the `-1.00` sentinel.

use core::fmt::Write;

use heapless::String;

use crate::model::DistanceReading;
use crate::modem::{AtResponse, Modem};
use crate::traits::{Clock, SerialPort};

/// Upper bound on the request line; key plus formatted distance fit well within
pub const REQUEST_CAPACITY: usize = 128;

/// Where the readings go
pub struct TelemetryConfig<'a> {
    pub host: &'a str,
    pub port: u16,
    pub api_key: &'a str,
}

/// A session step the modem did not acknowledge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryError {
    pub step: &'static str,
    pub response: AtResponse,
}

impl core::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "uplink {} step got {:?}", self.step, self.response)
    }
}

/// Build the update request line for one reading
pub fn build_update_request(
    api_key: &str,
    distance: DistanceReading,
) -> String<REQUEST_CAPACITY> {
    let mut request = String::new();
    let _ = write!(
        request,
        "GET /update?key={}&field1={:.2}\r\n",
        api_key,
        distance.as_cm()
    );
    request
}

/// Send one reading through the modem.
///
/// All four session commands are always issued, in order, so the modem is
/// never left with a half-open connection; the first unacknowledged step is
/// reported after the close has been sent.
pub fn send_reading<U: SerialPort, C: Clock>(
    modem: &mut Modem<U, C>,
    config: &TelemetryConfig<'_>,
    distance: DistanceReading,
) -> Result<(), TelemetryError> {
    let request = build_update_request(config.api_key, distance);

    let mut first_failure: Option<TelemetryError> = None;
    let mut note = |step: &'static str, response: AtResponse| {
        if first_failure.is_none() && !response.is_ok() {
            first_failure = Some(TelemetryError { step, response });
        }
    };

    note("open", modem.open_tcp(config.host, config.port));
    note("length", modem.announce_length(request.len()));
    note("send", modem.send_payload(request.as_bytes()));
    note("close", modem.close());

    match first_failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
