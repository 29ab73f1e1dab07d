//! ESP8266 AT command driver
//!
//! Line-oriented command/response exchange over the modem UART. Every
//! command is written with a CRLF terminator and the reply is then read
//! until the modem reports a terminal line or the deadline passes. The
//! deadlines are the per-command processing allowances of the module.

use core::fmt::Write;

use heapless::String;

use crate::traits::{Clock, SerialPort};

const RESET_TIMEOUT_MS: u64 = 2_000;
const MODE_TIMEOUT_MS: u64 = 1_000;
const JOIN_TIMEOUT_MS: u64 = 5_000;
const TCP_OPEN_TIMEOUT_MS: u64 = 2_000;
const SEND_LENGTH_TIMEOUT_MS: u64 = 2_000;
const SEND_PAYLOAD_TIMEOUT_MS: u64 = 2_000;
const CLOSE_TIMEOUT_MS: u64 = 1_000;

/// Longest command line we format (join with SSID and password)
const COMMAND_CAPACITY: usize = 96;
/// Response lines longer than this are scanned but not matched
const LINE_CAPACITY: usize = 64;

/// Terminal outcome of one AT exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtResponse {
    /// Modem answered `OK` (or `SEND OK`, or the send prompt)
    Ok,
    /// Modem answered `ERROR` or `FAIL`
    Error,
    /// No terminal line before the deadline
    Timeout,
}

impl AtResponse {
    pub fn is_ok(self) -> bool {
        matches!(self, AtResponse::Ok)
    }
}

/// AT command driver over an explicit serial link and clock
pub struct Modem<U, C> {
    serial: U,
    clock: C,
}

impl<U: SerialPort, C: Clock> Modem<U, C> {
    pub fn new(serial: U, clock: C) -> Self {
        Self { serial, clock }
    }

    pub fn serial(&self) -> &U {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut U {
        &mut self.serial
    }

    /// `AT+RST` — restart the module
    pub fn reset(&mut self) -> AtResponse {
        self.command("AT+RST", RESET_TIMEOUT_MS)
    }

    /// `AT+CWMODE=1` — station mode
    pub fn set_station_mode(&mut self) -> AtResponse {
        self.command("AT+CWMODE=1", MODE_TIMEOUT_MS)
    }

    /// `AT+CWJAP` — associate with the network
    pub fn join_network(&mut self, ssid: &str, password: &str) -> AtResponse {
        let mut cmd: String<COMMAND_CAPACITY> = String::new();
        let _ = write!(cmd, "AT+CWJAP=\"{}\",\"{}\"", ssid, password);
        self.command(&cmd, JOIN_TIMEOUT_MS)
    }

    /// `AT+CIPSTART` — open a TCP session
    pub fn open_tcp(&mut self, host: &str, port: u16) -> AtResponse {
        let mut cmd: String<COMMAND_CAPACITY> = String::new();
        let _ = write!(cmd, "AT+CIPSTART=\"TCP\",\"{}\",{}", host, port);
        self.command(&cmd, TCP_OPEN_TIMEOUT_MS)
    }

    /// `AT+CIPSEND` — announce the payload length; terminal is the `>` prompt
    pub fn announce_length(&mut self, len: usize) -> AtResponse {
        let mut cmd: String<COMMAND_CAPACITY> = String::new();
        let _ = write!(cmd, "AT+CIPSEND={}", len);
        if self.write_line(&cmd).is_err() {
            return AtResponse::Error;
        }
        self.await_terminal(SEND_LENGTH_TIMEOUT_MS, true)
    }

    /// Transmit the announced payload bytes; terminal is `SEND OK`
    pub fn send_payload(&mut self, payload: &[u8]) -> AtResponse {
        if self.serial.write(payload).is_err() {
            return AtResponse::Error;
        }
        self.await_terminal(SEND_PAYLOAD_TIMEOUT_MS, false)
    }

    /// `AT+CIPCLOSE` — close the TCP session
    pub fn close(&mut self) -> AtResponse {
        self.command("AT+CIPCLOSE", CLOSE_TIMEOUT_MS)
    }

    fn command(&mut self, cmd: &str, timeout_ms: u64) -> AtResponse {
        if self.write_line(cmd).is_err() {
            return AtResponse::Error;
        }
        self.await_terminal(timeout_ms, false)
    }

    fn write_line(&mut self, cmd: &str) -> Result<(), &'static str> {
        self.serial.write(cmd.as_bytes())?;
        self.serial.write(b"\r\n")
    }

    /// Read modem output until a terminal line (`OK`, `SEND OK`, `ERROR`,
    /// `FAIL`), or the `>` prompt when `accept_prompt`, or the deadline
    fn await_terminal(&mut self, timeout_ms: u64, accept_prompt: bool) -> AtResponse {
        let mut line: String<LINE_CAPACITY> = String::new();
        let start = self.clock.now_ms();

        loop {
            match self.serial.read_byte() {
                Some(b'\n') => {
                    match line.trim() {
                        "OK" | "SEND OK" => return AtResponse::Ok,
                        "ERROR" | "FAIL" => return AtResponse::Error,
                        _ => {}
                    }
                    line.clear();
                }
                Some(b'\r') => {}
                Some(b'>') if accept_prompt && line.is_empty() => return AtResponse::Ok,
                Some(byte) => {
                    // Overlong lines are dropped byte by byte; they can never
                    // match a terminal anyway
                    let _ = line.push(byte as char);
                }
                None => {
                    if self.clock.now_ms() - start > timeout_ms {
                        return AtResponse::Timeout;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimSerial};

    fn modem(sim: &SimClock) -> Modem<SimSerial, &SimClock> {
        Modem::new(SimSerial::new(), sim)
    }

    #[test]
    fn commands_are_crlf_terminated() {
        let sim = SimClock::new();
        let mut modem = modem(&sim);
        modem.serial_mut().push_response(b"OK\r\n");

        assert_eq!(modem.set_station_mode(), AtResponse::Ok);
        assert_eq!(modem.serial().transcript(), "AT+CWMODE=1\r\n");
    }

    #[test]
    fn join_interpolates_credentials() {
        let sim = SimClock::new();
        let mut modem = modem(&sim);
        modem.serial_mut().push_response(b"WIFI CONNECTED\r\nOK\r\n");

        assert_eq!(modem.join_network("lab", "hunter2"), AtResponse::Ok);
        assert_eq!(
            modem.serial().transcript(),
            "AT+CWJAP=\"lab\",\"hunter2\"\r\n"
        );
    }

    #[test]
    fn error_and_fail_lines_are_terminal() {
        let sim = SimClock::new();
        let mut modem = modem(&sim);
        modem.serial_mut().push_response(b"no ap\r\nFAIL\r\n");
        assert_eq!(modem.join_network("lab", "wrong"), AtResponse::Error);

        modem.serial_mut().push_response(b"ERROR\r\n");
        assert_eq!(modem.open_tcp("api.thingspeak.com", 80), AtResponse::Error);
    }

    #[test]
    fn silence_times_out() {
        let sim = SimClock::new();
        let mut modem = modem(&sim);

        let before = sim.now();
        assert_eq!(modem.reset(), AtResponse::Timeout);
        // Waited out the full reset deadline
        assert!(sim.now() - before > 2_000);
    }

    #[test]
    fn send_prompt_is_terminal_only_for_length_announcement() {
        let sim = SimClock::new();
        let mut modem = modem(&sim);
        modem.serial_mut().push_response(b"> ");
        assert_eq!(modem.announce_length(42), AtResponse::Ok);

        // A stray '>' inside a close response is not a terminal
        modem.serial_mut().push_response(b">\r\nOK\r\n");
        assert_eq!(modem.close(), AtResponse::Ok);
    }

    #[test]
    fn payload_send_awaits_send_ok() {
        let sim = SimClock::new();
        let mut modem = modem(&sim);
        modem.serial_mut().push_response(b"Recv 10 bytes\r\nSEND OK\r\n");

        assert_eq!(modem.send_payload(b"GET / \r\n"), AtResponse::Ok);
        assert_eq!(modem.serial().transcript(), "GET / \r\n");
    }
}
