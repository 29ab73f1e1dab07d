//! ESP32-S3 bindings for the hardware traits

use embedded_io::{Read, ReadReady, Write};
use esp_hal::gpio::AnyPin;
use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    time::Instant,
    uart::{Config as UartConfig, Uart},
};

use crate::traits::{Clock, InputPin, OutputPin, SerialPort};

const MODEM_BAUD_RATE: u32 = 115_200;

/// Push-pull output on one GPIO, starting low
pub struct GpioOutput<'a>(Output<'a>);

impl<'a> GpioOutput<'a> {
    pub fn new<P: Into<AnyPin<'a>>>(pin: P) -> Self {
        Self(Output::new(pin.into(), Level::Low, OutputConfig::default()))
    }
}

impl OutputPin for GpioOutput<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}

/// Pulled-down input for the echo and motion lines
pub struct GpioInput<'a>(Input<'a>);

impl<'a> GpioInput<'a> {
    pub fn new<P: Into<AnyPin<'a>>>(pin: P) -> Self {
        Self(Input::new(
            pin.into(),
            InputConfig::default().with_pull(Pull::Down),
        ))
    }
}

impl InputPin for GpioInput<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Millisecond clock over the SoC timer, blocking delays via [`Delay`]
pub struct BoardClock {
    delay: Delay,
}

impl BoardClock {
    pub fn new() -> Self {
        Self {
            delay: Delay::new(),
        }
    }
}

impl Default for BoardClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for BoardClock {
    fn now_ms(&self) -> u64 {
        Instant::now().duration_since_epoch().as_millis()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_millis(ms);
    }
}

/// Blocking UART link to the ESP8266 modem
pub struct ModemUart<'a> {
    uart: Uart<'a, esp_hal::Blocking>,
}

impl<'a> ModemUart<'a> {
    pub fn new<TX, RX>(uart_periph: esp_hal::peripherals::UART1<'a>, tx: TX, rx: RX) -> Self
    where
        TX: Into<AnyPin<'a>>,
        RX: Into<AnyPin<'a>>,
    {
        let uart = Uart::new(
            uart_periph,
            UartConfig::default().with_baudrate(MODEM_BAUD_RATE),
        )
        .unwrap()
        .with_tx(tx.into())
        .with_rx(rx.into());

        Self { uart }
    }
}

impl SerialPort for ModemUart<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), &'static str> {
        self.uart
            .write_all(bytes)
            .map_err(|_| "modem uart write failed")
    }

    fn read_byte(&mut self) -> Option<u8> {
        if !self.uart.read_ready().unwrap_or(false) {
            return None;
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(n) if n > 0 => Some(byte[0]),
            _ => None,
        }
    }
}
