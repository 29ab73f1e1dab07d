use embedded_graphics::{
    mono_font::{MonoTextStyleBuilder, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use esp_hal::{
    gpio::AnyPin,
    i2c::master::{Config as I2cConfig, I2c},
    peripherals::I2C0,
    time::Rate,
};
use ssd1306::{I2CDisplayInterface, Ssd1306, mode::BufferedGraphicsMode, prelude::*};

use crate::traits::Display;

const I2C_FREQ_KHZ: u32 = 400;

type Driver<'a> = Ssd1306<
    I2CInterface<I2c<'a, esp_hal::Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// SSD1306 OLED on the I2C bus, drawn through `embedded-graphics`
pub struct OledDisplay<'a> {
    driver: Driver<'a>,
}

impl<'a> OledDisplay<'a> {
    pub fn new<SDA, SCL>(i2c_periph: I2C0<'a>, sda: SDA, scl: SCL) -> Self
    where
        SDA: Into<AnyPin<'a>>,
        SCL: Into<AnyPin<'a>>,
    {
        let i2c = I2c::new(
            i2c_periph,
            I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ)),
        )
        .unwrap()
        .with_sda(sda.into())
        .with_scl(scl.into());

        let interface = I2CDisplayInterface::new(i2c);
        let driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self { driver }
    }
}

impl Display for OledDisplay<'_> {
    fn init(&mut self) -> Result<(), &'static str> {
        self.driver.init().map_err(|_| "display init failed")?;
        esp_println::println!("[OLED] Initialized");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), &'static str> {
        self.driver
            .clear(BinaryColor::Off)
            .map_err(|_| "display clear failed")
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), &'static str> {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(BinaryColor::On)
            .build();

        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(&mut self.driver)
            .map_err(|_| "display draw failed")?;
        Ok(())
    }

    fn update(&mut self) -> Result<(), &'static str> {
        self.driver.flush().map_err(|_| "display flush failed")
    }
}
