#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use embassy_executor::Spawner;
    use embassy_time::{Duration, Timer};
    use esp_backtrace as _;
    use esp_hal::timer::timg::TimerGroup;

    use gatewatch::{
        config,
        hardware::{BoardClock, ModemUart},
        model::DistanceReading,
        modem::Modem,
        telemetry::{self, TelemetryConfig},
    };

    esp_bootloader_esp_idf::esp_app_desc!();

    /// Brings the ESP8266 up step by step and pushes one sentinel reading,
    /// logging every response so the serial wiring can be verified.
    #[esp_rtos::main]
    async fn main(_spawner: Spawner) {
        esp_println::logger::init_logger_from_env();
        let peripherals = esp_hal::init(esp_hal::Config::default());

        let timg0 = TimerGroup::new(peripherals.TIMG0);
        esp_rtos::start(timg0.timer0);

        esp_println::println!("=== Gatewatch Modem Test ===");

        let mut modem = Modem::new(
            ModemUart::new(peripherals.UART1, peripherals.GPIO17, peripherals.GPIO18),
            BoardClock::new(),
        );

        esp_println::println!("[MODEM] Reset: {:?}", modem.reset());
        esp_println::println!("[MODEM] Station mode: {:?}", modem.set_station_mode());
        esp_println::println!(
            "[MODEM] Join {}: {:?}",
            config::WIFI_SSID,
            modem.join_network(config::WIFI_SSID, config::WIFI_PASSWORD)
        );

        let telemetry_config = TelemetryConfig {
            host: config::TELEMETRY_HOST,
            port: config::TELEMETRY_PORT,
            api_key: config::THINGSPEAK_API_KEY,
        };

        loop {
            match telemetry::send_reading(&mut modem, &telemetry_config, DistanceReading::NoEcho) {
                Ok(()) => esp_println::println!("[MODEM] Sentinel reading uplinked"),
                Err(e) => esp_println::println!("[MODEM] {}", e),
            }

            Timer::after(Duration::from_secs(15)).await;
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
