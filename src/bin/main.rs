#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use embassy_executor::Spawner;
    use embassy_time::{Duration, Timer};
    use esp_backtrace as _;
    use esp_hal::timer::timg::TimerGroup;

    use gatewatch::{
        alert::AlertActuator,
        config,
        display::OledDisplay,
        hardware::{BoardClock, GpioInput, GpioOutput, ModemUart},
        logic::{self, format_distance_line},
        modem::Modem,
        sensor::UltrasonicSensor,
        telemetry::TelemetryConfig,
        traits::Display,
    };

    const HEART_BEAT_INTERVAL_MS: u64 = 5_000;

    esp_bootloader_esp_idf::esp_app_desc!();

    #[embassy_executor::task]
    async fn run_heartbeat() {
        loop {
            esp_println::println!("[HEARTBEAT] System is alive");
            Timer::after(Duration::from_millis(HEART_BEAT_INTERVAL_MS)).await;
        }
    }

    #[esp_rtos::main]
    async fn main(spawner: Spawner) {
        esp_println::logger::init_logger_from_env();
        let peripherals = esp_hal::init(esp_hal::Config::default());

        esp_println::println!("=== Gatewatch ===");

        // Initialize RTOS timer for embassy
        let timg0 = TimerGroup::new(peripherals.TIMG0);
        esp_rtos::start(timg0.timer0);

        // Spawn the background heartbeat task
        if let Err(e) = spawner.spawn(run_heartbeat()) {
            esp_println::println!("[ERROR] Failed to spawn task: {:?}", e);
        }

        // HC-SR04 on GPIO4 (TRIG) / GPIO5 (ECHO)
        let mut sensor = UltrasonicSensor::new(
            GpioOutput::new(peripherals.GPIO4),
            GpioInput::new(peripherals.GPIO5),
        );

        // PIR motion detector on GPIO6
        let motion = GpioInput::new(peripherals.GPIO6);

        // Alert LED on GPIO7, buzzer on GPIO15
        let mut alert = AlertActuator::new(
            GpioOutput::new(peripherals.GPIO7),
            GpioOutput::new(peripherals.GPIO15),
        );

        // SSD1306 over I2C on GPIO2 (SDA) / GPIO1 (SCL)
        let mut display = OledDisplay::new(peripherals.I2C0, peripherals.GPIO2, peripherals.GPIO1);
        if let Err(e) = display.init() {
            esp_println::println!("[ERROR] Display init failed: {}", e);
        }

        // ESP8266 modem on UART1, GPIO17 (TX) / GPIO18 (RX)
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

        let telemetry = TelemetryConfig {
            host: config::TELEMETRY_HOST,
            port: config::TELEMETRY_PORT,
            api_key: config::THINGSPEAK_API_KEY,
        };

        let mut clock = BoardClock::new();

        loop {
            match logic::run_iteration(
                &mut sensor,
                &motion,
                &mut alert,
                &mut display,
                &mut modem,
                &telemetry,
                &mut clock,
            ) {
                Ok(outcome) => {
                    if let Err(e) = outcome.telemetry {
                        esp_println::println!("[MODEM] {}", e);
                    }
                    // Debug serial echo, one line per iteration
                    esp_println::println!(
                        "{}",
                        format_distance_line(outcome.reading.distance).as_str()
                    );
                }
                Err(e) => esp_println::println!("[ERROR] {}", e),
            }

            Timer::after(Duration::from_millis(config::LOOP_INTERVAL_MS)).await;
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
