//! Compile-time configuration
//!
//! Credentials and endpoint for the telemetry uplink. Nothing here is
//! runtime-configurable; edit and reflash. Pin assignments live next to the
//! peripheral bindings in `src/bin/main.rs`.

/// Wi-Fi network the modem joins at startup
pub const WIFI_SSID: &str = "your_wifi_ssid";
pub const WIFI_PASSWORD: &str = "your_wifi_password";

/// ThingSpeak write API key; field1 carries the distance
pub const THINGSPEAK_API_KEY: &str = "your_thingspeak_api_key";

/// Endpoint the modem opens a TCP session to, once per reading
pub const TELEMETRY_HOST: &str = "api.thingspeak.com";
pub const TELEMETRY_PORT: u16 = 80;

/// Pause between main loop iterations
pub const LOOP_INTERVAL_MS: u64 = 1_000;
