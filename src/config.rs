// config.rs

use crate::error::{PlayerError, Result};
use crate::transport::TransportSettings;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use log::{debug, info};
use std::time::Duration;

pub struct PlayerConfig {
    pub serial_port: String,
    pub baud_rate: u32,
    pub settle: Duration,      // Pause after each panic-off message
    pub write_timeout: Duration,
}

impl PlayerConfig {
    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("serial_port", DEFAULT_SERIAL_PORT)?
            .set_default("baud_rate", i64::from(MIDI_BAUD_RATE))?
            .set_default("settle_ms", DEFAULT_SETTLE_MS as i64)?
            .set_default("write_timeout_ms", DEFAULT_WRITE_TIMEOUT_MS as i64)?)
    }

    /// Loads defaults, then `floppio.toml` from the working directory if it
    /// exists, then `FLOPPIO_*` environment variables.
    pub fn load() -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::with_name("floppio").required(false))
            .add_source(Environment::with_prefix("FLOPPIO"));
        Self::from_builder(builder)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder.build()?;

        let serial_port = settings.get_string("serial_port")?;
        debug!("Serial port setting: {}", serial_port);

        let baud_rate = parse_baud_rate(settings.get_int("baud_rate")?)?;
        if baud_rate != MIDI_BAUD_RATE {
            info!(
                "Using non-standard baud rate {} (MIDI is {})",
                baud_rate, MIDI_BAUD_RATE
            );
        }

        let settle = parse_millis("settle_ms", settings.get_int("settle_ms")?)?;
        let write_timeout = parse_millis("write_timeout_ms", settings.get_int("write_timeout_ms")?)?;
        debug!(
            "Panic-off settle: {:?}, write timeout: {:?}",
            settle, write_timeout
        );

        Ok(PlayerConfig {
            serial_port,
            baud_rate,
            settle,
            write_timeout,
        })
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            device: self.serial_port.clone(),
            baud_rate: self.baud_rate,
            write_timeout: self.write_timeout,
        }
    }
}

fn parse_baud_rate(raw: i64) -> Result<u32> {
    match u32::try_from(raw) {
        Ok(baud) if baud > 0 => Ok(baud),
        _ => Err(PlayerError::Config(format!(
            "baud_rate must be a positive integer, got {}",
            raw
        ))),
    }
}

fn parse_millis(key: &str, raw: i64) -> Result<Duration> {
    u64::try_from(raw)
        .map(Duration::from_millis)
        .map_err(|_| PlayerError::Config(format!("{} must not be negative, got {}", key, raw)))
}

pub const DEFAULT_SERIAL_PORT: &str = "/dev/serial0";
pub const MIDI_BAUD_RATE: u32 = 31_250;
pub const DEFAULT_SETTLE_MS: u64 = 10;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1_000;

pub const CHANNEL_COUNT: u8 = 16;
pub const ALL_NOTES_OFF: u8 = 0x7B;
pub const DEFAULT_TEMPO_US: u32 = 500_000; // 120 BPM

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::from_toml_str("").unwrap();
        assert_eq!(config.serial_port, "/dev/serial0");
        assert_eq!(config.baud_rate, 31_250);
        assert_eq!(config.settle, Duration::from_millis(10));
        assert_eq!(config.write_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config = PlayerConfig::from_toml_str(
            "serial_port = \"/dev/ttyUSB0\"\nbaud_rate = 38400\nsettle_ms = 2\n",
        )
        .unwrap();
        assert_eq!(config.serial_port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 38_400);
        assert_eq!(config.settle, Duration::from_millis(2));

        let settings = config.transport_settings();
        assert_eq!(settings.device, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 38_400);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PlayerConfig::from_toml_str("baud_rate = 0"),
            Err(PlayerError::Config(_))
        ));
        assert!(matches!(
            PlayerConfig::from_toml_str("settle_ms = -5"),
            Err(PlayerError::Config(_))
        ));
        assert!(matches!(
            PlayerConfig::from_toml_str("baud_rate = \"fast\""),
            Err(PlayerError::Config(_))
        ));
    }
}
