use super::{Transport, TransportSettings};
use crate::error::{PlayerError, Result};
use log::{info, trace};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Write};

/// Adapts any `io::Write` into a [`Transport`].
pub struct WriteTransport<W> {
    writer: W,
}

impl<W: Write + Send> WriteTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Transport for WriteTransport<W> {
    fn write_message(&mut self, bytes: &[u8]) -> Result<()> {
        match self.writer.write(bytes) {
            Ok(written) if written == bytes.len() => {}
            Ok(written) => {
                return Err(PlayerError::TransportWrite(format!(
                    "short write: {} of {} bytes",
                    written,
                    bytes.len()
                )))
            }
            Err(e) => return Err(PlayerError::TransportWrite(e.to_string())),
        }
        self.writer
            .flush()
            .map_err(|e| PlayerError::TransportWrite(e.to_string()))?;
        trace!("Wrote {:02X?}", bytes);
        Ok(())
    }
}

/// The serial link to the instruments.
pub type SerialTransport = WriteTransport<Box<dyn SerialPort>>;

impl WriteTransport<Box<dyn SerialPort>> {
    /// Opens the configured device as 8 data bits, no parity, one stop bit,
    /// no flow control.
    pub fn open(settings: &TransportSettings) -> Result<Self> {
        info!(
            "Opening serial device {} at {} baud",
            settings.device, settings.baud_rate
        );
        let port = serialport::new(settings.device.as_str(), settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.write_timeout)
            .open()
            .map_err(|e| PlayerError::TransportOpen {
                device: settings.device.clone(),
                source: io::Error::from(e),
            })?;
        info!("Serial device {} open", settings.device);
        Ok(WriteTransport::new(port))
    }
}
