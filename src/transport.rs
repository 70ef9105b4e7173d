//! # Byte stream capability
//!
//! The driver talks to the modem through anything implementing [Transport]: a hardware UART, a
//! USB serial adapter on a host or a scripted mock. Reading never blocks longer than the
//! configured read timeout of the underlying stream.
//!
//! Any stream implementing the [embedded_io] traits can be used by wrapping it in [SerialTransport].
use embedded_io::{Read, ReadReady, Write};

/// Duplex byte stream connected to the modem
pub trait Transport {
    /// Low level stream error
    type Error: embedded_io::Error;

    /// Writes all given bytes to the stream
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Copies the currently available bytes to the given buffer and returns the count.
    /// Returns zero if no data is pending.
    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Releases the stream. The transport must not be used afterwards.
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// [Transport] for any [embedded_io] serial stream
pub struct SerialTransport<S> {
    serial: S,
}

impl<S: Read + Write + ReadReady> SerialTransport<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    /// Returns the wrapped stream
    pub fn release(self) -> S {
        self.serial
    }
}

impl<S: Read + Write + ReadReady> Transport for SerialTransport<S> {
    type Error = S::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.serial.write_all(data)?;
        self.serial.flush()
    }

    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        if buffer.is_empty() || !self.serial.read_ready()? {
            return Ok(0);
        }

        self.serial.read(buffer)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.serial.flush()
    }
}
