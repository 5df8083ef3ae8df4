//! UART serial communication abstractions
//!
//! Provides the byte transport the command interpreter talks over. There is
//! no framing: bytes go out as given and come back as received. Receive
//! calls block for at most a fixed, implementation-owned timeout.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

/// Errors reported by the serial transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Peripheral could not be configured
    Init,
    /// Transmit failed
    Tx,
    /// Receive failed (framing, parity, overrun, ...)
    Rx,
    /// Requested size is zero or larger than the given buffer
    InvalidSize,
}

/// UART transmitter
pub trait UartTx {
    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Write exactly the first `size` bytes of `data`
    fn send_sized(&mut self, data: &[u8], size: usize) -> Result<(), TransportError> {
        if size == 0 || size > data.len() {
            return Err(TransportError::InvalidSize);
        }
        self.write_blocking(&data[..size])
    }
}

/// UART receiver
pub trait UartRx {
    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled, the transport timeout elapses, or
    /// an error occurs. Returns the number of bytes received, which is 0
    /// when nothing arrived in time.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Read a single byte, if one arrives before the timeout
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError> {
        let mut buf = [0u8; 1];
        match self.read_blocking(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// Transport over any blocking `embedded-io` serial port
///
/// Receive is polled: the port is checked for pending bytes every
/// millisecond until the buffer is full or `timeout_ms` has passed.
pub struct IoUart<U, D> {
    uart: U,
    delay: D,
    timeout_ms: u32,
}

impl<U, D> IoUart<U, D> {
    /// Wrap a serial port with a receive timeout
    pub fn new(uart: U, delay: D, timeout_ms: u32) -> Self {
        Self {
            uart,
            delay,
            timeout_ms,
        }
    }
}

impl<U: embedded_io::Write, D> UartTx for IoUart<U, D> {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.uart.write_all(data).map_err(|_| TransportError::Tx)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.uart.flush().map_err(|_| TransportError::Tx)
    }
}

impl<U, D> UartRx for IoUart<U, D>
where
    U: embedded_io::Read + embedded_io::ReadReady,
    D: DelayNs,
{
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut filled = 0;
        let mut waited_ms = 0;

        while filled < buf.len() {
            let ready = self.uart.read_ready().map_err(|_| TransportError::Rx)?;
            if ready {
                let n = self
                    .uart
                    .read(&mut buf[filled..])
                    .map_err(|_| TransportError::Rx)?;
                filled += n;
                continue;
            }

            if waited_ms >= self.timeout_ms {
                break;
            }
            self.delay.delay_ms(1);
            waited_ms += 1;
        }

        Ok(filled)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (parity bit not included)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::Odd,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Announce the serial settings over `tx`
    ///
    /// Clears an ANSI terminal first, then prints the settings as a
    /// JSON-style block so a freshly attached console shows what it is
    /// talking to.
    pub fn send_banner<T: UartTx + ?Sized>(
        &self,
        tx: &mut T,
        instance: &str,
    ) -> Result<(), TransportError> {
        let mut out = TxWriter { tx, error: None };
        let written = write!(
            out,
            "\x1b[2J{{\r\n\
             \t\"BaudRate\": {},\r\n\
             \t\"DataBits\": {},\r\n\
             \t\"StopBits\": {},\r\n\
             \t\"Parity\": \"{}\",\r\n\
             \t\"Instance\": \"{}\"\r\n\
             }}\r\n",
            self.baudrate,
            self.data_bits.bits(),
            self.stop_bits.bits(),
            self.parity.name(),
            instance,
        );
        match (written, out.error) {
            (_, Some(e)) => Err(e),
            (Err(_), None) => Err(TransportError::Tx),
            (Ok(()), None) => out.tx.flush(),
        }
    }
}

/// `fmt::Write` over a transmitter, keeping the first transport error
struct TxWriter<'a, T: ?Sized> {
    tx: &'a mut T,
    error: Option<TransportError>,
}

impl<T: UartTx + ?Sized> Write for TxWriter<'_, T> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.tx.write_blocking(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            core::fmt::Error
        })
    }
}

/// Transport behavior shared by every serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportConfig {
    /// Receive timeout in milliseconds
    pub timeout_ms: u32,
}

impl TransportConfig {
    pub const CONSOLE: Self = Self { timeout_ms: 1000 };
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::CONSOLE
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

impl DataBits {
    pub fn bits(&self) -> u8 {
        match self {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    pub fn name(&self) -> &'static str {
        match self {
            Parity::None => "NONE",
            Parity::Even => "EVEN",
            Parity::Odd => "ODD",
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub fn bits(&self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Serial port fed from a queue; `None` entries simulate idle milliseconds
    struct ScriptedPort {
        incoming: VecDeque<Option<u8>>,
        sent: Vec<u8>,
    }

    impl embedded_io::ErrorType for ScriptedPort {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::ReadReady for ScriptedPort {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            match self.incoming.front() {
                Some(Some(_)) => Ok(true),
                Some(None) => {
                    self.incoming.pop_front();
                    Ok(false)
                }
                None => Ok(false),
            }
        }
    }

    impl embedded_io::Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.incoming.pop_front() {
                Some(Some(b)) => {
                    buf[0] = b;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    impl embedded_io::Write for ScriptedPort {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct CountingDelay {
        elapsed_ms: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ms += ns / 1_000_000;
        }
    }

    fn transport(incoming: &[Option<u8>], timeout_ms: u32) -> IoUart<ScriptedPort, CountingDelay> {
        IoUart::new(
            ScriptedPort {
                incoming: incoming.iter().copied().collect(),
                sent: Vec::new(),
            },
            CountingDelay { elapsed_ms: 0 },
            timeout_ms,
        )
    }

    #[test]
    fn test_read_fills_buffer_across_gaps() {
        let mut uart = transport(&[Some(b'G'), None, None, Some(b'E'), Some(b'T')], 10);
        let mut buf = [0u8; 3];
        assert_eq!(uart.read_blocking(&mut buf), Ok(3));
        assert_eq!(&buf, b"GET");
        assert_eq!(uart.delay.elapsed_ms, 2);
    }

    #[test]
    fn test_read_times_out_with_partial_data() {
        let mut uart = transport(&[Some(b'H')], 5);
        let mut buf = [0u8; 4];
        assert_eq!(uart.read_blocking(&mut buf), Ok(1));
        assert_eq!(buf[0], b'H');
        assert_eq!(uart.delay.elapsed_ms, 5);
    }

    #[test]
    fn test_read_byte_none_on_timeout() {
        let mut uart = transport(&[], 3);
        assert_eq!(uart.read_byte(), Ok(None));
    }

    #[test]
    fn test_send_sized_validates_size() {
        let mut uart = transport(&[], 1);
        assert_eq!(uart.send_sized(b"HELP", 0), Err(TransportError::InvalidSize));
        assert_eq!(uart.send_sized(b"HELP", 5), Err(TransportError::InvalidSize));
        assert_eq!(uart.send_sized(b"HELP", 2), Ok(()));
        assert_eq!(uart.uart.sent, b"HE");
    }

    #[test]
    fn test_default_config_matches_console() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.parity, Parity::Odd);
        assert_eq!(config.data_bits, DataBits::Eight);
    }

    #[test]
    fn test_banner() {
        let mut uart = transport(&[], 1);
        UartConfig::default().send_banner(&mut uart, "USART2").unwrap();
        let text = std::str::from_utf8(&uart.uart.sent).unwrap();
        assert!(text.starts_with("\x1b[2J{\r\n"));
        assert!(text.contains("\t\"BaudRate\": 9600,\r\n"));
        assert!(text.contains("\"Parity\": \"ODD\""));
        assert!(text.contains("\"Instance\": \"USART2\""));
        assert!(text.ends_with("}\r\n"));
    }

    #[test]
    fn test_console_timeout() {
        assert_eq!(TransportConfig::default().timeout_ms, 1000);
    }
}
