//! Nucleo-F401RE wiring
//!
//! - USART2 (PA2=TX, PA3=RX) to the ST-LINK virtual COM port
//! - I2C1 (PB8=SCL, PB9=SDA) shared by the AHT20 and the LCD backpack

use embassy_stm32::i2c;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart;
use embassy_time::Duration;
use hygro_hal::uart::{DataBits, Parity, StopBits};
use hygro_hal::{I2cConfig, UartConfig};

/// Name announced in the startup banner
pub const CONSOLE_INSTANCE: &str = "USART2";

/// Serial buffer sizes
pub const UART_TX_BUF: usize = 256;
pub const UART_RX_BUF: usize = 64;

/// Translate the console settings into an embassy USART config
pub fn usart_config(config: &UartConfig) -> usart::Config {
    let mut out = usart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => usart::DataBits::DataBits7,
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    out.parity = match config.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    out
}

/// Translate the bus settings into an embassy I2C config
pub fn i2c_config(config: &I2cConfig) -> i2c::Config {
    let mut out = i2c::Config::default();
    out.frequency = Hertz(config.frequency);
    out.timeout = Duration::from_millis(config.timeout_ms as u64);
    out
}
