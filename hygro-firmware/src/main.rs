//! Hygrostation Firmware
//!
//! Serial console on a Nucleo-F401RE: `GET`, `RESET` and `HELP` commands
//! typed at 9600 8O1 drive an AHT20 sensor, and readings are shown on a
//! 16x2 HD44780 LCD.

#![no_std]
#![no_main]

mod board;

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::USART2;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hygro_core::traits::HumiditySensor;
use hygro_core::Session;
use hygro_drivers::{Aht20, Hd44780};
use hygro_hal::{HalI2c, I2cConfig, IoUart, SharedI2c, TransportConfig, UartConfig};

bind_interrupts!(struct Irqs {
    USART2 => usart::BufferedInterruptHandler<USART2>;
});

type Bus = HalI2c<I2c<'static, Blocking>>;

static TX_BUF: StaticCell<[u8; board::UART_TX_BUF]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; board::UART_RX_BUF]> = StaticCell::new();
static I2C_BUS: StaticCell<RefCell<Bus>> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Hygrostation starting...");

    let p = embassy_stm32::init(Default::default());

    // Console
    let console = UartConfig::default();
    let uart = BufferedUart::new(
        p.USART2,
        p.PA3,
        p.PA2,
        TX_BUF.init([0; board::UART_TX_BUF]),
        RX_BUF.init([0; board::UART_RX_BUF]),
        Irqs,
        board::usart_config(&console),
    )
    .unwrap();
    let mut transport = IoUart::new(uart, Delay, TransportConfig::default().timeout_ms);

    if let Err(e) = console.send_banner(&mut transport, board::CONSOLE_INSTANCE) {
        warn!("Failed to send banner: {:?}", e);
    }

    // Sensor and display share I2C1
    let i2c = I2c::new_blocking(
        p.I2C1,
        p.PB8,
        p.PB9,
        board::i2c_config(&I2cConfig::default()),
    );
    let bus = I2C_BUS.init(RefCell::new(HalI2c::new(i2c)));

    let mut display = Hd44780::new(SharedI2c::new(bus), Delay);
    match display.init() {
        Ok(()) => info!("LCD initialized"),
        Err(e) => error!("Failed to initialize LCD: {:?}", e),
    }

    // A sensor that fails here can still be recovered with RESET
    let mut sensor = Aht20::new(SharedI2c::new(bus), Delay);
    match sensor.init() {
        Ok(()) => info!("AHT20 initialized"),
        Err(e) => error!("Failed to initialize AHT20: {:?}", e),
    }

    let mut session = Session::new();
    info!("Console ready");

    loop {
        session.tick(&mut transport, &mut sensor, &mut display);
    }
}
