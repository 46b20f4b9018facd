//! Dactyl - Robotic Fingerspelling Hand Firmware
//!
//! Master firmware for RP2040-based hand controllers. An operator types
//! sentences on the UART0 terminal; the controller translates them into
//! finger and wrist poses and streams one-byte motor commands to the
//! slave joint controllers behind the UART1 multiplexer.
//!
//! Named after the Greek "daktylos" (finger) - the root of dactylology,
//! the art this hand performs.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::port::{ConsoleWriter, MuxPins, PwmServo, SlaveBus, SpreadSwitch};

mod channels;
mod port;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static OP_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static OP_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static BUS_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static BUS_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Dactyl firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Operator terminal on UART0 (GPIO0 TX, GPIO1 RX)
    let mut op_config = UartConfig::default();
    op_config.baudrate = 115_200;
    let op_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, op_config);
    let op_uart = op_uart.into_buffered(
        Irqs,
        OP_TX_BUF.init([0u8; 256]),
        OP_RX_BUF.init([0u8; 64]),
    );
    let (op_tx, op_rx) = op_uart.split();

    // Slave bus on UART1 (GPIO8 TX, GPIO9 RX), half-duplex behind the mux
    let mut bus_config = UartConfig::default();
    bus_config.baudrate = 9_600;
    let bus_uart = Uart::new_blocking(p.UART1, p.PIN_8, p.PIN_9, bus_config);
    let bus_uart = bus_uart.into_buffered(
        Irqs,
        BUS_TX_BUF.init([0u8; 64]),
        BUS_RX_BUF.init([0u8; 64]),
    );
    let (bus_tx, bus_rx) = bus_uart.split();

    info!("UARTs initialized");

    // Multiplexer address lines (GPIO2-5 feed both selector chips)
    let mux = MuxPins::new([
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ]);

    // Wrist servos: flex on GPIO16 (PWM0 A), twist on GPIO18 (PWM1 A)
    let servo_config = PwmServo::frame_config();
    let flex_pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, servo_config.clone());
    let twist_pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_18, servo_config.clone());
    let flex_servo = PwmServo::new(flex_pwm, servo_config.clone());
    let twist_servo = PwmServo::new(twist_pwm, servo_config);

    // Index spread switch on GPIO6
    let spread = SpreadSwitch::new(Output::new(p.PIN_6, Level::Low));

    info!("Actuators initialized");

    let hand_port = port::HandPort::new(
        mux,
        SlaveBus::new(bus_tx),
        flex_servo,
        twist_servo,
        spread,
    );

    // Spawn tasks
    spawner.spawn(tasks::operator_rx_task(op_rx)).unwrap();
    spawner.spawn(tasks::slave_rx_task(bus_rx)).unwrap();
    spawner
        .spawn(tasks::controller_task(ConsoleWriter::new(op_tx), hand_port))
        .unwrap();

    info!("All tasks spawned");
}
