//! Dactyl slave joint firmware
//!
//! One RP2040 per joint motor: decodes the quadrature encoder on edge
//! interrupts, runs the proportional position loop, and obeys one-byte
//! commands arriving over the multiplexed bus UART. Identity (which of
//! the ten motors this chip is) comes from the master at start-up.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig, Uart};
use embassy_time::{Duration, Ticker};
use embedded_io_async::{Read, Write};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dactyl_joint::{Drive, EncoderCell, JointController, QuadratureDecoder};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

/// The encoder count, shared between the edge task and the control loop.
static ENCODER: EncoderCell = EncoderCell::new();

/// Control loop pass interval.
const CONTROL_TICK_US: u64 = 500;

/// Motor PWM: 125 MHz / 50 / 256 gives a ~9.8 kHz drive frequency.
const MOTOR_PWM_TOP: u16 = 255;
const MOTOR_PWM_DIVIDER: u8 = 50;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Dactyl joint firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Bus UART (GPIO0 TX, GPIO1 RX) - one byte out, at most one back
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 9_600;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, TX_BUF.init([0u8; 16]), RX_BUF.init([0u8; 16]));

    // Encoder phases on GPIO2/GPIO3
    let enc_a = Input::new(p.PIN_2, Pull::Up);
    let enc_b = Input::new(p.PIN_3, Pull::Up);

    // H-bridge: direction pins plus PWM on GPIO16 (PWM0 A)
    let in_a = Output::new(p.PIN_14, Level::Low);
    let in_b = Output::new(p.PIN_15, Level::Low);
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = MOTOR_PWM_TOP;
    pwm_config.divider = fixed::FixedU16::from_num(MOTOR_PWM_DIVIDER);
    pwm_config.compare_a = 0;
    let pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config.clone());

    spawner.spawn(encoder_task(enc_a, enc_b)).unwrap();
    spawner
        .spawn(joint_task(uart, in_a, in_b, pwm, pwm_config))
        .unwrap();

    info!("All tasks spawned");
}

/// Sample the quadrature phases on every edge of either channel.
#[embassy_executor::task]
async fn encoder_task(mut enc_a: Input<'static>, mut enc_b: Input<'static>) {
    info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new();
    loop {
        match select(enc_a.wait_for_any_edge(), enc_b.wait_for_any_edge()).await {
            Either::First(()) | Either::Second(()) => {
                let reading =
                    ((enc_a.is_high() as u8) << 1) | (enc_b.is_high() as u8);
                ENCODER.apply(decoder.sample(reading));
            }
        }
    }
}

/// Obey bus commands and run the position loop.
#[embassy_executor::task]
async fn joint_task(
    uart: BufferedUart,
    mut in_a: Output<'static>,
    mut in_b: Output<'static>,
    mut pwm: Pwm<'static>,
    mut pwm_config: PwmConfig,
) {
    info!("Joint task started");

    let (mut tx, mut rx) = uart.split();
    let mut joint = JointController::new(&ENCODER);
    let mut ticker = Ticker::every(Duration::from_micros(CONTROL_TICK_US));
    let mut buf = [0u8; 1];

    loop {
        match select(rx.read(&mut buf), ticker.next()).await {
            Either::First(Ok(n)) => {
                for &byte in &buf[..n] {
                    if let Some(reply) = joint.handle_byte(byte) {
                        let _ = tx.write_all(&[reply]).await;
                    }
                }
            }
            Either::First(Err(e)) => warn!("Bus UART read error: {:?}", e),
            Either::Second(()) => {
                if let Some(drive) = joint.poll_motor() {
                    apply_drive(drive, &mut in_a, &mut in_b, &mut pwm, &mut pwm_config);
                }
            }
        }
    }
}

/// Put one drive command on the H-bridge pins.
fn apply_drive(
    drive: Drive,
    in_a: &mut Output<'static>,
    in_b: &mut Output<'static>,
    pwm: &mut Pwm<'static>,
    pwm_config: &mut PwmConfig,
) {
    let duty = match drive {
        Drive::Forward(duty) => {
            in_a.set_low();
            in_b.set_high();
            duty
        }
        Drive::Reverse(duty) => {
            in_a.set_high();
            in_b.set_low();
            duty
        }
        Drive::Brake => {
            // Both legs high shorts the windings
            in_a.set_high();
            in_b.set_high();
            0
        }
    };
    pwm_config.compare_a = duty as u16;
    pwm.set_config(pwm_config);
}
