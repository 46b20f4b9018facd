//! Embassy tasks for the master firmware
//!
//! Two byte-pump tasks keep the UARTs drained; the controller task runs
//! the cooperative state machines at a fixed round-robin tick.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{Duration, Ticker};
use embedded_io_async::Read;

use dactyl_core::config::AckConfig;
use dactyl_core::console::Console;
use dactyl_core::gesture::GestureTable;
use dactyl_core::output::OutputSequencer;
use dactyl_core::speller::Speller;

use crate::channels::{OPERATOR_BYTES, SLAVE_BYTES};
use crate::port::{ConsoleWriter, HandPort};

/// Scheduler pass interval for the state machines.
const TICK_MS: u64 = 10;

/// Drain the operator UART into the keystroke channel.
#[embassy_executor::task]
pub async fn operator_rx_task(mut rx: BufferedUartRx) {
    info!("Operator RX task started");
    let mut buf = [0u8; 16];
    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    // Drop keystrokes rather than stall the UART
                    let _ = OPERATOR_BYTES.try_send(byte);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Operator UART read error: {:?}", e),
        }
    }
}

/// Drain the slave bus UART into the reply channel.
#[embassy_executor::task]
pub async fn slave_rx_task(mut rx: BufferedUartRx) {
    info!("Slave RX task started");
    let mut buf = [0u8; 16];
    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    let _ = SLAVE_BYTES.try_send(byte);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Slave UART read error: {:?}", e),
        }
    }
}

/// Run the console, speller and output sequencer.
#[embassy_executor::task]
pub async fn controller_task(mut terminal: ConsoleWriter, mut port: HandPort) {
    info!("Controller task started");

    let mut console = Console::new(GestureTable::new(), Speller::default(), AckConfig::default());
    let mut out = OutputSequencer::default();

    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        while let Ok(byte) = OPERATOR_BYTES.try_receive() {
            console.on_byte(byte, &mut out, &mut port, &mut terminal);
        }
        console.poll(&mut out, &mut port, &mut terminal);
        ticker.next().await;
    }
}
