//! Taktgeber is [Embassy](https://embassy.dev)-based firmware for a standalone MIDI beat-clock
//! box built around the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html). The device generates a
//! drift-corrected MIDI real-time clock at an encoder-controlled tempo and derives two
//! [CV/gate](https://en.wikipedia.org/wiki/CV/gate) outputs from it: gate A is a step sequencer
//! driven by a pot-selectable rhythmic pattern, gate B is a 50 %-duty gate keyed to a
//! pot-selectable musical division. A pushbutton starts and stops the transport, emitting the
//! matching MIDI Start/Stop messages on the DIN output.
//!
//! All timing-critical work happens in a single cooperative control-loop task
//! ([`control_loop`][control_loop::control_loop]); the tasks in this file's siblings are thin
//! producers and consumers around it. The actual transport and sequencing engine lives in the
//! architecture-agnostic `taktgeber_lib` crate.
//!
//! For details about the hardware or how to wire it up, see the `README`.

#![no_std]
#![no_main]

mod control_loop;
mod display;
mod inputs;

use crate::display::DISPLAY_SYNC;
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    adc::Adc,
    exti::ExtiInput,
    gpio::{Input, Level, Output, Pull, Speed},
    usart,
};

use {defmt_rtt as _, panic_probe as _};

/// The wire-standard DIN MIDI baud rate.
const MIDI_BAUD: u32 = 31250;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Taktgeber");

    // the default clock tree is plenty; nothing here needs more than the HSI
    let p = embassy_stm32::init(Config::default());

    // tempo encoder: channel A interrupts on every edge, channel B is read on demand
    let encoder_a = ExtiInput::new(p.PD1, p.EXTI1, Pull::Up);
    let encoder_b = Input::new(p.PD2, Pull::Up);
    unwrap!(spawner.spawn(inputs::tempo_encoder(encoder_a, encoder_b)));

    // the transport toggles on button release, like the reference hardware
    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(inputs::transport_button(button)));

    // pattern pot on ADC1_IN3, division pot on ADC1_IN10
    let adc = Adc::new(p.ADC1);
    unwrap!(spawner.spawn(inputs::pot_sampler(adc, p.PA3, p.PC0, inputs::POT_SYNC.sender())));

    let mut uart_config = usart::Config::default();
    uart_config.baudrate = MIDI_BAUD;
    let midi = unwrap!(usart::UartTx::new_blocking(p.USART6, p.PG14, uart_config));

    let gate_a = Output::new(p.PG0, Level::Low, Speed::Low);
    let gate_b = Output::new(p.PG1, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(control_loop::control_loop(
        gate_a,
        gate_b,
        midi,
        DISPLAY_SYNC.sender()
    )));

    // the Nucleo's blue user LED doubles as the beat indicator
    let beat_led = Output::new(p.PB7, Level::Low, Speed::Low);
    let frames = DISPLAY_SYNC
        .receiver()
        .expect("Display synchronizer should have a receiver available");
    unwrap!(spawner.spawn(display::display(beat_led, frames)));
}
