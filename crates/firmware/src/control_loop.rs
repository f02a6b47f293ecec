//! The cooperative control pass. Every timing-sensitive operation in the device happens inside
//! this one task, in a fixed order, against a single wall-clock sample per pass; slow I/O such
//! as the display redraw lives in other tasks and can never stretch the tick-emission loop.

use crate::display::{DisplayFrame, DisplayFrameSender};
use crate::inputs::{POT_SYNC, PotSpy, TEMPO_DELTAS, TRANSPORT_TOGGLE};
use defmt::{info, unwrap};
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::UartTx;
use embassy_time::{Duration, Instant, Ticker};
use taktgeber_lib::engine::{ClockMessage, ControlEvents, Engine};

/// Pass cadence. The shortest tick interval is ~10.4 ms (240 BPM), so polling at 1 ms keeps
/// clock jitter an order of magnitude below a pulse.
const PASS_PERIOD: Duration = Duration::from_millis(1);

/// Drives the engine once per pass and fans its outputs out to the pins, the MIDI jack, and
/// the display synchronizer.
#[embassy_executor::task]
pub async fn control_loop(
    mut gate_a: Output<'static>,
    mut gate_b: Output<'static>,
    mut midi: UartTx<'static, Blocking>,
    display: DisplayFrameSender<'static>,
) -> ! {
    // the boot instant is as good a seed as this board has; it only feeds random pattern mode
    let mut engine = Engine::new(Instant::now().as_ticks());
    let mut pots: PotSpy = POT_SYNC.anon_receiver();
    let mut ticker = Ticker::every(PASS_PERIOD);

    info!("Control loop up, {} BPM", engine.bpm());

    loop {
        let mut events = ControlEvents::default();
        while let Ok(delta) = TEMPO_DELTAS.try_receive() {
            events.tempo_delta = events.tempo_delta.saturating_add(delta);
        }
        events.transport_toggle = TRANSPORT_TOGGLE.try_take().is_some();
        if let Some(frame) = pots.try_changed() {
            events.pattern_control = Some(frame.pattern);
            events.division_control = Some(frame.division);
        }

        // one wall-clock sample drives the entire pass
        let now = Instant::now();
        let batch = engine.update(now, &events);
        for message in batch.iter() {
            send(&mut midi, *message);
        }

        gate_a.set_level(engine.gate_a().into());
        gate_b.set_level(engine.gate_b().into());

        if engine.take_changed() {
            display.send(DisplayFrame {
                bpm: engine.bpm(),
                running: engine.is_running(),
                position: engine.metronome_position(),
                pattern: engine.pattern(),
                division: engine.division(),
            });
        }

        ticker.next().await;
    }
}

/// Serializes one real-time message onto the DIN MIDI output.
///
/// Real-time messages are a single byte, so the blocking write costs about 320 us at
/// 31250 baud — well inside the pass budget even for a full batch.
fn send(midi: &mut UartTx<'static, Blocking>, message: ClockMessage) {
    let mut bytes = [0_u8; 3];
    let n = message
        .message()
        .copy_to_slice(&mut bytes)
        .expect("real-time messages are one byte");
    unwrap!(midi.blocking_write(&bytes[..n]));
}
