//! The status display: a defmt console stand-in for the front-panel OLED, plus the beat
//! indicator LED. Redrawing happens here, outside the control pass, so a slow redraw can delay
//! nothing but itself.

use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_stm32::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{Receiver, Sender, Watch};
use embassy_time::{Duration, Timer};
use taktgeber_lib::division::Division;
use taktgeber_lib::metronome::MetronomePosition;
use taktgeber_lib::pattern::PatternSelect;

/// How long the beat LED stays lit on a downbeat, matching the reference hardware's blink.
const BEAT_FLASH: Duration = Duration::from_millis(50);

/// Everything the display needs to redraw, captured at the end of a control pass.
#[derive(Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame {
    /// Current tempo.
    pub bpm: u16,
    /// Whether the transport is rolling.
    pub running: bool,
    /// Metronome indicator position.
    pub position: MetronomePosition,
    /// Selected gate-A pattern.
    pub pattern: PatternSelect,
    /// Selected gate-B division.
    pub division: Division,
}

const DISPLAY_RECEIVER_CNT: usize = 1;
/// Syncs redraw frames from the control loop to the display task.
pub static DISPLAY_SYNC: Watch<CriticalSectionRawMutex, DisplayFrame, DISPLAY_RECEIVER_CNT> =
    Watch::new();
pub type DisplayFrameSender<'a> =
    Sender<'a, CriticalSectionRawMutex, DisplayFrame, DISPLAY_RECEIVER_CNT>;
pub type DisplayFrameReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, DisplayFrame, DISPLAY_RECEIVER_CNT>;

/// Consumes redraw frames and flashes the beat LED on each downbeat.
#[embassy_executor::task]
pub async fn display(mut beat_led: Output<'static>, mut frames: DisplayFrameReceiver<'static>) -> ! {
    let mut frame = frames.changed().await;
    loop {
        redraw(&frame);

        if frame.running && frame.position == MetronomePosition::Left {
            beat_led.set_high();
            // hold the flash until it expires or the next redraw arrives, whichever is first
            frame = match select(Timer::after(BEAT_FLASH), frames.changed()).await {
                Either::First(()) => {
                    beat_led.set_low();
                    frames.changed().await
                }
                Either::Second(next) => {
                    beat_led.set_low();
                    next
                }
            };
        } else {
            beat_led.set_low();
            frame = frames.changed().await;
        }
    }
}

fn redraw(frame: &DisplayFrame) {
    info!(
        "{} | {} BPM | pattern {} | division {}",
        if frame.running { "RUN " } else { "STOP" },
        frame.bpm,
        frame.pattern,
        frame.division.label()
    );
}
