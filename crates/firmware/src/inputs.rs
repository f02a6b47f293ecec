//! Input tasks. Everything here is a pre-debounced producer: the control loop never touches a
//! peripheral's raw signal, it only drains the synchronizers these tasks feed.

use embassy_stm32::Peri;
use embassy_stm32::adc::Adc;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Input;
use embassy_stm32::peripherals::{ADC1, PA3, PC0};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_sync::watch::{AnonReceiver, Sender, Watch};
use embassy_time::{Duration, Ticker};

/// How often the selection pots are resampled. Sampling on a fixed interval rather than every
/// control pass keeps ADC noise from churning the selections.
const POT_SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Queues encoder movement for the control loop. The depth absorbs a fast spin between passes.
pub static TEMPO_DELTAS: Channel<CriticalSectionRawMutex, i16, 16> = Channel::new();

/// Latches a transport button release until the next control pass consumes it.
pub static TRANSPORT_TOGGLE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// One synchronized sampling of both selection pots.
#[derive(Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PotFrame {
    /// Raw 12-bit sample of the pattern-selection pot.
    pub pattern: u16,
    /// Raw 12-bit sample of the division-selection pot.
    pub division: u16,
}

const POT_RECEIVER_CNT: usize = 0;
/// Syncs pot samples to the control loop.
pub static POT_SYNC: Watch<CriticalSectionRawMutex, PotFrame, POT_RECEIVER_CNT> = Watch::new();
pub type PotSender<'a> = Sender<'a, CriticalSectionRawMutex, PotFrame, POT_RECEIVER_CNT>;
pub type PotSpy<'a> = AnonReceiver<'a, CriticalSectionRawMutex, PotFrame, POT_RECEIVER_CNT>;

/// Decodes the tempo encoder into signed BPM deltas.
///
/// A half-quadrature decode (interrupt on channel A, direction from channel B) halves the
/// resolution but is plenty at hand speeds, and it only ties up one EXTI line.
#[embassy_executor::task]
pub async fn tempo_encoder(mut channel_a: ExtiInput<'static>, channel_b: Input<'static>) -> ! {
    loop {
        channel_a.wait_for_any_edge().await;
        let delta = if channel_a.is_high() == channel_b.is_high() {
            -1
        } else {
            1
        };
        // a full queue means the control loop is stalled; dropping a detent is the least
        // bad option available
        let _ = TEMPO_DELTAS.try_send(delta);
    }
}

/// Latches transport button releases.
#[embassy_executor::task]
pub async fn transport_button(mut button: ExtiInput<'static>) -> ! {
    loop {
        button.wait_for_falling_edge().await;
        TRANSPORT_TOGGLE.signal(());
    }
}

/// Samples both selection pots on a fixed interval and publishes them as one frame.
#[embassy_executor::task]
pub async fn pot_sampler(
    mut adc: Adc<'static, ADC1>,
    mut pattern_pin: Peri<'static, PA3>,
    mut division_pin: Peri<'static, PC0>,
    pots: PotSender<'static>,
) -> ! {
    let mut ticker = Ticker::every(POT_SAMPLE_PERIOD);
    loop {
        let frame = PotFrame {
            pattern: adc.blocking_read(&mut pattern_pin),
            division: adc.blocking_read(&mut division_pin),
        };
        pots.send(frame);
        ticker.next().await;
    }
}
