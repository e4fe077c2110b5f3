use embassy_stm32::exti::ExtiInput;
use embassy_time::{Duration, Timer};
use travel_switch_core::SwitchLevel;

use crate::config::INPUT_DEBOUNCE_MS;
use crate::switch::{EdgeFilter, EdgeSender};

fn sample(input: &ExtiInput<'_>) -> SwitchLevel {
    SwitchLevel::from_pressed(input.is_low())
}

/// Debounces the switch pin and forwards level changes as power-key events.
///
/// `initial` is the level the switch task was booted with, so a release that
/// happened during startup is still reported.
#[embassy_executor::task]
pub async fn run(
    mut input: ExtiInput<'static>,
    edges: EdgeSender<'static>,
    initial: SwitchLevel,
) -> ! {
    let mut filter = EdgeFilter::new(initial);
    let debounce = Duration::from_millis(INPUT_DEBOUNCE_MS);

    loop {
        if let Some(event) = filter.accept(sample(&input)) {
            edges.send(event).await;
        }

        input.wait_for_any_edge().await;
        Timer::after(debounce).await;
    }
}
