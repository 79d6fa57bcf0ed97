//! Interactive gyro calibration as run at power-on

use crate::config::GyroConfig;
use crate::estimation::HeadingIntegrator;
use crate::sensors::{Button, Clock, Display, ImuBus};

/// Configure the gyro, measure its bias and show the live heading
///
/// 1. Applies the filter bandwidth selectors and waits `settle_ms`.
/// 2. Averages `calibration_samples` readings into the bias with the
///    indicator on. The robot must not move during this step.
/// 3. Resets the heading and displays it until the button is released, so
///    the operator can check for drift by turning the robot by hand.
///
/// Returns the measured bias. Blocks until the gyro delivers every sample
/// and the button is released; there is no timeout on either.
pub fn run_gyro_calibration<B, C, D, K>(
    heading: &mut HeadingIntegrator,
    bus: &mut B,
    clock: &mut C,
    display: &mut D,
    button: &mut K,
    config: &GyroConfig,
) -> i16
where
    B: ImuBus + ?Sized,
    C: Clock + ?Sized,
    D: Display + ?Sized,
    K: Button + ?Sized,
{
    display.clear();
    display.print("Gyro cal");

    bus.configure_gyro(&config.filter);

    display.set_indicator(true);
    clock.delay_ms(config.settle_ms);
    heading.calibrate(bus, config.calibration_samples);
    display.set_indicator(false);

    log::info!("Gyro calibrated, bias {}", heading.bias());

    heading.reset(clock.micros());
    display.clear();
    loop {
        heading.update(bus, clock.micros());
        display.goto_xy(0, 0);
        display.print(&format!("{}   ", heading.signed_heading_degrees()));
        if button.released() {
            break;
        }
    }
    display.clear();

    heading.bias()
}
