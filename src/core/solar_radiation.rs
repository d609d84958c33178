use crate::core::units::SECONDS_PER_DAY;
use std::f64::consts::PI;

/// Return the solar radiation incident on the panel, in W/m2
///
/// When the diurnal cycle is enabled, daylight follows the positive half of a sine wave with a
/// period of one day, starting at sunrise (elapsed time 0) and peaking at a quarter of a day. The
/// second half of every day is night, with no incident radiation.
///
/// Arguments:
/// * `peak_solar_radiation` - maximum solar radiation, in W/m2
/// * `elapsed` - time passed since sunrise at the start of the run, in seconds
/// * `diurnal_cycle` - whether to model sunrise and sunset
pub fn incident_flux(peak_solar_radiation: f64, elapsed: f64, diurnal_cycle: bool) -> f64 {
    if !diurnal_cycle {
        return peak_solar_radiation;
    }

    let seconds_per_day = SECONDS_PER_DAY as f64;
    let time_of_day = elapsed.rem_euclid(seconds_per_day);

    // sin(pi) evaluates to ~1.2e-16 in floating point, so sunset is gated explicitly
    if time_of_day >= seconds_per_day / 2. {
        return 0.;
    }

    let a = ((2. * PI * time_of_day) / seconds_per_day).sin();
    if a > 0. {
        peak_solar_radiation * a
    } else {
        0.
    }
}
