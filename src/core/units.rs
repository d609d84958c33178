pub const JOULES_PER_KILOWATT_HOUR: u32 = 3_600_000;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const SECONDS_PER_DAY: u32 = SECONDS_PER_HOUR * HOURS_PER_DAY;

/// Stefan-Boltzmann constant in W / (m^2 K^4), at the precision the panel model is calibrated to.
pub const STEFAN_BOLTZMANN_CONSTANT: f64 = 5.67e-8;

/// Offset used for converting degrees C to K (273 rather than 273.15).
pub const KELVIN_OFFSET: f64 = 273.;

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + KELVIN_OFFSET
}

pub(crate) fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR as f64
}

pub(crate) fn joules_to_kwh(joules: f64) -> f64 {
    joules / JOULES_PER_KILOWATT_HOUR as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(25., 298.)]
    #[case(0., 273.)]
    #[case(-273., 0.)]
    fn should_convert_celsius_to_kelvin_with_simplified_offset(
        #[case] temp_c: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(celsius_to_kelvin(temp_c), expected);
    }

    #[rstest]
    fn should_have_a_day_of_86400_seconds() {
        assert_eq!(SECONDS_PER_DAY, 86_400);
    }

    #[rstest]
    fn should_convert_seconds_to_hours() {
        assert_eq!(seconds_to_hours(5400.), 1.5);
    }

    #[rstest]
    fn should_convert_joules_to_kwh() {
        assert_eq!(joules_to_kwh(7_200_000.), 2.);
    }
}
