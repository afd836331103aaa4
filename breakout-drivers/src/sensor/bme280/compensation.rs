//! Fixed-point compensation engine
//!
//! Bit-exact transcription of the integer compensation formulas from
//! section 4.2.3 of the Bosch datasheet. The factory coefficients are
//! tuned against these exact shift amounts, term order, and
//! intermediate widths (32-bit for temperature and humidity, 64-bit
//! for pressure); the arithmetic must not be restructured.
//!
//! The functions are pure. Temperature produces the [`TFine`] carry
//! the pressure and humidity formulas consume, so a sampling cycle has
//! to compensate temperature first; the signatures make that ordering
//! explicit.

use super::calibration::Calibration;

/// Intermediate fine-resolution temperature
///
/// Only obtainable from [`temperature`], and only meaningful within
/// the sampling cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TFine(pub(crate) i32);

/// Compensate a raw 20-bit temperature reading
///
/// Returns the temperature in hundredths of a degree Celsius (5123
/// means 51.23 degC) and the t_fine carry for this cycle.
pub fn temperature(adc_t: i32, cal: &Calibration) -> (i32, TFine) {
    let t1 = i32::from(cal.t1);
    let var1 = (((adc_t >> 3) - (t1 << 1)) * i32::from(cal.t2)) >> 11;
    let var2 = (((((adc_t >> 4) - t1) * ((adc_t >> 4) - t1)) >> 12) * i32::from(cal.t3)) >> 14;
    let t_fine = var1 + var2;
    let t = (t_fine * 5 + 128) >> 8;
    (t, TFine(t_fine))
}

/// Compensate a raw 20-bit pressure reading
///
/// Returns pressure in Pa as Q24.8 (24674867 means 96386.2 Pa).
/// Returns 0 when the first-stage divisor evaluates to zero; the
/// datasheet mandates this guard instead of a division exception.
pub fn pressure(adc_p: i32, cal: &Calibration, t_fine: TFine) -> u32 {
    let mut var1 = i64::from(t_fine.0) - 128_000;
    let mut var2 = var1 * var1 * i64::from(cal.p6);
    var2 += (var1 * i64::from(cal.p5)) << 17;
    var2 += i64::from(cal.p4) << 35;
    var1 = ((var1 * var1 * i64::from(cal.p3)) >> 8) + ((var1 * i64::from(cal.p2)) << 12);
    var1 = (((1i64 << 47) + var1) * i64::from(cal.p1)) >> 33;

    if var1 == 0 {
        return 0;
    }

    let mut p = 1_048_576 - i64::from(adc_p);
    p = ((p << 31) - var2) * 3125 / var1;
    var1 = (i64::from(cal.p9) * (p >> 13) * (p >> 13)) >> 25;
    var2 = (i64::from(cal.p8) * p) >> 19;
    p = ((p + var1 + var2) >> 8) + (i64::from(cal.p7) << 4);
    p as u32
}

/// Compensate a raw 16-bit humidity reading
///
/// Returns relative humidity as Q22.10 (47445 means 46.333 %RH). The
/// intermediate is clamped to [0, 419430400] before the final shift,
/// so the result never leaves [0, 100] %RH.
pub fn humidity(adc_h: i32, cal: &Calibration, t_fine: TFine) -> u32 {
    let v = t_fine.0 - 76_800;
    let a = ((adc_h << 14) - (i32::from(cal.h4) << 20) - (i32::from(cal.h5) * v) + 16_384) >> 15;
    let b = (((((v * i32::from(cal.h6)) >> 10) * (((v * i32::from(cal.h3)) >> 11) + 32_768))
        >> 10)
        + 2_097_152)
        * i32::from(cal.h2)
        + 8_192;
    let v = a * (b >> 14);
    let v = v - (((((v >> 15) * (v >> 15)) >> 7) * i32::from(cal.h1)) >> 4);
    let v = v.clamp(0, 419_430_400);
    (v >> 12) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Coefficients from the datasheet's worked example (temperature
    /// and pressure); humidity coefficients are typical part values.
    fn cal() -> Calibration {
        Calibration {
            t1: 27504,
            t2: 26435,
            t3: -1000,
            p1: 36477,
            p2: -10685,
            p3: 3024,
            p4: 2855,
            p5: 140,
            p6: -7,
            p7: 15500,
            p8: -14600,
            p9: 6000,
            h1: 75,
            h2: 362,
            h3: 0,
            h4: 313,
            h5: 50,
            h6: 30,
        }
    }

    #[test]
    fn test_datasheet_temperature() {
        let (t, t_fine) = temperature(519888, &cal());
        assert_eq!(t, 2508); // 25.08 degC
        assert_eq!(t_fine.0, 128422);
    }

    #[test]
    fn test_datasheet_pressure() {
        let (_, t_fine) = temperature(519888, &cal());
        let p = pressure(415148, &cal(), t_fine);
        assert_eq!(p, 25767233); // 25767233 / 256 = 100653.25 Pa
    }

    #[test]
    fn test_humidity_reference() {
        let (_, t_fine) = temperature(519888, &cal());
        let h = humidity(30300, &cal(), t_fine);
        assert_eq!(h, 58025); // 58025 / 1024 = 56.665 %RH
    }

    #[test]
    fn test_pressure_zero_divisor_reports_zero() {
        let zeroed = Calibration { p1: 0, ..cal() };
        let (_, t_fine) = temperature(519888, &cal());
        assert_eq!(pressure(415148, &zeroed, t_fine), 0);
    }

    #[test]
    fn test_humidity_clamps_negative_intermediate_to_zero() {
        let (_, t_fine) = temperature(519888, &cal());
        assert_eq!(humidity(0, &cal(), t_fine), 0);
    }

    #[test]
    fn test_humidity_saturates_at_100_percent() {
        let (_, t_fine) = temperature(519888, &cal());
        let h = humidity(0xFFFF, &cal(), t_fine);
        assert_eq!(h, 419_430_400 >> 12);
        assert_eq!(h, 102_400); // exactly 100.0 %RH in Q22.10
    }
}
