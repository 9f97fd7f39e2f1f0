// sf-core/src/units.rs

use uom::si::f64::Velocity as UomVelocity;

// Public canonical unit types (SI, f64)
pub type Velocity = UomVelocity;

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn kph(v: f64) -> Velocity {
    use uom::si::velocity::kilometer_per_hour;
    Velocity::new::<kilometer_per_hour>(v)
}

/// Velocity magnitude in m/s.
#[inline]
pub fn as_mps(v: Velocity) -> f64 {
    use uom::si::velocity::meter_per_second;
    v.get::<meter_per_second>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_conversions() {
        assert!((as_mps(mps(13.9)) - 13.9).abs() < 1e-12);
        assert!((as_mps(kph(36.0)) - 10.0).abs() < 1e-12);
    }
}
