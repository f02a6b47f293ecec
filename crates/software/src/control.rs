//! Mapping of normalized analog control samples onto catalog selections.

use num_traits::FromPrimitive;

/// Full-scale value of a 12-bit analog control sample.
pub const CONTROL_MAX: u16 = 4095;

/// A trait which maps the travel of an analog control onto an enum's variants.
///
/// Useful for pot-driven selection: the control's 12-bit range is divided into [`COUNT`][Self::COUNT]
/// equal regions, one per variant in declaration order, so turning the pot sweeps through the
/// catalog from first to last.
pub trait ControlSelect {
    /// Number of selectable variants.
    const COUNT: u8;

    /// Map a control sample onto a variant.
    ///
    /// The ADC cannot produce samples beyond full scale, but an electrical fault must not index
    /// out of the catalog, so over-range samples are clamped rather than rejected.
    fn from_control(value: u16) -> Self
    where
        Self: FromPrimitive + Sized,
    {
        let value = value.min(CONTROL_MAX);
        let index = (u32::from(value) * u32::from(Self::COUNT) / (u32::from(CONTROL_MAX) + 1)) as u8;
        let index = index.min(Self::COUNT - 1);
        <Self as FromPrimitive>::from_u8(index)
            .expect("index should be clamped to the variant count")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_derive::{FromPrimitive, ToPrimitive};

    #[derive(Debug, Clone, Copy, ToPrimitive, FromPrimitive, PartialEq)]
    enum Alpha {
        A,
        B,
        C,
    }
    impl ControlSelect for Alpha {
        const COUNT: u8 = 3;
    }

    #[test]
    fn sweep_covers_every_variant_in_order() {
        assert_eq!(Alpha::A, Alpha::from_control(0), "Expected left but got right");
        assert_eq!(Alpha::B, Alpha::from_control(2048), "Expected left but got right");
        assert_eq!(Alpha::C, Alpha::from_control(4095), "Expected left but got right");
    }

    #[test]
    fn region_boundaries() {
        // 4096 / 3 variants = regions of 1365.33
        assert_eq!(Alpha::A, Alpha::from_control(1365), "Expected left but got right");
        assert_eq!(Alpha::B, Alpha::from_control(1366), "Expected left but got right");
        assert_eq!(Alpha::B, Alpha::from_control(2730), "Expected left but got right");
        assert_eq!(Alpha::C, Alpha::from_control(2731), "Expected left but got right");
    }

    #[test]
    fn over_range_samples_clamp_to_the_last_variant() {
        assert_eq!(Alpha::C, Alpha::from_control(u16::MAX), "Expected left but got right");
    }
}
