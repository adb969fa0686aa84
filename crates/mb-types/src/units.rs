//! Scaled integer units.
//!
//! Energy and tariff values are stored pre-scaled and are never unscaled
//! inside the ledger. Zero is ordinary data for both; "not set" is only
//! ever expressed structurally (absent record, pointer of 0), never by a
//! zero sentinel in these fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Energy in tenths of a kilowatt-hour (kWh x 10, one implicit decimal).
///
/// `EnergyTenths::new(50000)` is 5000.0 kWh.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EnergyTenths(u64);

impl EnergyTenths {
    pub const ZERO: EnergyTenths = EnergyTenths(0);

    pub const fn new(tenths: u64) -> Self {
        Self(tenths)
    }

    /// The raw scaled value.
    pub const fn tenths(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EnergyTenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnergyTenths({})", self.0)
    }
}

impl fmt::Display for EnergyTenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} kWh", self.0 / 10, self.0 % 10)
    }
}

/// Tariff in basis points of the billing currency (value x 10000).
///
/// `TariffBps::new(5000)` is a rate of 0.5000.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TariffBps(u32);

impl TariffBps {
    pub const ZERO: TariffBps = TariffBps(0);

    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    /// The raw scaled value.
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TariffBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TariffBps({})", self.0)
    }
}

impl fmt::Display for TariffBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / 10_000, self.0 % 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_energy_is_valid_data() {
        let e = EnergyTenths::ZERO;
        assert_eq!(e.tenths(), 0);
        assert_eq!(format!("{e}"), "0.0 kWh");
    }

    #[test]
    fn energy_display_keeps_one_decimal() {
        assert_eq!(format!("{}", EnergyTenths::new(50000)), "5000.0 kWh");
        assert_eq!(format!("{}", EnergyTenths::new(12345)), "1234.5 kWh");
    }

    #[test]
    fn tariff_display_keeps_four_decimals() {
        assert_eq!(format!("{}", TariffBps::new(5000)), "0.5000");
        assert_eq!(format!("{}", TariffBps::new(10_000)), "1.0000");
        assert_eq!(format!("{}", TariffBps::new(7)), "0.0007");
    }

    #[test]
    fn serde_is_transparent() {
        let e = EnergyTenths::new(55000);
        assert_eq!(serde_json::to_string(&e).unwrap(), "55000");
        let t: TariffBps = serde_json::from_str("5000").unwrap();
        assert_eq!(t, TariffBps::new(5000));
    }

    proptest! {
        #[test]
        fn energy_roundtrips_through_raw(tenths in any::<u64>()) {
            prop_assert_eq!(EnergyTenths::new(tenths).tenths(), tenths);
        }

        #[test]
        fn tariff_roundtrips_through_raw(bps in any::<u32>()) {
            prop_assert_eq!(TariffBps::new(bps).bps(), bps);
        }
    }
}
