//! Degree of success value object
//!
//! PF2e resolves every check against a DC into one of four ordered degrees.
//! The ordinal matters: adjustments are applied as integer offsets and
//! clamped to the `[0, 3]` range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Four degrees of success in PF2e, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Degree {
    /// Miss DC by 10+ OR natural 1 that fails
    CriticalFailure = 0,
    /// Below DC
    Failure = 1,
    /// Meet or beat DC
    Success = 2,
    /// Beat DC by 10+ OR natural 20 that succeeds
    CriticalSuccess = 3,
}

impl Degree {
    /// All degrees in ordinal order.
    pub const ALL: [Degree; 4] = [
        Degree::CriticalFailure,
        Degree::Failure,
        Degree::Success,
        Degree::CriticalSuccess,
    ];

    pub const MIN_ORDINAL: i32 = 0;
    pub const MAX_ORDINAL: i32 = 3;

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Map a clamped ordinal back to a degree.
    pub fn from_ordinal_clamped(ordinal: i32) -> Self {
        match ordinal.clamp(Self::MIN_ORDINAL, Self::MAX_ORDINAL) {
            0 => Degree::CriticalFailure,
            1 => Degree::Failure,
            2 => Degree::Success,
            _ => Degree::CriticalSuccess,
        }
    }

    /// Shift by a signed number of steps, clamped to the valid range.
    pub fn offset(self, steps: i32) -> Self {
        Self::from_ordinal_clamped(i32::from(self.ordinal()).saturating_add(steps))
    }

    /// Upgrade the degree by one step (e.g., nat 20).
    pub fn upgrade(self) -> Self {
        self.offset(1)
    }

    /// Downgrade the degree by one step (e.g., nat 1).
    pub fn downgrade(self) -> Self {
        self.offset(-1)
    }

    pub fn is_success(self) -> bool {
        self >= Degree::Success
    }

    /// The key used by the host for flags, CSS classes and adjustment maps.
    pub fn as_str(self) -> &'static str {
        match self {
            Degree::CriticalFailure => "criticalFailure",
            Degree::Failure => "failure",
            Degree::Success => "success",
            Degree::CriticalSuccess => "criticalSuccess",
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Degree {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Degree::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown degree of success: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn upgrade_and_downgrade_stop_at_the_ends() {
        assert_eq!(Degree::CriticalSuccess.upgrade(), Degree::CriticalSuccess);
        assert_eq!(Degree::CriticalFailure.downgrade(), Degree::CriticalFailure);
        assert_eq!(Degree::Failure.upgrade(), Degree::Success);
        assert_eq!(Degree::Success.downgrade(), Degree::Failure);
    }

    #[test]
    fn host_keys_round_trip() {
        for degree in Degree::ALL {
            assert_eq!(degree.as_str().parse::<Degree>().unwrap(), degree);
        }
        assert!("critical_success".parse::<Degree>().is_err());
    }

    #[test]
    fn serializes_with_host_keys() {
        let json = serde_json::to_string(&Degree::CriticalFailure).unwrap();
        assert_eq!(json, "\"criticalFailure\"");
    }

    proptest! {
        #[test]
        fn offset_is_total_and_clamped(ordinal in 0i32..=3, steps in any::<i32>()) {
            let start = Degree::from_ordinal_clamped(ordinal);
            let shifted = start.offset(steps);
            let expected = (ordinal as i64 + steps as i64).clamp(0, 3);
            prop_assert_eq!(i64::from(shifted.ordinal()), expected);
        }
    }
}
