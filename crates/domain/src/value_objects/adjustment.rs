//! Degree-of-success adjustments and their resolution policy
//!
//! Rules such as "incapacitation" or "the first time you critically fail"
//! shift or replace a computed degree. A check receives a mapping of such
//! adjustments keyed by the outcome they apply to; at most one of them is
//! ever applied.

use std::collections::BTreeMap;
use std::fmt;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use super::Degree;

/// Key of an adjustment entry: a specific outcome or the `all` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKey {
    All,
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl OutcomeKey {
    /// Order in which candidate entries are examined. The first match wins.
    pub const SCAN_ORDER: [OutcomeKey; 5] = [
        OutcomeKey::All,
        OutcomeKey::CriticalFailure,
        OutcomeKey::Failure,
        OutcomeKey::Success,
        OutcomeKey::CriticalSuccess,
    ];

    /// The specific degree this key targets, `None` for the wildcard.
    pub fn degree(self) -> Option<Degree> {
        match self {
            OutcomeKey::All => None,
            OutcomeKey::CriticalFailure => Some(Degree::CriticalFailure),
            OutcomeKey::Failure => Some(Degree::Failure),
            OutcomeKey::Success => Some(Degree::Success),
            OutcomeKey::CriticalSuccess => Some(Degree::CriticalSuccess),
        }
    }

    /// Parse a host map key, `None` for keys this engine does not know.
    pub fn from_host_key(key: &str) -> Option<Self> {
        match key {
            "all" => Some(OutcomeKey::All),
            other => other.parse::<Degree>().ok().map(OutcomeKey::from),
        }
    }

    pub fn matches(self, degree: Degree) -> bool {
        self.degree().map_or(true, |d| d == degree)
    }
}

impl From<Degree> for OutcomeKey {
    fn from(degree: Degree) -> Self {
        match degree {
            Degree::CriticalFailure => OutcomeKey::CriticalFailure,
            Degree::Failure => OutcomeKey::Failure,
            Degree::Success => OutcomeKey::Success,
            Degree::CriticalSuccess => OutcomeKey::CriticalSuccess,
        }
    }
}

/// How an adjustment moves the degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdjustmentAmount {
    /// Signed number of steps, clamped to the degree range
    Offset(i32),
    /// Replace the degree outright
    Absolute(Degree),
}

impl AdjustmentAmount {
    pub const LOWER_BY_TWO: AdjustmentAmount = AdjustmentAmount::Offset(-2);
    pub const LOWER: AdjustmentAmount = AdjustmentAmount::Offset(-1);
    pub const INCREASE: AdjustmentAmount = AdjustmentAmount::Offset(1);
    pub const INCREASE_BY_TWO: AdjustmentAmount = AdjustmentAmount::Offset(2);

    pub fn is_zero(self) -> bool {
        self == AdjustmentAmount::Offset(0)
    }

    pub fn apply(self, degree: Degree) -> Degree {
        match self {
            AdjustmentAmount::Absolute(target) => target,
            AdjustmentAmount::Offset(steps) => degree.offset(steps),
        }
    }
}

impl Default for AdjustmentAmount {
    fn default() -> Self {
        AdjustmentAmount::Offset(0)
    }
}

impl fmt::Display for AdjustmentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentAmount::Offset(steps) => write!(f, "{:+}", steps),
            AdjustmentAmount::Absolute(degree) => write!(f, "{}", degree),
        }
    }
}

/// A labelled adjustment. Missing fields deserialize as empty so that
/// malformed host entries are skipped instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeAdjustment {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub amount: AdjustmentAmount,
}

impl DegreeAdjustment {
    pub fn new(label: impl Into<String>, amount: AdjustmentAmount) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }

    /// Entries without a label or with a zero offset count as absent.
    pub fn is_usable(&self) -> bool {
        !self.label.is_empty() && !self.amount.is_zero()
    }

    /// A single step past either end of the scale would be a no-op.
    pub fn is_degenerate_for(&self, degree: Degree) -> bool {
        matches!(
            (degree, self.amount),
            (Degree::CriticalSuccess, AdjustmentAmount::Offset(1))
                | (Degree::CriticalFailure, AdjustmentAmount::Offset(-1))
        )
    }
}

/// Adjustments keyed by outcome, as handed to the degree calculation.
///
/// Deserialization is per entry: an unknown key, a null label or an amount
/// that is neither a number nor a degree key drops that entry only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DegreeAdjustments(BTreeMap<OutcomeKey, DegreeAdjustment>);

#[derive(Deserialize)]
#[serde(untagged)]
enum HostEntry {
    Valid(DegreeAdjustment),
    Malformed(#[allow(dead_code)] IgnoredAny),
}

impl<'de> Deserialize<'de> for DegreeAdjustments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, HostEntry>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, entry)| match (OutcomeKey::from_host_key(&key), entry) {
                (Some(key), HostEntry::Valid(adjustment)) => Some((key, adjustment)),
                _ => None,
            })
            .collect())
    }
}

impl DegreeAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: OutcomeKey, adjustment: DegreeAdjustment) -> Self {
        self.insert(key, adjustment);
        self
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&mut self, key: OutcomeKey, adjustment: DegreeAdjustment) {
        self.0.insert(key, adjustment);
    }

    pub fn get(&self, key: OutcomeKey) -> Option<&DegreeAdjustment> {
        self.0.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeKey, &DegreeAdjustment)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Overlay `other` on top of `self`, entry by entry.
    pub fn merge(&mut self, other: &DegreeAdjustments) {
        for (key, adjustment) in other.iter() {
            self.insert(key, adjustment.clone());
        }
    }

    /// Pick the adjustment that applies to `unadjusted`, if any.
    ///
    /// Keys are scanned in [`OutcomeKey::SCAN_ORDER`]. An entry qualifies when
    /// it is usable, not degenerate for `unadjusted`, and either keyed `all`
    /// or keyed to `unadjusted` itself.
    pub fn resolve(&self, unadjusted: Degree) -> Option<&DegreeAdjustment> {
        OutcomeKey::SCAN_ORDER.into_iter().find_map(|key| {
            let adjustment = self.0.get(&key)?;
            let qualifies = adjustment.is_usable()
                && !adjustment.is_degenerate_for(unadjusted)
                && key.matches(unadjusted);
            qualifies.then_some(adjustment)
        })
    }
}

impl FromIterator<(OutcomeKey, DegreeAdjustment)> for DegreeAdjustments {
    fn from_iter<T: IntoIterator<Item = (OutcomeKey, DegreeAdjustment)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
