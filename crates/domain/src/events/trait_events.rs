use crate::value_objects::TraitModifier;
use crate::DegreeOfSuccess;

/// Outcome of re-applying a modifier to a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitApplied {
    pub modifier: TraitModifier,
    pub total_modifier: i32,
    pub new_total: i32,
    /// Present when the check was graded against a DC
    pub degree: Option<DegreeOfSuccess>,
    /// Fortune / misfortune / substitution tags for the flavor text
    pub extra_tags: Vec<String>,
}

/// Outcome of switching on forceful damage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcefulApplied {
    pub modifier: TraitModifier,
    pub previous_total: Option<i32>,
    pub new_total: Option<i32>,
    pub critical: bool,
}
