//! Degree-of-success adjustment rules contributed by an actor's effects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Predicate;
use crate::value_objects::DegreeAdjustments;

/// One rule element: "for checks in `selector`, adjust these outcomes".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeAdjustmentRule {
    /// Check domain the rule listens to (e.g. `reflex`, `attack-roll`)
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
    #[serde(default)]
    pub adjustments: DegreeAdjustments,
}

impl DegreeAdjustmentRule {
    pub fn new(selector: impl Into<String>, adjustments: DegreeAdjustments) -> Self {
        Self {
            selector: selector.into(),
            predicate: None,
            adjustments,
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Rules without a predicate always apply.
    pub fn applies_to(&self, options: &BTreeSet<String>) -> bool {
        self.predicate.as_ref().map_or(true, |p| p.test(options))
    }
}

/// Rules whose selector is one of `domains`, grouped in domain order.
pub fn select_rules<'a>(rules: &'a [DegreeAdjustmentRule], domains: &[String]) -> Vec<&'a DegreeAdjustmentRule> {
    let mut seen = BTreeSet::new();
    domains
        .iter()
        .filter(|domain| seen.insert(*domain))
        .flat_map(move |domain| rules.iter().filter(move |rule| &rule.selector == domain))
        .collect()
}

/// Merge the adjustments of every selected rule whose predicate holds.
///
/// Later rules overwrite earlier ones for the same outcome key.
pub fn collect_adjustments(
    rules: &[DegreeAdjustmentRule],
    domains: &[String],
    roll_options: &BTreeSet<String>,
) -> DegreeAdjustments {
    select_rules(rules, domains)
        .into_iter()
        .filter(|rule| rule.applies_to(roll_options))
        .fold(DegreeAdjustments::new(), |mut merged, rule| {
            merged.merge(&rule.adjustments);
            merged
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Statement;
    use crate::value_objects::{AdjustmentAmount, DegreeAdjustment, OutcomeKey};

    fn rule(selector: &str, key: OutcomeKey, label: &str, amount: AdjustmentAmount) -> DegreeAdjustmentRule {
        DegreeAdjustmentRule::new(selector, DegreeAdjustments::new().with(key, DegreeAdjustment::new(label, amount)))
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn only_rules_for_the_checks_domains_are_used() {
        let rules = vec![
            rule("reflex", OutcomeKey::Success, "Evasion", AdjustmentAmount::INCREASE),
            rule("will", OutcomeKey::Success, "Resolve", AdjustmentAmount::INCREASE),
        ];
        let merged = collect_adjustments(&rules, &strings(&["reflex", "saving-throw"]), &BTreeSet::new());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get(OutcomeKey::Success).map(|a| a.label.as_str()), Some("Evasion"));
    }

    #[test]
    fn predicates_filter_rules() {
        let keen = rule("attack-roll", OutcomeKey::Success, "Keen", AdjustmentAmount::INCREASE).with_predicate(
            Predicate::new(vec![Statement::atom("check:total:natural:19")]),
        );
        let domains = strings(&["attack-roll"]);

        let nat_19: BTreeSet<String> = ["check:total:natural:19".to_string()].into();
        assert!(!collect_adjustments(std::slice::from_ref(&keen), &domains, &nat_19).is_empty());
        assert!(collect_adjustments(std::slice::from_ref(&keen), &domains, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn later_domains_overwrite_the_same_key() {
        let rules = vec![
            rule("saving-throw", OutcomeKey::All, "Generic", AdjustmentAmount::LOWER),
            rule("reflex", OutcomeKey::All, "Specific", AdjustmentAmount::INCREASE),
            rule("reflex", OutcomeKey::Failure, "Other key", AdjustmentAmount::INCREASE),
        ];
        let merged = collect_adjustments(&rules, &strings(&["reflex", "saving-throw"]), &BTreeSet::new());
        assert_eq!(merged.get(OutcomeKey::All).map(|a| a.label.as_str()), Some("Generic"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn duplicate_domains_select_once() {
        let rules = vec![rule("reflex", OutcomeKey::All, "Evasion", AdjustmentAmount::INCREASE)];
        assert_eq!(select_rules(&rules, &strings(&["reflex", "reflex"])).len(), 1);
    }

    #[test]
    fn deserializes_rule_elements() {
        let rule: DegreeAdjustmentRule = serde_json::from_str(
            r#"{"selector": "reflex", "predicate": ["self:effect:evasion"], "adjustments": {"success": {"label": "Evasion", "amount": 1}}}"#,
        )
        .unwrap();
        assert_eq!(rule.selector, "reflex");
        assert!(rule.predicate.is_some());
        assert!(rule.adjustments.get(OutcomeKey::Success).is_some());
    }
}
