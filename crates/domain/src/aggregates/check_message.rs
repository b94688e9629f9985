//! Check message aggregate - a rolled check or damage roll posted to chat
//!
//! The message owns everything needed to re-apply a suppressed trait
//! modifier after the fact: the roll, its modifier list, the roll context
//! (options, DC, outcome) and the set of modifiers already re-applied.
//!
//! # Invariants
//!
//! - A modifier kind is applied at most once per message
//! - The DC is cleared once a check has been regraded
//! - The rolled dice never change; only the flat modifier is rebuilt

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::events::{ForcefulApplied, TraitApplied};
use crate::ids::{ActorId, MessageId};
use crate::rules::{collect_adjustments, incapacitation_adjustment, DegreeAdjustmentRule, EffectSource, IncapacitationContext};
use crate::value_objects::{
    AppliedModifierSet, CheckType, DamageRoll, Degree, DifficultyClass, Modifier, RollExpression, StatisticModifier,
    TraitModifier,
};
use crate::{calculate_degree, DegreeOfSuccess, DomainError};

pub const FORTUNE_TAG: &str = "PF2E.TraitFortune";
pub const MISFORTUNE_TAG: &str = "PF2E.TraitMisfortune";

/// Fortune effects roll twice and keep the better result, misfortune the worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FortuneEffect {
    Fortune,
    Misfortune,
}

impl FortuneEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            FortuneEffect::Fortune => "fortune",
            FortuneEffect::Misfortune => "misfortune",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            FortuneEffect::Fortune => FORTUNE_TAG,
            FortuneEffect::Misfortune => MISFORTUNE_TAG,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollTwice {
    KeepHigher,
    KeepLower,
}

impl RollTwice {
    pub fn effect(self) -> FortuneEffect {
        match self {
            RollTwice::KeepHigher => FortuneEffect::Fortune,
            RollTwice::KeepLower => FortuneEffect::Misfortune,
        }
    }
}

/// A roll substitution offered to the check (e.g. "roll a 15 instead").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub slug: String,
    pub label: String,
    #[serde(default)]
    pub effect_type: Option<FortuneEffect>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub selected: bool,
}

/// Context the host recorded when the check was rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckContext {
    #[serde(rename = "type")]
    pub check_type: CheckType,
    #[serde(default)]
    pub options: BTreeSet<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc: Option<DifficultyClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Degree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unadjusted_outcome: Option<Degree>,
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_twice: Option<RollTwice>,
    /// Number of times the multiple attack penalty increased before this roll
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_increases: Option<u8>,
    #[serde(default)]
    pub traits: Vec<String>,
}

impl CheckContext {
    pub fn new(check_type: CheckType) -> Self {
        Self {
            check_type,
            options: BTreeSet::new(),
            domains: Vec::new(),
            dc: None,
            outcome: None,
            unadjusted_outcome: None,
            substitutions: Vec::new(),
            roll_twice: None,
            map_increases: None,
            traits: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains.extend(domains.into_iter().map(Into::into));
        self
    }

    pub fn with_dc(mut self, dc: DifficultyClass) -> Self {
        self.dc = Some(dc);
        self
    }

    pub fn with_outcome(mut self, outcome: Degree) -> Self {
        self.outcome = Some(outcome);
        self.unadjusted_outcome.get_or_insert(outcome);
        self
    }

    /// Whether this roll came after the multiple attack penalty went up.
    pub fn map_increased(&self) -> bool {
        self.map_increases.is_some_and(|n| n > 0)
            || self.options.contains("map:increases:1")
            || self.options.contains("map:increases:2")
    }

    /// Keep only the substitution that is both required and selected.
    fn settle_required_substitution(&mut self) {
        let Some(required) = self
            .substitutions
            .iter()
            .position(|s| s.required && s.selected)
        else {
            return;
        };
        for (index, substitution) in self.substitutions.iter_mut().enumerate() {
            substitution.required = index == required;
            substitution.selected = index == required;
        }
    }

    /// Roll options with fortune / misfortune resolved, plus the tags to show.
    pub fn effective_roll_options(&self) -> EffectiveRollOptions {
        let mut options = self.options.clone();
        let selected = self.substitutions.iter().find(|s| s.selected);

        let effects: BTreeSet<FortuneEffect> = selected
            .and_then(|s| s.effect_type)
            .into_iter()
            .chain(self.roll_twice.map(RollTwice::effect))
            .collect();
        for effect in &effects {
            options.insert(effect.as_str().to_string());
        }

        let extra_tags = if options.contains("fortune") && options.contains("misfortune") {
            // Fortune and misfortune cancel out, and so do all substitutions
            for substitution in &self.substitutions {
                options.remove(&format!("substitute:{}", substitution.slug));
            }
            vec![FORTUNE_TAG.to_string(), MISFORTUNE_TAG.to_string()]
        } else if let Some(substitution) = selected {
            let name = reduce_item_name(&substitution.label);
            match substitution.effect_type {
                Some(effect) => vec![format!("{} ({})", effect.tag(), name)],
                None => vec![name.to_string()],
            }
        } else {
            match self.roll_twice {
                Some(twice) => vec![twice.effect().tag().to_string()],
                None => Vec::new(),
            }
        };

        EffectiveRollOptions { options, extra_tags }
    }
}

/// Roll options after fortune and substitution handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveRollOptions {
    pub options: BTreeSet<String>,
    pub extra_tags: Vec<String>,
}

/// "Effect: Heroism (3rd)" becomes "Heroism".
fn reduce_item_name(label: &str) -> &str {
    let Some((_, rest)) = label.split_once(':') else {
        return label;
    };
    let rest = rest.trim_start();
    match rest.rfind('(') {
        Some(open) if rest.ends_with(')') && open > 0 => rest[..open].trim_end(),
        _ => rest,
    }
}

/// The item that made the roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub name: String,
    #[serde(default)]
    pub traits: BTreeSet<String>,
    #[serde(default)]
    pub source: EffectSource,
}

impl ItemSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: BTreeSet::new(),
            source: EffectSource::default(),
        }
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits.extend(traits.into_iter().map(Into::into));
        self
    }

    pub fn with_source(mut self, source: EffectSource) -> Self {
        self.source = source;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MessageRoll {
    Check { roll: RollExpression },
    Damage { roll: DamageRoll },
}

/// Actor levels and rule elements used when a check is regraded.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentSources<'a> {
    pub rules: &'a [DegreeAdjustmentRule],
    pub self_level: i32,
    pub target_level: Option<i32>,
}

/// A rolled check or damage roll in the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMessage {
    id: MessageId,
    actor_id: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_id: Option<ActorId>,
    /// Slug of the statistic the modifiers belong to
    modifier_name: String,
    context: CheckContext,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item: Option<ItemSummary>,
    roll: MessageRoll,
    #[serde(default)]
    applied: AppliedModifierSet,
    #[serde(default)]
    content: String,
}

impl CheckMessage {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn check(actor_id: ActorId, modifier_name: impl Into<String>, context: CheckContext, roll: RollExpression) -> Self {
        let content = roll.total().map(|t| t.to_string()).unwrap_or_default();
        Self {
            id: MessageId::new(),
            actor_id,
            target_id: None,
            modifier_name: modifier_name.into(),
            context,
            modifiers: Vec::new(),
            item: None,
            roll: MessageRoll::Check { roll },
            applied: AppliedModifierSet::new(),
            content,
        }
    }

    pub fn damage(actor_id: ActorId, modifier_name: impl Into<String>, context: CheckContext, roll: DamageRoll) -> Self {
        let content = roll.total().map(|t| t.to_string()).unwrap_or_default();
        let modifiers = roll.modifiers.clone();
        Self {
            id: MessageId::new(),
            actor_id,
            target_id: None,
            modifier_name: modifier_name.into(),
            context,
            modifiers,
            item: None,
            roll: MessageRoll::Damage { roll },
            applied: AppliedModifierSet::new(),
            content,
        }
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = id;
        self
    }

    pub fn with_target(mut self, target_id: ActorId) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_item(mut self, item: ItemSummary) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_applied(mut self, applied: AppliedModifierSet) -> Self {
        self.applied = applied;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn target_id(&self) -> Option<ActorId> {
        self.target_id
    }

    pub fn modifier_name(&self) -> &str {
        &self.modifier_name
    }

    pub fn context(&self) -> &CheckContext {
        &self.context
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn item(&self) -> Option<&ItemSummary> {
        self.item.as_ref()
    }

    pub fn roll(&self) -> &MessageRoll {
        &self.roll
    }

    pub fn applied(&self) -> &AppliedModifierSet {
        &self.applied
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn check_type(&self) -> CheckType {
        self.context.check_type
    }

    // =========================================================================
    // Eligibility
    // =========================================================================

    pub fn item_has_trait(&self, name: &str) -> bool {
        self.item.as_ref().is_some_and(|item| item.traits.contains(name))
    }

    pub fn has_modifier(&self, slug: &str) -> bool {
        self.modifiers.iter().any(|m| m.slug == slug)
    }

    pub fn has_enabled_modifier(&self, slug: &str) -> bool {
        self.modifiers.iter().any(|m| m.slug == slug && m.enabled)
    }

    /// Whether `kind` can be re-applied to this message right now.
    pub fn is_eligible(&self, kind: TraitModifier) -> bool {
        if self.applied.contains(kind) {
            return false;
        }
        match kind {
            TraitModifier::Backswing | TraitModifier::Sweep => {
                self.check_type() == CheckType::AttackRoll
                    && kind.weapon_trait().is_some_and(|t| self.item_has_trait(t))
                    && self.has_modifier(kind.slug())
                    && !self.has_enabled_modifier(kind.slug())
            }
            TraitModifier::ForcefulSecond | TraitModifier::ForcefulThird => {
                self.check_type() == CheckType::DamageRoll
                    && self.context.map_increased()
                    && kind.weapon_trait().is_some_and(|t| self.item_has_trait(t))
                    && !self.has_enabled_modifier(TraitModifier::ForcefulSecond.slug())
                    && !self.has_enabled_modifier(TraitModifier::ForcefulThird.slug())
                    && TraitModifier::forceful_stage(&self.context.options) == kind
            }
            TraitModifier::NudgeFate => {
                self.check_type().can_be_nudged()
                    && matches!(self.context.outcome, Some(Degree::Failure | Degree::CriticalFailure))
                    && self.has_modifier(kind.slug())
            }
        }
    }

    /// Trait buttons to show on this message, in display order.
    pub fn offered_modifiers(&self) -> Vec<TraitModifier> {
        let forceful = TraitModifier::forceful_stage(&self.context.options);
        TraitModifier::ATTACK_TRAITS
            .into_iter()
            .chain(std::iter::once(forceful))
            .filter(|kind| self.is_eligible(*kind))
            .collect()
    }

    /// The degree a Nudge Fate (+1 to the total) would produce, when it differs
    /// from the recorded outcome.
    pub fn nudged_degree(&self) -> Option<Degree> {
        if !self.is_eligible(TraitModifier::NudgeFate) {
            return None;
        }
        let MessageRoll::Check { roll } = &self.roll else {
            return None;
        };
        let dc = self.context.dc.as_ref()?;
        let total = roll.total()?;
        let die = roll.natural_result()?;
        let nudged = calculate_degree(dc.value, total.saturating_add(1), die);
        (self.context.outcome != Some(nudged)).then_some(nudged)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Switch on the suppressed modifier for `kind`, rebuild the check roll
    /// and regrade it against the DC if there is one.
    pub fn apply_check_modifier(
        &mut self,
        kind: TraitModifier,
        sources: AdjustmentSources<'_>,
    ) -> Result<TraitApplied, DomainError> {
        let MessageRoll::Check { roll } = &self.roll else {
            return Err(DomainError::validation(format!(
                "{} applies to checks, message {} is a damage roll",
                kind, self.id
            )));
        };
        if self.applied.contains(kind) {
            return Err(DomainError::validation(format!("{} was already applied to message {}", kind, self.id)));
        }
        if !self.has_modifier(kind.slug()) {
            return Err(DomainError::validation(format!(
                "Message {} has no '{}' modifier",
                self.id,
                kind.slug()
            )));
        }

        let activated: Vec<Modifier> = self
            .modifiers
            .iter()
            .map(|m| if m.slug == kind.slug() { m.activated() } else { m.clone() })
            .collect();
        let statistic = StatisticModifier::new(self.modifier_name.clone(), activated);
        let rebuilt = RollExpression::rebuild(roll.dice().into_iter().cloned(), statistic.total_modifier);
        let new_total = rebuilt
            .total()
            .ok_or_else(|| DomainError::invalid_roll("Rebuilt roll has unevaluated dice"))?;

        let mut context = self.context.clone();
        context.options.insert(kind.bonus_option());
        context.settle_required_substitution();
        let EffectiveRollOptions { options, extra_tags } = context.effective_roll_options();

        let degree = match context.dc.take() {
            Some(dc) => {
                let mut temporary = options;
                temporary.insert(format!("check:total:{}", new_total));
                if let Some(natural) = rebuilt.natural_result() {
                    temporary.insert(format!("check:total:natural:{}", natural));
                }

                let mut adjustments = collect_adjustments(sources.rules, &context.domains, &temporary);
                let incapacitation = IncapacitationContext {
                    check_type: context.check_type,
                    self_level: sources.self_level,
                    target_level: sources.target_level,
                    source: self.item.as_ref().map(|i| i.source.clone()).unwrap_or_default(),
                };
                if let Some(extra) = incapacitation_adjustment(&context.options, true, &incapacitation) {
                    adjustments.merge(&extra);
                }

                let degree = DegreeOfSuccess::from_expression(&rebuilt, dc, Some(&adjustments))?;
                context.outcome = Some(degree.value);
                context.unadjusted_outcome = Some(degree.unadjusted);
                Some(degree)
            }
            None => None,
        };

        // Nudge Fate starts from a clean slate of applied modifiers
        let applied = match kind {
            TraitModifier::NudgeFate => AppliedModifierSet::new(),
            _ => self.applied.clone(),
        };

        self.modifiers = statistic.modifiers;
        self.roll = MessageRoll::Check { roll: rebuilt };
        self.context = context;
        self.applied = applied.with(kind);
        self.content = new_total.to_string();

        Ok(TraitApplied {
            modifier: kind,
            total_modifier: statistic.total_modifier,
            new_total,
            degree,
            extra_tags,
        })
    }

    /// Switch on the forceful stage for this attack and rebuild the damage.
    pub fn apply_forceful(&mut self) -> Result<ForcefulApplied, DomainError> {
        let MessageRoll::Damage { roll } = &self.roll else {
            return Err(DomainError::validation(format!("Message {} is not a damage roll", self.id)));
        };
        let stage = TraitModifier::forceful_stage(&self.context.options);
        if self.applied.contains(stage) {
            return Err(DomainError::validation(format!("{} was already applied to message {}", stage, self.id)));
        }
        let damage = roll.with_modifier_enabled(stage.slug())?;
        let previous_total = roll.total();
        let new_total = damage.total();
        let critical = damage.critical;

        self.modifiers = self
            .modifiers
            .iter()
            .map(|m| if m.slug == stage.slug() { m.activated() } else { m.clone() })
            .collect();
        self.content = new_total.map(|t| t.to_string()).unwrap_or_default();
        self.roll = MessageRoll::Damage { roll: damage };
        self.applied = self.applied.with(stage);

        Ok(ForcefulApplied {
            modifier: stage,
            previous_total,
            new_total,
            critical,
        })
    }
}
