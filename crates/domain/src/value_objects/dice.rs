//! Dice roll expression value objects and parsing
//!
//! A roll is a small tree of terms (dice, numbers, groupings and binary
//! arithmetic) mirroring what the host stores on a chat message, e.g.
//! `1d20 + 7` for a check or `2 * (1d8 + 4)` for critical damage.
//!
//! Dice are never mutated in place: reconstructing a roll builds a new
//! expression that reuses the already-rolled dice terms.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - unexpected character or token
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
    /// Parentheses do not balance
    #[error("Unbalanced parentheses in '{0}'")]
    UnbalancedParentheses(String),
    /// Groupings nest deeper than the parser accepts
    #[error("Parentheses nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Binary arithmetic operators supported in roll formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
}

impl Operator {
    fn apply(self, left: i32, right: i32) -> Option<i32> {
        match self {
            Operator::Add => left.checked_add(right),
            Operator::Subtract => left.checked_sub(right),
            Operator::Multiply => left.checked_mul(right),
        }
    }

    fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
        }
    }
}

/// A single rolled face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    pub result: i32,
    /// Dropped results (keep-highest, rerolls) are inactive
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl DieResult {
    pub fn active(result: i32) -> Self {
        Self { result, active: true }
    }

    pub fn discarded(result: i32) -> Self {
        Self {
            result,
            active: false,
        }
    }
}

/// `NdF` with the faces that were rolled (empty until evaluated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceTerm {
    pub count: u8,
    pub faces: u16,
    #[serde(default)]
    pub results: Vec<DieResult>,
}

impl DiceTerm {
    /// Create an unrolled dice term.
    pub fn new(count: u8, faces: u16) -> Result<Self, DiceParseError> {
        if count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if faces < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            count,
            faces,
            results: Vec::new(),
        })
    }

    /// A single d20 that already landed on `face`.
    pub fn d20(face: i32) -> Self {
        Self {
            count: 1,
            faces: 20,
            results: vec![DieResult::active(face)],
        }
    }

    pub fn with_results(mut self, results: impl IntoIterator<Item = DieResult>) -> Self {
        self.results = results.into_iter().collect();
        self
    }

    pub fn is_evaluated(&self) -> bool {
        !self.results.is_empty()
    }

    /// Sum of the active faces, `None` when not rolled yet.
    pub fn total(&self) -> Option<i32> {
        if !self.is_evaluated() {
            return None;
        }
        self.results
            .iter()
            .filter(|r| r.active)
            .try_fold(0i32, |acc, r| acc.checked_add(r.result))
    }

    /// The first face that counts toward the total.
    pub fn first_active(&self) -> Option<i32> {
        self.results.iter().find(|r| r.active).map(|r| r.result)
    }

    /// Roll any missing faces through `rng(min, max)` (inclusive bounds).
    pub fn roll_with(&self, rng: &mut impl FnMut(i32, i32) -> i32) -> Self {
        if self.is_evaluated() {
            return self.clone();
        }
        let faces = i32::from(self.faces);
        let results = (0..self.count)
            .map(|_| DieResult::active(rng(1, faces)))
            .collect();
        Self {
            results,
            ..self.clone()
        }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)
    }
}

/// One node of a roll expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "camelCase")]
pub enum RollTerm {
    Dice(DiceTerm),
    Numeric {
        number: i32,
    },
    Grouping {
        term: Box<RollTerm>,
    },
    Arithmetic {
        operator: Operator,
        left: Box<RollTerm>,
        right: Box<RollTerm>,
    },
}

impl RollTerm {
    pub fn numeric(number: i32) -> Self {
        RollTerm::Numeric { number }
    }

    pub fn group(term: RollTerm) -> Self {
        RollTerm::Grouping {
            term: Box::new(term),
        }
    }

    pub fn binary(operator: Operator, left: RollTerm, right: RollTerm) -> Self {
        RollTerm::Arithmetic {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn total(&self) -> Option<i32> {
        match self {
            RollTerm::Dice(dice) => dice.total(),
            RollTerm::Numeric { number } => Some(*number),
            RollTerm::Grouping { term } => term.total(),
            RollTerm::Arithmetic {
                operator,
                left,
                right,
            } => operator.apply(left.total()?, right.total()?),
        }
    }

    /// Visit terms left to right, the order in which they appear in the formula.
    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RollTerm)) {
        visit(self);
        match self {
            RollTerm::Grouping { term } => term.walk(visit),
            RollTerm::Arithmetic { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            RollTerm::Dice(_) | RollTerm::Numeric { .. } => {}
        }
    }

    fn roll_with(&self, rng: &mut impl FnMut(i32, i32) -> i32) -> Self {
        match self {
            RollTerm::Dice(dice) => RollTerm::Dice(dice.roll_with(rng)),
            RollTerm::Numeric { number } => RollTerm::numeric(*number),
            RollTerm::Grouping { term } => RollTerm::group(term.roll_with(rng)),
            RollTerm::Arithmetic {
                operator,
                left,
                right,
            } => RollTerm::binary(*operator, left.roll_with(rng), right.roll_with(rng)),
        }
    }
}

impl fmt::Display for RollTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollTerm::Dice(dice) => write!(f, "{}", dice),
            RollTerm::Numeric { number } => write!(f, "{}", number),
            RollTerm::Grouping { term } => write!(f, "({})", term),
            RollTerm::Arithmetic {
                operator,
                left,
                right,
            } => write!(f, "{} {} {}", left, operator.symbol(), right),
        }
    }
}

/// A complete roll (e.g. `1d20 + 7`), possibly already evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollExpression {
    pub root: RollTerm,
}

impl RollExpression {
    pub fn new(root: RollTerm) -> Self {
        Self { root }
    }

    /// Build `dice + modifier` (or `dice - |modifier|`) from scratch.
    pub fn check(dice: DiceTerm, modifier: i32) -> Self {
        Self::new(append_modifier(RollTerm::Dice(dice), modifier))
    }

    /// Build `d1 + d2 + ... + modifier`; a flat number when there are no dice.
    pub fn rebuild(dice: impl IntoIterator<Item = DiceTerm>, modifier: i32) -> Self {
        let summed = dice
            .into_iter()
            .map(RollTerm::Dice)
            .reduce(|left, right| RollTerm::binary(Operator::Add, left, right));
        match summed {
            Some(term) => Self::new(append_modifier(term, modifier)),
            None => Self::new(RollTerm::numeric(modifier)),
        }
    }

    /// Wrap the whole expression as `factor * (expression)`.
    pub fn multiplied(self, factor: i32) -> Self {
        Self::new(RollTerm::binary(
            Operator::Multiply,
            RollTerm::numeric(factor),
            RollTerm::group(self.root),
        ))
    }

    /// Parse a formula such as `1d20+5`, `d20 - 1` or `2 * (1d8 + 4)`.
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }
        let mut parser = FormulaParser::new(&input);
        let root = parser.expression()?;
        match parser.peek() {
            None => Ok(Self { root }),
            Some(')') => Err(DiceParseError::UnbalancedParentheses(input.clone())),
            Some(c) => Err(DiceParseError::InvalidFormat(format!(
                "Unexpected '{}' in '{}'",
                c, input
            ))),
        }
    }

    /// Evaluated total, `None` while any dice are unrolled.
    pub fn total(&self) -> Option<i32> {
        self.root.total()
    }

    /// The display formula, rebuilt from the tree.
    pub fn formula(&self) -> String {
        self.root.to_string()
    }

    /// All dice terms in formula order.
    pub fn dice(&self) -> Vec<&DiceTerm> {
        let mut dice = Vec::new();
        self.root.walk(&mut |term| {
            if let RollTerm::Dice(d) = term {
                dice.push(d);
            }
        });
        dice
    }

    /// All literal numbers in formula order.
    pub fn numeric_terms(&self) -> Vec<i32> {
        let mut numbers = Vec::new();
        self.root.walk(&mut |term| {
            if let RollTerm::Numeric { number } = term {
                numbers.push(*number);
            }
        });
        numbers
    }

    /// A roll without any dice (e.g. a fixed "take 10" style value).
    pub fn is_deterministic(&self) -> bool {
        self.dice().is_empty()
    }

    /// The first twenty-sided die in the formula.
    pub fn first_d20(&self) -> Option<&DiceTerm> {
        self.dice().into_iter().find(|d| d.faces == 20)
    }

    /// First active face of the first rolled die, whatever its size.
    pub fn natural_result(&self) -> Option<i32> {
        self.dice().into_iter().find_map(DiceTerm::first_active)
    }

    /// Roll every unrolled die through `rng(min, max)`.
    pub fn roll_with(&self, mut rng: impl FnMut(i32, i32) -> i32) -> Self {
        Self::new(self.root.roll_with(&mut rng))
    }
}

impl fmt::Display for RollExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total() {
            Some(total) => write!(f, "{} = {}", self.formula(), total),
            None => write!(f, "{}", self.formula()),
        }
    }
}

/// `term + modifier`, `term - |modifier|`, or `term` alone for zero.
pub(crate) fn append_modifier(term: RollTerm, modifier: i32) -> RollTerm {
    match modifier {
        0 => term,
        m if m > 0 => RollTerm::binary(Operator::Add, term, RollTerm::numeric(m)),
        m => match m.checked_neg() {
            Some(magnitude) => RollTerm::binary(Operator::Subtract, term, RollTerm::numeric(magnitude)),
            // i32::MIN has no positive counterpart
            None => RollTerm::binary(Operator::Add, term, RollTerm::numeric(m)),
        },
    }
}

/// Recursive-descent parser: expr := term (('+'|'-') term)*,
/// term := factor ('*' factor)*, factor := number | [number] 'd' number | '(' expr ')'.
struct FormulaParser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    depth: usize,
}

/// Deepest grouping the parser will descend into.
const MAX_NESTING: usize = 32;

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            depth: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().copied()
    }

    fn expression(&mut self) -> Result<RollTerm, DiceParseError> {
        let mut left = self.product()?;
        loop {
            let operator = match self.peek() {
                Some('+') => Operator::Add,
                Some('-') => Operator::Subtract,
                _ => return Ok(left),
            };
            self.chars.next();
            let right = self.product()?;
            left = RollTerm::binary(operator, left, right);
        }
    }

    fn product(&mut self) -> Result<RollTerm, DiceParseError> {
        let mut left = self.factor()?;
        while self.peek() == Some('*') {
            self.chars.next();
            let right = self.factor()?;
            left = RollTerm::binary(Operator::Multiply, left, right);
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<RollTerm, DiceParseError> {
        match self.peek() {
            Some('(') => {
                if self.depth >= MAX_NESTING {
                    return Err(DiceParseError::NestingTooDeep(MAX_NESTING));
                }
                self.chars.next();
                self.depth += 1;
                let inner = self.expression()?;
                self.depth -= 1;
                if self.peek() != Some(')') {
                    return Err(DiceParseError::UnbalancedParentheses(self.input.to_string()));
                }
                self.chars.next();
                Ok(RollTerm::group(inner))
            }
            Some('-') => {
                self.chars.next();
                let number = self.number()?.ok_or_else(|| self.invalid("a number after '-'"))?;
                Ok(RollTerm::numeric(-number))
            }
            Some('d') => {
                self.chars.next();
                self.dice(1)
            }
            Some(c) if c.is_ascii_digit() => {
                let number = self.number()?.ok_or_else(|| self.invalid("a number"))?;
                if self.chars.next_if_eq(&'d').is_some() {
                    let count = u8::try_from(number)
                        .map_err(|_| self.invalid("a dice count between 1 and 255"))?;
                    self.dice(count)
                } else {
                    Ok(RollTerm::numeric(number))
                }
            }
            Some(c) => Err(DiceParseError::InvalidFormat(format!(
                "Unexpected '{}' in '{}'",
                c, self.input
            ))),
            None => Err(self.invalid("a term")),
        }
    }

    fn dice(&mut self, count: u8) -> Result<RollTerm, DiceParseError> {
        let faces = self
            .number()?
            .ok_or_else(|| self.invalid("a die size after 'd'"))?;
        let faces = u16::try_from(faces).map_err(|_| DiceParseError::InvalidDieSize)?;
        Ok(RollTerm::Dice(DiceTerm::new(count, faces)?))
    }

    fn number(&mut self) -> Result<Option<i32>, DiceParseError> {
        let mut digits = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit()) {
            digits.push(c);
        }
        if digits.is_empty() {
            return Ok(None);
        }
        digits
            .parse()
            .map(Some)
            .map_err(|_| DiceParseError::InvalidFormat(format!("Number too large: '{}'", digits)))
    }

    fn invalid(&self, expected: &str) -> DiceParseError {
        DiceParseError::InvalidFormat(format!("Expected {} in '{}'", expected, self.input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(face: i32) -> impl FnMut(i32, i32) -> i32 {
        move |_, _| face
    }

    #[test]
    fn test_parse_simple_d20() {
        let roll = RollExpression::parse("1d20").unwrap();
        assert_eq!(roll.dice().len(), 1);
        assert_eq!(roll.dice()[0].faces, 20);
        assert_eq!(roll.formula(), "1d20");
    }

    #[test]
    fn test_parse_shorthand_d20() {
        let roll = RollExpression::parse("d20").unwrap();
        assert_eq!(roll.dice()[0].count, 1);
        assert_eq!(roll.dice()[0].faces, 20);
    }

    #[test]
    fn test_parse_with_modifiers() {
        let roll = RollExpression::parse("1d20+5").unwrap();
        assert_eq!(roll.formula(), "1d20 + 5");
        assert_eq!(roll.numeric_terms(), vec![5]);

        let roll = RollExpression::parse("1D20 - 3").unwrap();
        assert_eq!(roll.formula(), "1d20 - 3");
    }

    #[test]
    fn test_parse_critical_damage() {
        let roll = RollExpression::parse("2 * (1d8 + 4)").unwrap();
        assert_eq!(roll.formula(), "2 * (1d8 + 4)");
        let rolled = roll.roll_with(fixed(5));
        assert_eq!(rolled.total(), Some(18));
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let roll = RollExpression::parse("1 + 2 * 3").unwrap();
        assert_eq!(roll.total(), Some(7));
        assert!(roll.is_deterministic());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(RollExpression::parse(""), Err(DiceParseError::Empty)));
        assert!(matches!(
            RollExpression::parse("0d20"),
            Err(DiceParseError::InvalidDiceCount)
        ));
        assert!(matches!(
            RollExpression::parse("1d1"),
            Err(DiceParseError::InvalidDieSize)
        ));
        assert!(matches!(
            RollExpression::parse("(1d20 + 2"),
            Err(DiceParseError::UnbalancedParentheses(_))
        ));
        assert!(matches!(
            RollExpression::parse("1d20 + 2)"),
            Err(DiceParseError::UnbalancedParentheses(_))
        ));
        assert!(matches!(
            RollExpression::parse("1d20 + x"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            RollExpression::parse("1d20 +"),
            Err(DiceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unrolled_dice_have_no_total() {
        let roll = RollExpression::parse("1d20+5").unwrap();
        assert_eq!(roll.total(), None);
        let rolled = roll.roll_with(fixed(14));
        assert_eq!(rolled.total(), Some(19));
        assert_eq!(rolled.to_string(), "1d20 + 5 = 19");
    }

    #[test]
    fn test_roll_stays_in_range() {
        let roll = RollExpression::parse("3d6").unwrap();
        let rolled = roll.roll_with(|min, max| {
            assert_eq!((min, max), (1, 6));
            max
        });
        assert_eq!(rolled.total(), Some(18));
    }

    #[test]
    fn test_inactive_results_do_not_count() {
        let fortune = DiceTerm::new(2, 20)
            .unwrap()
            .with_results([DieResult::discarded(4), DieResult::active(17)]);
        assert_eq!(fortune.total(), Some(17));
        assert_eq!(fortune.first_active(), Some(17));
    }

    #[test]
    fn test_first_d20_skips_other_dice() {
        let roll = RollExpression::new(RollTerm::binary(
            Operator::Add,
            RollTerm::Dice(DiceTerm::new(1, 6).unwrap().with_results([DieResult::active(3)])),
            RollTerm::Dice(DiceTerm::d20(12)),
        ));
        assert_eq!(roll.first_d20().and_then(DiceTerm::first_active), Some(12));
        assert_eq!(roll.natural_result(), Some(3));
    }

    #[test]
    fn test_check_rebuild_signs() {
        assert_eq!(RollExpression::check(DiceTerm::d20(10), 7).formula(), "1d20 + 7");
        assert_eq!(RollExpression::check(DiceTerm::d20(10), -2).formula(), "1d20 - 2");
        assert_eq!(RollExpression::check(DiceTerm::d20(10), 0).formula(), "1d20");
        assert_eq!(RollExpression::check(DiceTerm::d20(10), -2).total(), Some(8));
    }

    #[test]
    fn test_check_rebuild_keeps_extreme_penalty_exact() {
        let roll = RollExpression::check(DiceTerm::d20(10), i32::MIN);
        assert_eq!(roll.total(), Some(10 + i32::MIN));
        assert_eq!(roll.numeric_terms(), vec![i32::MIN]);
    }

    #[test]
    fn test_nesting_is_capped() {
        let nested = |depth: usize| format!("{}1d20{}", "(".repeat(depth), ")".repeat(depth));
        assert!(RollExpression::parse(&nested(MAX_NESTING)).is_ok());
        assert_eq!(
            RollExpression::parse(&nested(MAX_NESTING + 1)),
            Err(DiceParseError::NestingTooDeep(MAX_NESTING))
        );
        assert!(matches!(
            RollExpression::parse(&"(".repeat(100_000)),
            Err(DiceParseError::NestingTooDeep(_))
        ));
    }

    #[test]
    fn test_rebuild_sums_dice_then_modifier() {
        let d8 = DiceTerm::new(1, 8).unwrap().with_results([DieResult::active(6)]);
        let d6 = DiceTerm::new(1, 6).unwrap().with_results([DieResult::active(2)]);
        let roll = RollExpression::rebuild([d8, d6], 4);
        assert_eq!(roll.formula(), "1d8 + 1d6 + 4");
        assert_eq!(roll.total(), Some(12));

        let doubled = roll.multiplied(2);
        assert_eq!(doubled.formula(), "2 * (1d8 + 1d6 + 4)");
        assert_eq!(doubled.total(), Some(24));

        assert_eq!(RollExpression::rebuild(Vec::<DiceTerm>::new(), 3).total(), Some(3));
    }

    #[test]
    fn test_serde_shape() {
        let roll = RollExpression::check(DiceTerm::d20(18), 3);
        let json = serde_json::to_value(&roll).unwrap();
        assert_eq!(json["root"]["class"], "arithmetic");
        assert_eq!(json["root"]["operator"], "+");
        assert_eq!(json["root"]["left"]["class"], "dice");
        let back: RollExpression = serde_json::from_value(json).unwrap();
        assert_eq!(back, roll);
    }
}
