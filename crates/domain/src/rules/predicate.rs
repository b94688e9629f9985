//! Roll-option predicates
//!
//! A predicate is a list of statements that must all hold for a set of roll
//! options. Statements are either plain option atoms (`"item:trait:agile"`)
//! or `not` / `or` / `and` / `nor` combinations of nested statements.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Statement {
    Atom(String),
    Not { not: Box<Statement> },
    Or { or: Vec<Statement> },
    And { and: Vec<Statement> },
    Nor { nor: Vec<Statement> },
}

impl Statement {
    pub fn atom(option: impl Into<String>) -> Self {
        Statement::Atom(option.into())
    }

    pub fn not(statement: Statement) -> Self {
        Statement::Not {
            not: Box::new(statement),
        }
    }

    pub fn test(&self, options: &BTreeSet<String>) -> bool {
        match self {
            Statement::Atom(option) => options.contains(option),
            Statement::Not { not } => !not.test(options),
            Statement::Or { or } => or.iter().any(|s| s.test(options)),
            Statement::And { and } => and.iter().all(|s| s.test(options)),
            Statement::Nor { nor } => !nor.iter().any(|s| s.test(options)),
        }
    }
}

/// Conjunction of statements. An empty predicate always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(Vec<Statement>);

impl Predicate {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self(statements)
    }

    pub fn test(&self, options: &BTreeSet<String>) -> bool {
        self.0.iter().all(|s| s.test(options))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Statement> for Predicate {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_predicate_holds() {
        assert!(Predicate::default().test(&options(&[])));
    }

    #[test]
    fn atoms_are_conjunctive() {
        let predicate = Predicate::new(vec![Statement::atom("action:strike"), Statement::atom("item:trait:agile")]);
        assert!(predicate.test(&options(&["action:strike", "item:trait:agile", "self:flanking"])));
        assert!(!predicate.test(&options(&["action:strike"])));
    }

    #[test]
    fn parses_nested_host_json() {
        let predicate: Predicate = serde_json::from_str(
            r#"["action:strike", {"not": "target:condition:off-guard"}, {"or": ["check:total:natural:19", "check:total:natural:20"]}]"#,
        )
        .unwrap();

        assert!(predicate.test(&options(&["action:strike", "check:total:natural:20"])));
        assert!(!predicate.test(&options(&[
            "action:strike",
            "check:total:natural:20",
            "target:condition:off-guard",
        ])));
        assert!(!predicate.test(&options(&["action:strike", "check:total:natural:12"])));
    }

    #[test]
    fn nor_and_and() {
        let predicate: Predicate =
            serde_json::from_str(r#"[{"nor": ["fortune", "misfortune"]}, {"and": ["a", "b"]}]"#).unwrap();
        assert!(predicate.test(&options(&["a", "b"])));
        assert!(!predicate.test(&options(&["a", "b", "fortune"])));
        assert!(!predicate.test(&options(&["a"])));
    }
}
