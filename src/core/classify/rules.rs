//! Ordered file name rules
//!
//! Each rule is a `(predicate, kind)` pair. Rules are evaluated in order
//! and the first match decides; a name no rule claims gets the fallback.

use crate::domain::source_file::FileKind;
use regex::Regex;
use std::fmt;

/// Predicate over a file base name
pub type NamePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// One classification rule
pub struct ClassificationRule {
    label: &'static str,
    predicate: NamePredicate,
    kind: FileKind,
}

impl ClassificationRule {
    /// Creates a rule from an arbitrary predicate
    pub fn new(label: &'static str, kind: FileKind, predicate: NamePredicate) -> Self {
        Self {
            label,
            predicate,
            kind,
        }
    }

    /// Creates a rule that fires when `pattern` matches anywhere in the name
    pub fn matching(label: &'static str, kind: FileKind, pattern: Regex) -> Self {
        Self::new(label, kind, Box::new(move |name| pattern.is_match(name)))
    }

    /// Short name used in logs
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Kind assigned on match
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Whether the rule claims `name`
    pub fn applies_to(&self, name: &str) -> bool {
        (self.predicate)(name)
    }
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered rule list with a fallback kind
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
    fallback: FileKind,
}

impl RuleSet {
    /// Creates an empty rule set
    pub fn new(fallback: FileKind) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// The standard two-rule set: exclusion first, then inclusion
    ///
    /// Exclusion is checked first so a name matching both patterns is
    /// always `Excluded`.
    pub fn include_exclude(include: Regex, exclude: Regex) -> Self {
        Self::new(FileKind::NonSequence)
            .with_rule(ClassificationRule::matching(
                "exclude",
                FileKind::Excluded,
                exclude,
            ))
            .with_rule(ClassificationRule::matching(
                "include",
                FileKind::Sequence,
                include,
            ))
    }

    /// Appends a rule
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Kind of `name` under the first matching rule
    pub fn kind_of(&self, name: &str) -> FileKind {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(name))
            .map(ClassificationRule::kind)
            .unwrap_or(self.fallback)
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }
}
