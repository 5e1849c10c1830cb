//! The replacement model: typed diff units accumulated while matching a
//! fragment pair, plus the mutable accumulator threaded through the
//! heuristic chain.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::call::Call;
use crate::text;

/// Catalog of replacement kinds. Closed on purpose: every consumer
/// matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementKind {
    VariableName,
    Type,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    NullLiteral,
    InfixOperator,
    InfixExpression,
    PrefixExpression,
    ArrayAccess,
    MethodInvocation,
    MethodInvocationName,
    MethodInvocationArgument,
    Invoker,
    ClassInstanceCreation,
    VariableReplacedWithInvocation,
    VariableReplacedWithArrayAccess,
    VariableReplacedWithPrefixExpression,
    VariableReplacedWithTernary,
    VariableReplacedWithStringLiteral,
    ArgumentReplacedWithReturnExpression,
    ArgumentReplacedWithStatement,
    ArgumentReplacedWithExpression,
    Conditional,
    InvertConditional,
    Concatenation,
    Composite,
    SwapArgument,
    SplitVariable,
    MergeVariable,
    AddVariable,
}

impl ReplacementKind {
    /// Aggregate kinds summarize several sub-diffs at once; the inverse
    /// cycle elimination of [`ReplacementSet::insert`] skips them.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            ReplacementKind::Composite
                | ReplacementKind::Concatenation
                | ReplacementKind::Conditional
                | ReplacementKind::SwapArgument
                | ReplacementKind::SplitVariable
                | ReplacementKind::MergeVariable
                | ReplacementKind::AddVariable
        )
    }

    /// Kinds that rename or substitute a single variable occurrence.
    pub fn involves_variable(&self) -> bool {
        matches!(
            self,
            ReplacementKind::VariableName
                | ReplacementKind::VariableReplacedWithInvocation
                | ReplacementKind::VariableReplacedWithArrayAccess
                | ReplacementKind::VariableReplacedWithPrefixExpression
                | ReplacementKind::VariableReplacedWithTernary
                | ReplacementKind::VariableReplacedWithStringLiteral
        )
    }

    /// Kinds justifying a receiver change in call comparison.
    pub fn justifies_receiver_change(&self) -> bool {
        matches!(
            self,
            ReplacementKind::VariableName
                | ReplacementKind::Type
                | ReplacementKind::MethodInvocation
                | ReplacementKind::MethodInvocationName
                | ReplacementKind::VariableReplacedWithInvocation
        )
    }
}

/// Direction of a variable-to-invocation substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    VariableToInvocation,
    InvocationToVariable,
}

/// Structured payload carried by compound replacement kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detail", rename_all = "snake_case")]
pub enum ReplacementDetail {
    Invocation {
        before: Call,
        after: Call,
        #[serde(skip_serializing_if = "Option::is_none")]
        direction: Option<Direction>,
    },
    Swap {
        before_call: Call,
        after_call: Call,
    },
    Split {
        split_variables: BTreeSet<String>,
    },
    Merge {
        merged_variables: BTreeSet<String>,
    },
    Add {
        added_variables: BTreeSet<String>,
    },
    Composite {
        additionally_matched_before: usize,
        additionally_matched_after: usize,
    },
}

/// A single typed (before-text, after-text) diff unit.
///
/// Equality and hashing deliberately ignore the detail payload: the set
/// semantics of a mapping treat two replacements with equal texts and
/// kind as the same diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub before: String,
    pub after: String,
    pub kind: ReplacementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ReplacementDetail>,
}

impl Replacement {
    pub fn new(before: impl Into<String>, after: impl Into<String>, kind: ReplacementKind) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            kind,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: ReplacementDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// True when before and after carry the same text. Identity
    /// composites mark structurally re-matched fragments.
    pub fn is_identity(&self) -> bool {
        self.before == self.after
    }

    /// True when this replacement only swaps one literal for another of
    /// the same category.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ReplacementKind::StringLiteral
                | ReplacementKind::NumberLiteral
                | ReplacementKind::BooleanLiteral
                | ReplacementKind::NullLiteral
        )
    }

    fn is_inverse_of(&self, other: &Replacement) -> bool {
        self.before == other.after && self.after == other.before
    }
}

impl PartialEq for Replacement {
    fn eq(&self, other: &Self) -> bool {
        self.before == other.before && self.after == other.after && self.kind == other.kind
    }
}

impl Eq for Replacement {}

impl Hash for Replacement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.before.hash(state);
        self.after.hash(state);
        self.kind.hash(state);
    }
}

/// Insertion-ordered set of replacements with idempotent insert and
/// inverse-pair cycle elimination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplacementSet {
    items: Vec<Replacement>,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a replacement. Inserting an equal replacement is a no-op.
    /// Inserting the exact inverse of a present non-aggregate replacement
    /// cancels both: the substitution round-tripped back to the original
    /// text, so neither diff is real.
    pub fn insert(&mut self, replacement: Replacement) {
        if self.items.contains(&replacement) {
            return;
        }
        if !replacement.kind.is_aggregate() {
            if let Some(pos) = self
                .items
                .iter()
                .position(|r| !r.kind.is_aggregate() && r.is_inverse_of(&replacement))
            {
                self.items.remove(pos);
                return;
            }
        }
        self.items.push(replacement);
    }

    pub fn extend(&mut self, replacements: impl IntoIterator<Item = Replacement>) {
        for replacement in replacements {
            self.insert(replacement);
        }
    }

    pub fn remove(&mut self, replacement: &Replacement) -> bool {
        if let Some(pos) = self.items.iter().position(|r| r == replacement) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn retain(&mut self, predicate: impl FnMut(&Replacement) -> bool) {
        self.items.retain(predicate);
    }

    pub fn contains(&self, replacement: &Replacement) -> bool {
        self.items.contains(replacement)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replacement> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: ReplacementKind) -> impl Iterator<Item = &Replacement> {
        self.items.iter().filter(move |r| r.kind == kind)
    }

    pub fn contains_kind(&self, kind: ReplacementKind) -> bool {
        self.items.iter().any(|r| r.kind == kind)
    }

    /// The set of kinds present, for replacement-type-subset comparison.
    pub fn kinds(&self) -> BTreeSet<ReplacementKind> {
        self.items.iter().map(|r| r.kind).collect()
    }

    /// Replacements covering (before, after) at any kind.
    pub fn covering(&self, before: &str, after: &str) -> Option<&Replacement> {
        self.items
            .iter()
            .find(|r| r.before == before && r.after == after)
    }

    /// True when every replacement is an identity composite.
    pub fn only_identity_composites(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|r| r.kind == ReplacementKind::Composite && r.is_identity())
    }
}

impl IntoIterator for ReplacementSet {
    type Item = Replacement;
    type IntoIter = std::vec::IntoIter<Replacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Replacement> for ReplacementSet {
    fn from_iter<T: IntoIterator<Item = Replacement>>(iter: T) -> Self {
        let mut set = ReplacementSet::new();
        set.extend(iter);
        set
    }
}

/// Mutable accumulator threaded through one mapping attempt.
///
/// `argumentized1` is rewritten in place as replacements are applied, so
/// each heuristic sees the residual difference left by its predecessors.
/// `argumentized2` stays fixed as the target; `original1` keeps the
/// unsubstituted source string for heuristics that need to diff against
/// the text as it was before any replacement rewrote it.
#[derive(Debug, Clone)]
pub struct ReplacementInfo {
    argumentized1: String,
    original1: String,
    argumentized2: String,
    replacements: ReplacementSet,
}

impl ReplacementInfo {
    pub fn new(argumentized1: impl Into<String>, argumentized2: impl Into<String>) -> Self {
        let argumentized1 = argumentized1.into();
        Self {
            original1: argumentized1.clone(),
            argumentized1,
            argumentized2: argumentized2.into(),
            replacements: ReplacementSet::new(),
        }
    }

    pub fn argumentized1(&self) -> &str {
        &self.argumentized1
    }

    /// The source string before any substitution was applied.
    pub fn original1(&self) -> &str {
        &self.original1
    }

    pub fn argumentized2(&self) -> &str {
        &self.argumentized2
    }

    pub fn set_argumentized1(&mut self, value: impl Into<String>) {
        self.argumentized1 = value.into();
        self.original1 = self.argumentized1.clone();
    }

    /// Residual edit distance between the rewritten source string and
    /// the target.
    pub fn raw_distance(&self) -> usize {
        text::edit_distance(&self.argumentized1, &self.argumentized2)
    }

    /// Distance that `argumentized1` would have after substituting
    /// `before` with `after`, without committing the rewrite.
    pub fn distance_after(&self, before: &str, after: &str) -> usize {
        let candidate = text::replace_token(&self.argumentized1, before, after);
        text::edit_distance(&candidate, &self.argumentized2)
    }

    /// Commits a substitution: rewrites `argumentized1` and records the
    /// replacement.
    pub fn apply(&mut self, replacement: Replacement) {
        self.argumentized1 =
            text::replace_token(&self.argumentized1, &replacement.before, &replacement.after);
        self.replacements.insert(replacement);
    }

    pub fn add_replacement(&mut self, replacement: Replacement) {
        self.replacements.insert(replacement);
    }

    pub fn add_replacements(&mut self, replacements: impl IntoIterator<Item = Replacement>) {
        self.replacements.extend(replacements);
    }

    pub fn remove_replacement(&mut self, replacement: &Replacement) -> bool {
        self.replacements.remove(replacement)
    }

    pub fn replacements(&self) -> &ReplacementSet {
        &self.replacements
    }

    pub fn replacements_mut(&mut self) -> &mut ReplacementSet {
        &mut self.replacements
    }

    pub fn into_replacements(self) -> ReplacementSet {
        self.replacements
    }

    /// Replacements of the kinds that substitute one variable for
    /// another entity, used by merge/split detection.
    pub fn variable_replacements(&self) -> Vec<&Replacement> {
        self.replacements
            .iter()
            .filter(|r| r.kind.involves_variable())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename(before: &str, after: &str) -> Replacement {
        Replacement::new(before, after, ReplacementKind::VariableName)
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = ReplacementSet::new();
        set.insert(rename("a", "b"));
        set.insert(rename("a", "b"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_inverse_insert_cancels() {
        let mut set = ReplacementSet::new();
        set.insert(rename("a", "b"));
        set.insert(rename("b", "a"));
        assert!(set.len() <= 1);
        assert!(!set.contains(&rename("a", "b")));
    }

    #[test]
    fn test_inverse_insert_keeps_aggregates() {
        let mut set = ReplacementSet::new();
        set.insert(Replacement::new("a", "b", ReplacementKind::Concatenation));
        set.insert(Replacement::new("b", "a", ReplacementKind::Concatenation));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_equality_ignores_detail() {
        let plain = Replacement::new("x", "y", ReplacementKind::SplitVariable);
        let detailed = Replacement::new("x", "y", ReplacementKind::SplitVariable).with_detail(
            ReplacementDetail::Split {
                split_variables: ["x1".to_string(), "x2".to_string()].into(),
            },
        );
        assert_eq!(plain, detailed);
    }

    #[test]
    fn test_replacement_info_apply() {
        let mut info = ReplacementInfo::new("return a + 1;", "return b + 1;");
        assert_eq!(info.raw_distance(), 1);
        info.apply(rename("a", "b"));
        assert_eq!(info.argumentized1(), "return b + 1;");
        assert_eq!(info.raw_distance(), 0);
        assert_eq!(info.replacements().len(), 1);
    }

    #[test]
    fn test_distance_after_does_not_commit() {
        let info = ReplacementInfo::new("return a;", "return b;");
        assert_eq!(info.distance_after("a", "b"), 0);
        assert_eq!(info.argumentized1(), "return a;");
        assert!(info.replacements().is_empty());
    }

    #[test]
    fn test_kinds() {
        let mut set = ReplacementSet::new();
        set.insert(rename("a", "b"));
        set.insert(Replacement::new("int", "long", ReplacementKind::Type));
        let kinds = set.kinds();
        assert!(kinds.contains(&ReplacementKind::VariableName));
        assert!(kinds.contains(&ReplacementKind::Type));
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_json_report_shape() {
        let replacement = rename("tax", "vat");
        let json = serde_json::to_value(&replacement).unwrap();
        assert_eq!(json["before"], "tax");
        assert_eq!(json["after"], "vat");
        assert_eq!(json["kind"], "variable_name");
        assert!(json.get("detail").is_none());

        let detailed = Replacement::new("x", "x1, x2", ReplacementKind::SplitVariable)
            .with_detail(ReplacementDetail::Split {
                split_variables: ["x1".to_string(), "x2".to_string()].into(),
            });
        let json = serde_json::to_value(&detailed).unwrap();
        assert_eq!(json["detail"]["detail"], "split");
        assert_eq!(json["detail"]["split_variables"][0], "x1");
    }
}
