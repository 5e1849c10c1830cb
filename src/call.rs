//! The call model: a normalized view of invocations, object creations,
//! and method/constructor references, with the equivalence predicates the
//! mapper consults when two fragments disagree on a call.
//!
//! Predicates are ordered from strict to loose. Callers try them in that
//! order; none of them mutate the call.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fragment::Location;
use crate::replacement::{Replacement, ReplacementKind, ReplacementSet};
use crate::text;

/// Parameter-name to argument-text substitutions supplied by a prior
/// signature-level diff.
pub type ParameterMap = std::collections::BTreeMap<String, String>;

/// How much of its enclosing statement a call covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// The call is a sub-expression of a larger statement.
    #[default]
    None,
    /// The call is the entire statement (`foo();`).
    Only,
    /// The statement returns the call (`return foo();`).
    Return,
    /// The statement throws the call (`throw new E();`).
    Throw,
    /// The call sits under a cast covering the statement.
    Cast,
    /// The call initializes a variable declaration.
    VariableDeclarationInitializer,
}

impl Coverage {
    /// True when the call accounts for the whole statement, under any of
    /// the recognized wrappers.
    pub fn covers_statement(&self) -> bool {
        !matches!(self, Coverage::None)
    }
}

/// The syntactic flavor of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallKind {
    Invocation,
    ObjectCreation { is_array: bool },
    MethodReference,
    ConstructorReference,
}

/// Recognized logging level method names.
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "fatal"];

/// A normalized callable use: optional receiver, name, ordered argument
/// texts.
///
/// Two calls are identical only when receiver, name, and arguments all
/// match; there is no partial identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    #[serde(flatten)]
    kind: CallKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    receiver: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    type_arguments: Vec<String>,
    #[serde(default)]
    coverage: Coverage,
    #[serde(default)]
    location: Location,
}

impl Call {
    pub fn invocation(name: impl Into<String>) -> Self {
        Self::with_kind(CallKind::Invocation, name)
    }

    pub fn creation(type_name: impl Into<String>) -> Self {
        Self::with_kind(CallKind::ObjectCreation { is_array: false }, type_name)
    }

    pub fn array_creation(type_name: impl Into<String>) -> Self {
        Self::with_kind(CallKind::ObjectCreation { is_array: true }, type_name)
    }

    pub fn method_reference(name: impl Into<String>) -> Self {
        Self::with_kind(CallKind::MethodReference, name)
    }

    pub fn constructor_reference(type_name: impl Into<String>) -> Self {
        Self::with_kind(CallKind::ConstructorReference, type_name)
    }

    fn with_kind(kind: CallKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            receiver: None,
            name: name.into(),
            arguments: Vec::new(),
            type_arguments: Vec::new(),
            coverage: Coverage::None,
            location: Location::default(),
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    pub fn with_type_argument(mut self, type_argument: impl Into<String>) -> Self {
        self.type_arguments.push(type_argument.into());
        self
    }

    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Reconstructs the call as source text, used for normalized
    /// comparison of covering calls.
    pub fn actual_string(&self) -> String {
        let args = self.arguments.join(",");
        match self.kind {
            CallKind::Invocation => match &self.receiver {
                Some(receiver) => format!("{}.{}({})", receiver, self.name, args),
                None => format!("{}({})", self.name, args),
            },
            CallKind::ObjectCreation { is_array: false } => format!("new {}({})", self.name, args),
            CallKind::ObjectCreation { is_array: true } => format!("new {}[{}]", self.name, args),
            CallKind::MethodReference | CallKind::ConstructorReference => match &self.receiver {
                Some(receiver) => format!("{}::{}", receiver, self.name),
                None => format!("::{}", self.name),
            },
        }
    }

    /// Name equality is kind-aware: an invocation never shares a name
    /// with a creation even when the strings coincide.
    pub fn identical_name(&self, other: &Call) -> bool {
        self.same_kind_category(other) && self.name == other.name
    }

    fn same_kind_category(&self, other: &Call) -> bool {
        matches!(
            (self.kind, other.kind),
            (CallKind::Invocation, CallKind::Invocation)
                | (CallKind::ObjectCreation { .. }, CallKind::ObjectCreation { .. })
                | (CallKind::MethodReference, CallKind::MethodReference)
                | (CallKind::ConstructorReference, CallKind::ConstructorReference)
        )
    }

    /// Edit distance over lower-cased names, normalized by the longer
    /// name, in [0, 1].
    pub fn normalized_name_distance(&self, other: &Call) -> f64 {
        text::normalized_distance(&self.name.to_lowercase(), &other.name.to_lowercase())
    }

    /// Receivers equal, both absent, or one a `this.`-prefixed extension
    /// of the other.
    pub fn identical_expression(&self, other: &Call) -> bool {
        match (&self.receiver, &other.receiver) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a == b || *a == format!("this.{b}") || *b == format!("this.{a}")
            }
            _ => false,
        }
    }

    /// Receiver equality after consulting the active replacement set and
    /// the parameter→argument map. A receiver change is accepted when a
    /// recorded replacement rewrites one receiver into the other, or when
    /// a method-invocation replacement with intersecting arguments covers
    /// the receivers.
    pub fn identical_expression_with_replacements(
        &self,
        other: &Call,
        replacements: &ReplacementSet,
        parameter_map: &ParameterMap,
    ) -> bool {
        if self.identical_expression(other) {
            return true;
        }
        let (Some(receiver1), Some(receiver2)) = (&self.receiver, &other.receiver) else {
            return false;
        };
        if parameter_map.get(receiver1) == Some(receiver2) {
            return true;
        }
        for replacement in replacements.iter() {
            if !replacement.kind.justifies_receiver_change() {
                continue;
            }
            if &replacement.before == receiver1 && &replacement.after == receiver2 {
                return true;
            }
            let rewritten = text::replace_token(receiver1, &replacement.before, &replacement.after);
            if &rewritten == receiver2 {
                return true;
            }
            if replacement.kind == ReplacementKind::MethodInvocation
                && receiver1.starts_with(&replacement.before)
                && receiver2.starts_with(&replacement.after)
            {
                return true;
            }
        }
        false
    }

    pub fn equal_arguments(&self, other: &Call) -> bool {
        self.arguments == other.arguments
    }

    /// Same argument multiset in a different order; single-argument lists
    /// cannot reorder.
    pub fn reordered_arguments(&self, other: &Call) -> bool {
        self.arguments.len() == other.arguments.len()
            && self.arguments.len() > 1
            && self.arguments != other.arguments
            && text::multiset_intersection_size(&self.arguments, &other.arguments)
                == self.arguments.len()
    }

    /// Element-wise equality allowing one registered replacement per
    /// differing position.
    pub fn equal_arguments_with_replacements(
        &self,
        other: &Call,
        replacements: &ReplacementSet,
    ) -> bool {
        if self.arguments.len() != other.arguments.len() {
            return false;
        }
        self.arguments
            .iter()
            .zip(other.arguments.iter())
            .all(|(a, b)| a == b || replacements.covering(a, b).is_some())
    }

    /// Element-wise equality where differing positions must pass the
    /// concatenation token-intersection threshold.
    pub fn identical_or_concatenated_arguments(&self, other: &Call) -> bool {
        if self.arguments.len() != other.arguments.len() {
            return false;
        }
        self.arguments.iter().zip(other.arguments.iter()).all(|(a, b)| {
            a == b || concatenated_match(a, b)
        })
    }

    /// Element-wise equality modulo one layer of parentheses.
    pub fn identical_or_wrapped_arguments(&self, other: &Call) -> bool {
        if self.arguments.len() != other.arguments.len() {
            return false;
        }
        self.arguments
            .iter()
            .zip(other.arguments.iter())
            .all(|(a, b)| text::strip_parentheses(a) == text::strip_parentheses(b))
    }

    /// Same argument count where every differing position is a pair of
    /// string literals.
    pub fn equal_arguments_except_for_string_literals(&self, other: &Call) -> bool {
        if self.arguments.len() != other.arguments.len() || self.arguments == other.arguments {
            return false;
        }
        self.arguments.iter().zip(other.arguments.iter()).all(|(a, b)| {
            a == b || (is_string_literal(a) && is_string_literal(b))
        })
    }

    /// Every differing argument position is covered by some recorded
    /// replacement.
    pub fn all_arguments_replaced(&self, other: &Call, replacements: &ReplacementSet) -> bool {
        if self.arguments.len() != other.arguments.len() {
            return false;
        }
        let differing: Vec<_> = self
            .arguments
            .iter()
            .zip(other.arguments.iter())
            .filter(|(a, b)| a != b)
            .collect();
        !differing.is_empty()
            && differing
                .iter()
                .all(|(a, b)| replacements.covering(a, b).is_some())
    }

    /// Set intersection of the two argument lists. Symmetric by
    /// construction.
    pub fn argument_intersection(&self, other: &Call) -> BTreeSet<String> {
        let set1: BTreeSet<&String> = self.arguments.iter().collect();
        let set2: BTreeSet<&String> = other.arguments.iter().collect();
        set1.intersection(&set2).map(|s| s.to_string()).collect()
    }

    /// Intersection size boosted by parameter→argument substitutions and
    /// literal replacements that link otherwise-different arguments.
    pub fn argument_intersection_size(
        &self,
        other: &Call,
        replacements: &ReplacementSet,
        parameter_map: &ParameterMap,
    ) -> usize {
        let intersection = self.argument_intersection(other);
        let mut size = intersection.len();
        for argument1 in &self.arguments {
            if intersection.contains(argument1) {
                continue;
            }
            let substituted = parameter_map.get(argument1);
            for argument2 in &other.arguments {
                if intersection.contains(argument2) {
                    continue;
                }
                if substituted == Some(argument2) {
                    size += 1;
                    break;
                }
                if replacements
                    .covering(argument1, argument2)
                    .is_some_and(Replacement::is_literal)
                {
                    size += 1;
                    break;
                }
            }
        }
        size
    }

    /// Loose same-call test for rename detection: camel-case tokens of
    /// the two names intersect enough to cover the smaller token set, or
    /// two logging calls share at least half their message words.
    pub fn compatible_name(&self, other: &Call) -> bool {
        let tokens1 = text::camel_case_tokens(&self.name);
        let tokens2 = text::camel_case_tokens(&other.name);
        let set1: BTreeSet<String> = tokens1.iter().map(|t| t.to_lowercase()).collect();
        let set2: BTreeSet<String> = tokens2.iter().map(|t| t.to_lowercase()).collect();
        let intersection = set1.intersection(&set2).count();
        let min = std::cmp::min(set1.len(), set2.len());
        if min > 0 && intersection == min {
            return true;
        }
        self.compatible_log_invocation(other)
    }

    /// Logging calls rarely share argument text, but the message intent
    /// often survives a rewording. Two log calls are compatible when the
    /// single string arguments share at least half of the longer word
    /// list, tolerating `-ing` suffix variants.
    fn compatible_log_invocation(&self, other: &Call) -> bool {
        if !self.is_log_call() || !other.is_log_call() {
            return false;
        }
        let (Some(message1), Some(message2)) = (
            self.single_string_argument(),
            other.single_string_argument(),
        ) else {
            return false;
        };
        let words1 = text::extract_words(message1);
        let words2 = text::extract_words(message2);
        let max_words = std::cmp::max(words1.len(), words2.len());
        if max_words == 0 {
            return false;
        }
        let mut shared = 0;
        let mut remaining: Vec<&String> = words2.iter().collect();
        for word1 in &words1 {
            if let Some(pos) = remaining.iter().position(|word2| words_match(word1, word2)) {
                remaining.remove(pos);
                shared += 1;
            }
        }
        shared * 2 >= max_words
    }

    fn single_string_argument(&self) -> Option<&str> {
        self.arguments
            .iter()
            .find(|a| is_string_literal(a))
            .map(String::as_str)
    }

    /// True for `logger.debug(...)`-shaped calls: a logging-level method
    /// name on a log-ish receiver, or a bare `log(...)` invocation.
    pub fn is_log_call(&self) -> bool {
        if !matches!(self.kind, CallKind::Invocation) {
            return false;
        }
        if self.name == "log" {
            return true;
        }
        LOG_LEVELS.contains(&self.name.as_str())
            && self
                .receiver
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains("log"))
    }

    /// True for `logger.isDebugEnabled()`-shaped guard calls.
    pub fn is_log_guard(&self) -> bool {
        matches!(self.kind, CallKind::Invocation)
            && self.name.starts_with("is")
            && self.name.ends_with("Enabled")
            && self.name.len() > "isEnabled".len()
            && self
                .receiver
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains("log"))
    }

    /// True when this guard protects `call`: `logger.isDebugEnabled()`
    /// guards `logger.debug(...)`, matched on receiver and level.
    pub fn guards_log_call(&self, call: &Call) -> bool {
        if !self.is_log_guard() || !call.is_log_call() {
            return false;
        }
        if self.receiver != call.receiver {
            return false;
        }
        let level = self.name["is".len()..self.name.len() - "Enabled".len()].to_lowercase();
        level == call.name.to_lowercase() || call.name == "log"
    }

    /// Full identity: receiver, name, and arguments all match, the
    /// receiver possibly via a recorded replacement, the arguments
    /// possibly element-wise via recorded replacements.
    pub fn identical(
        &self,
        other: &Call,
        replacements: &ReplacementSet,
        parameter_map: &ParameterMap,
    ) -> bool {
        self.identical_expression_with_replacements(other, replacements, parameter_map)
            && self.identical_name(other)
            && (self.equal_arguments(other)
                || self.equal_arguments_with_replacements(other, replacements))
    }

    /// Renamed call on the same receiver with identical arguments.
    pub fn renamed_with_identical_arguments(&self, other: &Call, distance_threshold: f64) -> bool {
        !self.identical_name(other)
            && self.same_kind_category(other)
            && (self.compatible_name(other)
                || self.normalized_name_distance(other) <= distance_threshold)
            && self.identical_expression(other)
            && self.equal_arguments(other)
    }

    /// Renamed call with no receiver on either side where at least half
    /// the larger argument list is shared.
    pub fn renamed_with_argument_intersection(
        &self,
        other: &Call,
        replacements: &ReplacementSet,
        parameter_map: &ParameterMap,
    ) -> bool {
        if self.identical_name(other) || !self.same_kind_category(other) {
            return false;
        }
        if self.receiver.is_some() || other.receiver.is_some() {
            return false;
        }
        if !self.compatible_name(other) {
            return false;
        }
        let max_arguments = std::cmp::max(self.arguments.len(), other.arguments.len());
        max_arguments > 0
            && self.argument_intersection_size(other, replacements, parameter_map) * 2
                >= max_arguments
    }

    /// The receiver of one call shows up among the arguments of the
    /// other, with at least two shared name tokens. Catches
    /// `x.process(y)` rewritten as `process(x, y)`.
    pub fn expression_became_argument(&self, other: &Call) -> bool {
        let moved = match (&self.receiver, &other.receiver) {
            (Some(receiver), _) if other.arguments.contains(receiver) => true,
            (_, Some(receiver)) if self.arguments.contains(receiver) => true,
            _ => false,
        };
        if !moved {
            return false;
        }
        let tokens1: BTreeSet<String> = text::camel_case_tokens(&self.name)
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        let tokens2: BTreeSet<String> = text::camel_case_tokens(&other.name)
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        tokens1.intersection(&tokens2).count() >= 2
    }

    /// Same name, different argument count, non-empty shared argument
    /// set: the call absorbed or shed arguments.
    pub fn collapsed_or_expanded_arguments(&self, other: &Call) -> bool {
        self.identical_name(other)
            && self.arguments.len() != other.arguments.len()
            && !self.argument_intersection(other).is_empty()
    }

    /// Same receiver and name while several arguments of this call were
    /// merged into a single argument of `other`, as witnessed by rename
    /// replacements that all target the same new name. Returns the merged
    /// source variables and the merge target.
    pub fn merged_arguments(
        &self,
        other: &Call,
        replacements: &ReplacementSet,
    ) -> Option<(BTreeSet<String>, String)> {
        if !self.identical_expression(other) || !self.identical_name(other) {
            return None;
        }
        if self.arguments.len() <= other.arguments.len() {
            return None;
        }
        for argument2 in &other.arguments {
            let merged: BTreeSet<String> = replacements
                .of_kind(ReplacementKind::VariableName)
                .filter(|r| &r.after == argument2 && self.arguments.contains(&r.before))
                .map(|r| r.before.clone())
                .collect();
            if merged.len() >= 2 {
                let residual1: Vec<&String> = self
                    .arguments
                    .iter()
                    .filter(|a| !merged.contains(*a))
                    .collect();
                let residual2: Vec<&String> = other
                    .arguments
                    .iter()
                    .filter(|a| *a != argument2)
                    .collect();
                if residual1 == residual2 {
                    return Some((merged, argument2.clone()));
                }
            }
        }
        None
    }

    /// Same name and arguments with a receiver added, removed, or
    /// renamed. The textual check mirrors re-inserting one receiver into
    /// the other call string.
    pub fn only_different_invoker(&self, other: &Call) -> bool {
        self.identical_name(other)
            && self.equal_arguments(other)
            && self.receiver != other.receiver
    }

    /// Builds the argument-position replacement implied by a bare call on
    /// one side and a return/assignment/expression statement wrapping the
    /// call's single argument on the other.
    pub fn argument_wrapping_replacement(&self, statement: &str) -> Option<Replacement> {
        if self.arguments.len() != 1 {
            return None;
        }
        let argument = text::strip_parentheses(&self.arguments[0]);
        let trimmed = statement.trim().trim_end_matches(';').trim();

        if let Some(returned) = trimmed.strip_prefix("return ") {
            if text::strip_parentheses(returned) == argument {
                return Some(Replacement::new(
                    argument,
                    returned.trim(),
                    ReplacementKind::ArgumentReplacedWithReturnExpression,
                ));
            }
            return None;
        }
        if let Some(eq) = find_top_level_assignment(trimmed) {
            let rhs = trimmed[eq + 1..].trim();
            if text::strip_parentheses(rhs) == argument {
                return Some(Replacement::new(
                    argument,
                    rhs,
                    ReplacementKind::ArgumentReplacedWithExpression,
                ));
            }
            return None;
        }
        if text::strip_parentheses(trimmed) == argument {
            return Some(Replacement::new(
                argument,
                trimmed,
                ReplacementKind::ArgumentReplacedWithStatement,
            ));
        }
        None
    }
}

/// Position of a top-level `=` that is an assignment, not a comparison.
fn find_top_level_assignment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b'=' if depth == 0 => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let next = bytes.get(i + 1);
                let comparison = matches!(prev, Some(b'=') | Some(b'!') | Some(b'<') | Some(b'>'))
                    || next == Some(&b'=');
                if !comparison {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_string_literal(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Token-multiset comparison of two concatenation expressions: accept
/// when the intersection outnumbers the tokens left unmatched on the
/// bigger side.
pub fn concatenated_match(expression1: &str, expression2: &str) -> bool {
    let tokens1 = text::concat_tokens(expression1);
    let tokens2 = text::concat_tokens(expression2);
    let intersection = text::multiset_intersection_size(&tokens1, &tokens2);
    let threshold = std::cmp::max(tokens1.len(), tokens2.len()) - intersection;
    (intersection > 0 && intersection > threshold)
        || (intersection > 1 && intersection >= threshold)
}

/// Matches two free-text words, treating an `-ing` suffix variant as the
/// same word (`delete` vs `deleting`).
fn words_match(word1: &str, word2: &str) -> bool {
    if word1 == word2 {
        return true;
    }
    let stem1 = word1.strip_suffix("ing").unwrap_or(word1);
    let stem2 = word2.strip_suffix("ing").unwrap_or(word2);
    stem1.len() >= 3 && (stem1 == stem2 || stem1.strip_suffix('e') == Some(stem2) || stem2.strip_suffix('e') == Some(stem1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_expression_with_this_prefix() {
        let call1 = Call::invocation("add").with_receiver("this.items");
        let call2 = Call::invocation("add").with_receiver("items");
        assert!(call1.identical_expression(&call2));
        assert!(call2.identical_expression(&call1));
    }

    #[test]
    fn test_identical_name_is_kind_aware() {
        let invocation = Call::invocation("File");
        let creation = Call::creation("File");
        assert!(!invocation.identical_name(&creation));
    }

    #[test]
    fn test_compatible_name_shared_tokens() {
        let call1 = Call::invocation("getName").with_receiver("obj");
        let call2 = Call::invocation("getFullName").with_receiver("obj");
        assert!(call1.compatible_name(&call2));
    }

    #[test]
    fn test_compatible_name_rejects_disjoint() {
        let call1 = Call::invocation("open");
        let call2 = Call::invocation("close");
        assert!(!call1.compatible_name(&call2));
    }

    #[test]
    fn test_compatible_log_invocation() {
        let call1 = Call::invocation("debug")
            .with_receiver("logger")
            .with_argument("\"deleting stale entry\"");
        let call2 = Call::invocation("info")
            .with_receiver("log")
            .with_argument("\"deleting entry\"");
        assert!(call1.compatible_name(&call2));
    }

    #[test]
    fn test_reordered_arguments() {
        let call1 = Call::invocation("put").with_arguments(["key", "value"]);
        let call2 = Call::invocation("put").with_arguments(["value", "key"]);
        assert!(call1.reordered_arguments(&call2));

        let single1 = Call::invocation("f").with_argument("x");
        let single2 = Call::invocation("f").with_argument("x");
        assert!(!single1.reordered_arguments(&single2));
    }

    #[test]
    fn test_argument_intersection_is_symmetric() {
        let call1 = Call::invocation("f").with_arguments(["a", "b", "c"]);
        let call2 = Call::invocation("g").with_arguments(["c", "a", "d"]);
        assert_eq!(
            call1.argument_intersection(&call2),
            call2.argument_intersection(&call1)
        );
    }

    #[test]
    fn test_all_arguments_replaced() {
        let call1 = Call::invocation("f").with_arguments(["a", "x"]);
        let call2 = Call::invocation("f").with_arguments(["b", "x"]);
        let mut replacements = ReplacementSet::new();
        replacements.insert(Replacement::new("a", "b", ReplacementKind::VariableName));
        assert!(call1.all_arguments_replaced(&call2, &replacements));
    }

    #[test]
    fn test_concatenated_match_threshold() {
        // 2 shared of 3 tokens: intersection 2 > max(3,3) - 2 = 1.
        assert!(concatenated_match("\"a\" + \"b\" + x", "\"a\" + \"b\" + y"));
        // 1 shared of 2: intersection 1 is not > 2 - 1 = 1, and not > 1 either.
        assert!(!concatenated_match("\"a\" + x", "\"a\" + y + z"));
    }

    #[test]
    fn test_merged_arguments() {
        let call1 = Call::invocation("process").with_arguments(["first", "second", "rest"]);
        let call2 = Call::invocation("process").with_arguments(["combined", "rest"]);
        let mut replacements = ReplacementSet::new();
        replacements.insert(Replacement::new(
            "first",
            "combined",
            ReplacementKind::VariableName,
        ));
        replacements.insert(Replacement::new(
            "second",
            "combined",
            ReplacementKind::VariableName,
        ));
        let (merged, target) = call1
            .merged_arguments(&call2, &replacements)
            .expect("expected merge");
        assert_eq!(target, "combined");
        assert!(merged.contains("first") && merged.contains("second"));
    }

    #[test]
    fn test_argument_wrapping_replacement_return() {
        let call = Call::invocation("execute")
            .with_argument("query")
            .with_coverage(Coverage::Only);
        let replacement = call
            .argument_wrapping_replacement("return query;")
            .expect("expected replacement");
        assert_eq!(
            replacement.kind,
            ReplacementKind::ArgumentReplacedWithReturnExpression
        );
    }

    #[test]
    fn test_argument_wrapping_replacement_assignment() {
        let call = Call::invocation("execute").with_argument("query");
        let replacement = call
            .argument_wrapping_replacement("result = query;")
            .expect("expected replacement");
        assert_eq!(
            replacement.kind,
            ReplacementKind::ArgumentReplacedWithExpression
        );
    }

    #[test]
    fn test_is_log_guard() {
        let guard = Call::invocation("isDebugEnabled").with_receiver("LOG");
        assert!(guard.is_log_guard());
        let not_guard = Call::invocation("isEnabled").with_receiver("LOG");
        assert!(!not_guard.is_log_guard());
    }

    #[test]
    fn test_guard_matches_its_log_call() {
        let guard = Call::invocation("isDebugEnabled").with_receiver("logger");
        let guarded = Call::invocation("debug")
            .with_receiver("logger")
            .with_argument("\"entering loop\"");
        assert!(guard.guards_log_call(&guarded));

        let other_level = Call::invocation("warn")
            .with_receiver("logger")
            .with_argument("\"entering loop\"");
        assert!(!guard.guards_log_call(&other_level));

        let other_receiver = Call::invocation("debug")
            .with_receiver("auditLog")
            .with_argument("\"entering loop\"");
        assert!(!guard.guards_log_call(&other_receiver));
    }

    #[test]
    fn test_bare_log_invocation_is_log_call() {
        assert!(Call::invocation("log").is_log_call());
        assert!(!Call::invocation("record").is_log_call());
    }
}
