//! Inferred refactorings: higher-level edits detected as a byproduct of
//! fragment matching, deduplicated across the mappings that justify them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fragment::{Location, VariableDeclaration};

/// The refactoring taxonomy this engine can infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefactoringKind {
    ExtractVariable,
    InlineVariable,
    InvertCondition,
    SplitConditional,
    MergeConditional,
}

impl RefactoringKind {
    pub fn name(&self) -> &'static str {
        match self {
            RefactoringKind::ExtractVariable => "Extract Variable",
            RefactoringKind::InlineVariable => "Inline Variable",
            RefactoringKind::InvertCondition => "Invert Condition",
            RefactoringKind::SplitConditional => "Split Conditional",
            RefactoringKind::MergeConditional => "Merge Conditional",
        }
    }
}

/// Non-owning reference to the mapping that justified a refactoring.
/// The two locations identify the fragment pair uniquely within one
/// method-body comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MappingId {
    pub location1: Location,
    pub location2: Location,
}

impl MappingId {
    pub fn new(location1: Location, location2: Location) -> Self {
        Self {
            location1,
            location2,
        }
    }

    /// True when the two ids touch at least one common fragment on
    /// either side.
    pub fn overlaps(&self, other: &MappingId) -> bool {
        self.location1 == other.location1 || self.location2 == other.location2
    }
}

/// A sub-expression alignment attached to an extract/inline record: one
/// occurrence in the matched fragment paired with the piece of the
/// declaration initializer it corresponds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubExpressionMapping {
    pub before: String,
    pub after: String,
}

impl SubExpressionMapping {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// An inferred refactoring with back-references to its justifying
/// mappings.
///
/// Structural equality (and therefore deduplication) covers the kind,
/// the declaration, and the before/after condition lists; references and
/// sub-expression mappings merge when duplicates meet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refactoring {
    pub kind: RefactoringKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<VariableDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub references: BTreeSet<MappingId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_expression_mappings: Vec<SubExpressionMapping>,
}

impl Refactoring {
    pub fn extract_variable(declaration: VariableDeclaration, reference: MappingId) -> Self {
        Self {
            kind: RefactoringKind::ExtractVariable,
            variable: Some(declaration),
            before: Vec::new(),
            after: Vec::new(),
            references: BTreeSet::from([reference]),
            sub_expression_mappings: Vec::new(),
        }
    }

    pub fn inline_variable(declaration: VariableDeclaration, reference: MappingId) -> Self {
        Self {
            kind: RefactoringKind::InlineVariable,
            variable: Some(declaration),
            before: Vec::new(),
            after: Vec::new(),
            references: BTreeSet::from([reference]),
            sub_expression_mappings: Vec::new(),
        }
    }

    pub fn invert_condition(
        before: impl Into<String>,
        after: impl Into<String>,
        reference: MappingId,
    ) -> Self {
        Self {
            kind: RefactoringKind::InvertCondition,
            variable: None,
            before: vec![before.into()],
            after: vec![after.into()],
            references: BTreeSet::from([reference]),
            sub_expression_mappings: Vec::new(),
        }
    }

    pub fn split_conditional(
        before: impl Into<String>,
        after: Vec<String>,
        reference: MappingId,
    ) -> Self {
        Self {
            kind: RefactoringKind::SplitConditional,
            variable: None,
            before: vec![before.into()],
            after,
            references: BTreeSet::from([reference]),
            sub_expression_mappings: Vec::new(),
        }
    }

    pub fn merge_conditional(
        before: Vec<String>,
        after: impl Into<String>,
        reference: MappingId,
    ) -> Self {
        Self {
            kind: RefactoringKind::MergeConditional,
            variable: None,
            before,
            after: vec![after.into()],
            references: BTreeSet::from([reference]),
            sub_expression_mappings: Vec::new(),
        }
    }

    pub fn with_sub_expression_mapping(mut self, mapping: SubExpressionMapping) -> Self {
        self.sub_expression_mappings.push(mapping);
        self
    }

    pub fn add_reference(&mut self, reference: MappingId) {
        self.references.insert(reference);
    }

    /// Human-readable one-liner, mirroring the kind plus its subject.
    pub fn description(&self) -> String {
        match (&self.variable, self.kind) {
            (Some(declaration), RefactoringKind::ExtractVariable)
            | (Some(declaration), RefactoringKind::InlineVariable) => {
                let initializer = declaration
                    .initializer
                    .as_ref()
                    .map(|i| format!(" = {}", i.text))
                    .unwrap_or_default();
                format!("{} {}{}", self.kind.name(), declaration.name, initializer)
            }
            _ => format!(
                "{} [{}] -> [{}]",
                self.kind.name(),
                self.before.join(" | "),
                self.after.join(" | ")
            ),
        }
    }

    fn same_structure(&self, other: &Refactoring) -> bool {
        self.kind == other.kind
            && self.variable == other.variable
            && self.before == other.before
            && self.after == other.after
    }

    fn conflicts_with(&self, other: &Refactoring) -> bool {
        self.kind == other.kind
            && matches!(
                self.kind,
                RefactoringKind::SplitConditional | RefactoringKind::MergeConditional
            )
            && !self.same_structure(other)
            && self
                .references
                .iter()
                .any(|id| other.references.iter().any(|o| id.overlaps(o)))
    }
}

impl PartialEq for Refactoring {
    fn eq(&self, other: &Self) -> bool {
        self.same_structure(other)
    }
}

/// Adds a refactoring to the result list with deduplication and
/// conflict resolution.
///
/// A structurally equal record merges its references into the existing
/// one. A conflicting partitioning of the same conditionals (same kind,
/// overlapping fragments, different split) replaces the earlier record:
/// the later detection has seen more replacements and carries stronger
/// evidence.
pub fn add_refactoring(refactorings: &mut Vec<Refactoring>, new: Refactoring) {
    if let Some(existing) = refactorings.iter_mut().find(|r| r.same_structure(&new)) {
        existing.references.extend(new.references);
        for mapping in new.sub_expression_mappings {
            if !existing.sub_expression_mappings.contains(&mapping) {
                existing.sub_expression_mappings.push(mapping);
            }
        }
        return;
    }
    refactorings.retain(|existing| !existing.conflicts_with(&new));
    refactorings.push(new);
}
