//! Argument-cardinality heuristics: swapped, split, added, and merged
//! arguments between two otherwise-equal fragments.
//!
//! These run late in the chain on purpose: they consume rename
//! replacements recorded by the element-level inference pass.

use std::collections::BTreeSet;

use super::MatchContext;
use super::prefix_suffix::diff_middles;
use crate::replacement::{
    Replacement, ReplacementDetail, ReplacementInfo, ReplacementKind,
};
use crate::text;

/// Strips the commas and whitespace a raw diff middle picks up from the
/// surrounding argument list.
fn clean_argument_span(span: &str) -> String {
    span.trim().trim_matches(',').trim().to_string()
}

/// Detects argument additions on the after side: two transposed
/// arguments, one argument split into several new names, or extra
/// arguments appended. All new names must be parameters, attributes, or
/// known locals of the after-side container.
pub fn equal_after_new_argument_additions(
    info: &mut ReplacementInfo,
    context: &MatchContext,
) -> bool {
    let (middle1, middle2) = diff_middles(info.argumentized1(), info.argumentized2());
    let span1 = clean_argument_span(&middle1);
    let span2 = clean_argument_span(&middle2);
    if span2.is_empty() || span1 == span2 {
        return false;
    }
    let arguments1 = text::split_arguments(&span1);
    let arguments2 = text::split_arguments(&span2);

    // Transposed pair.
    if arguments1.len() == 2
        && arguments2.len() == 2
        && arguments1[0] == arguments2[1]
        && arguments1[1] == arguments2[0]
    {
        info.add_replacement(Replacement::new(
            span1,
            span2,
            ReplacementKind::SwapArgument,
        ));
        return true;
    }

    // One argument split into several new names, witnessed by a rename
    // already recorded against one of them. The rename has usually been
    // applied to the source string by the inference pass, so the split
    // is diffed against the unsubstituted original.
    let (unapplied1, unapplied2) = diff_middles(info.original1(), info.argumentized2());
    let original_span1 = clean_argument_span(&unapplied1);
    let original_span2 = clean_argument_span(&unapplied2);
    let original_arguments1 = text::split_arguments(&original_span1);
    let original_arguments2 = text::split_arguments(&original_span2);
    if original_arguments1.len() == 1 && original_arguments2.len() >= 2 {
        let original = &original_arguments1[0];
        let rename = info
            .replacements()
            .of_kind(ReplacementKind::VariableName)
            .find(|r| &r.before == original && original_arguments2.contains(&r.after))
            .cloned();
        if let Some(rename) = rename {
            if original_arguments2.iter().all(|a| context.known_name_after(a)) {
                let split_variables: BTreeSet<String> =
                    original_arguments2.iter().cloned().collect();
                info.remove_replacement(&rename);
                info.add_replacement(
                    Replacement::new(original, original_span2, ReplacementKind::SplitVariable)
                        .with_detail(ReplacementDetail::Split { split_variables }),
                );
                return true;
            }
        }
    }

    // Pure insertion of known names.
    if span1.is_empty() && !arguments2.is_empty() {
        if arguments2.iter().all(|a| context.known_name_after(a)) {
            let added_variables: BTreeSet<String> = arguments2.iter().cloned().collect();
            info.add_replacement(
                Replacement::new(span1, span2, ReplacementKind::AddVariable)
                    .with_detail(ReplacementDetail::Add { added_variables }),
            );
            return true;
        }
    }

    false
}

/// The complementary direction: several before-side arguments collapsed
/// into one. Consumes the rename replacements pointing at the merge
/// target and bundles them into a single merge record.
pub fn equal_after_argument_merge(info: &mut ReplacementInfo) -> bool {
    let (middle1, middle2) = diff_middles(info.argumentized1(), info.argumentized2());
    let span1 = clean_argument_span(&middle1);
    let span2 = clean_argument_span(&middle2);
    if span1.is_empty() || span2.is_empty() || span1 == span2 {
        return false;
    }
    let arguments1 = text::split_arguments(&span1);
    let arguments2 = text::split_arguments(&span2);
    if arguments1.len() < 2 || arguments2.len() != 1 {
        return false;
    }
    let target = &arguments2[0];
    let consumed: Vec<Replacement> = info
        .replacements()
        .of_kind(ReplacementKind::VariableName)
        .filter(|r| &r.after == target && arguments1.contains(&r.before))
        .cloned()
        .collect();
    if consumed.len() < 2 {
        return false;
    }
    let merged_variables: BTreeSet<String> =
        consumed.iter().map(|r| r.before.clone()).collect();
    if !arguments1.iter().all(|a| merged_variables.contains(a)) {
        return false;
    }
    for replacement in &consumed {
        info.remove_replacement(replacement);
    }
    info.add_replacement(
        Replacement::new(span1, target, ReplacementKind::MergeVariable)
            .with_detail(ReplacementDetail::Merge { merged_variables }),
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Container, Location, Parameter, VariableDeclaration};

    fn containers() -> (Container, Container) {
        let before = Container::new("process", "Service").with_parameter(Parameter::new("x", "int"));
        let after = Container::new("process", "Service")
            .with_parameter(Parameter::new("x1", "int"))
            .with_parameter(Parameter::new("x2", "int"))
            .with_parameter(Parameter::new("y", "int"))
            .with_declaration(VariableDeclaration::new("local", Location::default()));
        (before, after)
    }

    #[test]
    fn test_argument_swap() {
        let (before, after) = containers();
        let context = MatchContext::new(&before, &after);
        let mut info = ReplacementInfo::new("put(key, value);", "put(value, key);");
        assert!(equal_after_new_argument_additions(&mut info, &context));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::SwapArgument));
    }

    #[test]
    fn test_argument_split_consumes_rename() {
        let (before, after) = containers();
        let context = MatchContext::new(&before, &after);
        let mut info = ReplacementInfo::new("f(x);", "f(x1, x2);");
        info.add_replacement(Replacement::new("x", "x1", ReplacementKind::VariableName));

        assert!(equal_after_new_argument_additions(&mut info, &context));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::SplitVariable));
        assert!(!info
            .replacements()
            .contains_kind(ReplacementKind::VariableName));
        let split = info
            .replacements()
            .of_kind(ReplacementKind::SplitVariable)
            .next()
            .unwrap();
        match &split.detail {
            Some(ReplacementDetail::Split { split_variables }) => {
                assert!(split_variables.contains("x1") && split_variables.contains("x2"));
            }
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn test_argument_split_requires_known_names() {
        let (before, after) = containers();
        let context = MatchContext::new(&before, &after);
        let mut info = ReplacementInfo::new("f(x);", "f(x1, unknown);");
        info.add_replacement(Replacement::new("x", "x1", ReplacementKind::VariableName));
        assert!(!equal_after_new_argument_additions(&mut info, &context));
    }

    #[test]
    fn test_argument_addition() {
        let (before, after) = containers();
        let context = MatchContext::new(&before, &after);
        let mut info = ReplacementInfo::new("f(a);", "f(a, y);");
        assert!(equal_after_new_argument_additions(&mut info, &context));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::AddVariable));
    }

    #[test]
    fn test_argument_merge_bundles_renames() {
        let mut info = ReplacementInfo::new("f(first, second);", "f(combined);");
        info.add_replacement(Replacement::new(
            "first",
            "combined",
            ReplacementKind::VariableName,
        ));
        info.add_replacement(Replacement::new(
            "second",
            "combined",
            ReplacementKind::VariableName,
        ));

        assert!(equal_after_argument_merge(&mut info));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::MergeVariable));
        assert!(!info
            .replacements()
            .contains_kind(ReplacementKind::VariableName));
    }

    #[test]
    fn test_argument_merge_needs_two_renames() {
        let mut info = ReplacementInfo::new("f(first, second);", "f(combined);");
        info.add_replacement(Replacement::new(
            "first",
            "combined",
            ReplacementKind::VariableName,
        ));
        assert!(!equal_after_argument_merge(&mut info));
    }
}
