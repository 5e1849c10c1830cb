//! Conditional heuristics: boolean expressions split into
//! sub-conditions and intersected with awareness of logical inversion,
//! plus the split/merge/invert refactoring records that fall out of the
//! intersection.

use crate::fragment::{CodeElementType, Fragment};
use crate::refactoring::{MappingId, Refactoring, add_refactoring};
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind};
use crate::text;

use super::prefix_suffix::expression_core;

/// How one sub-condition matched another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubConditionMatch {
    Plain,
    Inverted,
}

/// Extracts the boolean expression a fragment contributes to the
/// comparison, if any.
fn conditional_source(fragment: &Fragment, argumentized: &str) -> Option<String> {
    if let Some(condition) = fragment.condition_text() {
        return Some(condition.to_string());
    }
    if let Some(ternary) = fragment.ternaries().first() {
        return Some(ternary.condition.clone());
    }
    let core = expression_core(argumentized);
    if core.contains("&&") || core.contains("||") {
        return Some(core.to_string());
    }
    None
}

/// Normalizes a sub-condition for comparison: outer parentheses and
/// whitespace carry no meaning.
fn prepare(condition: &str) -> String {
    text::strip_parentheses(condition)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Splits a condition into prepared sub-conditions, dropping ternary
/// branches so only boolean atoms remain.
fn sub_conditions(condition: &str) -> Vec<String> {
    text::conditional_tokens(condition)
        .iter()
        .map(|t| prepare(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// The comparison operators that invert each other when the operand
/// order is preserved.
fn inverse_operator(operator: &str) -> Option<&'static str> {
    match operator {
        "==" => Some("!="),
        "!=" => Some("=="),
        "<" => Some(">="),
        ">=" => Some("<"),
        ">" => Some("<="),
        "<=" => Some(">"),
        "&&" => Some("||"),
        "||" => Some("&&"),
        _ => None,
    }
}

/// Splits a prepared comparison into (lhs, operator, rhs), scanning for
/// the first top-level comparison operator.
fn split_comparison(condition: &str) -> Option<(&str, &str, &str)> {
    let operators = ["==", "!=", "<=", ">=", "<", ">"];
    let bytes = condition.as_bytes();
    let mut depth = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            _ if depth == 0 => {
                for op in operators {
                    if condition[i..].starts_with(op) {
                        // Skip the angle brackets of generics: `a<b` with
                        // an identifier right behind `>` is ambiguous, but
                        // prepared conditions have no type arguments.
                        let lhs = &condition[..i];
                        let rhs = &condition[i + op.len()..];
                        if !lhs.is_empty() && !rhs.is_empty() {
                            return Some((lhs, op, rhs));
                        }
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// True when the two prepared sub-conditions are logical inverses: a
/// `!` prefix on either side, or the same operands under an inverting
/// comparison operator.
pub fn inverted_sub_conditions(condition1: &str, condition2: &str) -> bool {
    let negated = |plain: &str, negated: &str| {
        negated.strip_prefix('!').map(|rest| prepare(rest)) == Some(plain.to_string())
    };
    if negated(condition1, condition2) || negated(condition2, condition1) {
        return true;
    }
    if let (Some((lhs1, op1, rhs1)), Some((lhs2, op2, rhs2))) =
        (split_comparison(condition1), split_comparison(condition2))
    {
        if lhs1 == lhs2 && rhs1 == rhs2 && inverse_operator(op1) == Some(op2) {
            return true;
        }
    }
    false
}

/// True when the two sub-conditions are the same `equals` test with
/// receiver and argument swapped.
fn equals_swap(condition1: &str, condition2: &str) -> bool {
    let parse = |condition: &str| -> Option<(String, String)> {
        let open = condition.find(".equals(")?;
        let receiver = condition[..open].to_string();
        let argument = condition[open + ".equals(".len()..].strip_suffix(')')?;
        Some((receiver, argument.to_string()))
    };
    match (parse(condition1), parse(condition2)) {
        (Some((receiver1, argument1)), Some((receiver2, argument2))) => {
            receiver1 == argument2 && argument1 == receiver2
        }
        _ => false,
    }
}

fn match_sub_condition(condition1: &str, condition2: &str) -> Option<SubConditionMatch> {
    if condition1 == condition2 || equals_swap(condition1, condition2) {
        return Some(SubConditionMatch::Plain);
    }
    if inverted_sub_conditions(condition1, condition2) {
        return Some(SubConditionMatch::Inverted);
    }
    None
}

/// The umbrella conditional heuristic.
///
/// Splits both conditions into sub-conditions, intersects them with
/// inversion awareness, and on a non-empty intersection records a
/// conditional replacement (or pure inversion replacements when every
/// sub-condition matched inverted) plus the split/merge/invert
/// refactorings implied by the enclosing if-nesting of the two sides.
pub fn common_conditional(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
    refactorings: &mut Vec<Refactoring>,
    mapping_id: MappingId,
) -> bool {
    let source1 = conditional_source(fragment1, info.argumentized1());
    let source2 = conditional_source(fragment2, info.argumentized2());
    let (Some(condition1), Some(condition2)) = (source1, source2) else {
        return boolean_return_involved(info, fragment1, fragment2);
    };
    if prepare(&condition1) == prepare(&condition2) {
        return false;
    }
    let subs1 = sub_conditions(&condition1);
    let subs2 = sub_conditions(&condition2);
    if subs1.is_empty() || subs2.is_empty() {
        return false;
    }

    let mut matched2 = vec![false; subs2.len()];
    let mut plain_pairs: Vec<(String, String)> = Vec::new();
    let mut inverted_pairs: Vec<(String, String)> = Vec::new();
    for sub1 in &subs1 {
        for (j, sub2) in subs2.iter().enumerate() {
            if matched2[j] {
                continue;
            }
            match match_sub_condition(sub1, sub2) {
                Some(SubConditionMatch::Plain) => {
                    matched2[j] = true;
                    plain_pairs.push((sub1.clone(), sub2.clone()));
                    break;
                }
                Some(SubConditionMatch::Inverted) => {
                    matched2[j] = true;
                    inverted_pairs.push((sub1.clone(), sub2.clone()));
                    break;
                }
                None => {}
            }
        }
    }
    let intersection = plain_pairs.len() + inverted_pairs.len();
    if intersection == 0 {
        return false;
    }

    for (before, after) in &inverted_pairs {
        info.add_replacement(Replacement::new(
            before.clone(),
            after.clone(),
            ReplacementKind::InvertConditional,
        ));
    }

    let fully_inverted = plain_pairs.is_empty()
        && inverted_pairs.len() == subs1.len()
        && subs1.len() == subs2.len();
    if fully_inverted {
        add_refactoring(
            refactorings,
            Refactoring::invert_condition(condition1.clone(), condition2.clone(), mapping_id),
        );
    } else {
        info.add_replacement(Replacement::new(
            condition1.clone(),
            condition2.clone(),
            ReplacementKind::Conditional,
        ));
    }

    let if_nesting1 = fragment1.enclosing_if_count()
        + usize::from(fragment1.element_type() == CodeElementType::IfStatement);
    let if_nesting2 = fragment2.enclosing_if_count()
        + usize::from(fragment2.element_type() == CodeElementType::IfStatement);
    if if_nesting2 > if_nesting1 && subs1.len() > subs2.len() {
        add_refactoring(
            refactorings,
            Refactoring::split_conditional(condition1, subs2, mapping_id),
        );
    } else if if_nesting1 > if_nesting2 && subs1.len() < subs2.len() {
        add_refactoring(
            refactorings,
            Refactoring::merge_conditional(subs1, condition2, mapping_id),
        );
    }
    true
}

/// An if-condition matched against a boolean-returning statement: the
/// rewrite collapsed a branch into a `return` of the condition value.
fn boolean_return_involved(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    let pairs = [(fragment1, fragment2, true), (fragment2, fragment1, false)];
    for (conditional, returning, forward) in pairs {
        if conditional.element_type() != CodeElementType::IfStatement {
            continue;
        }
        let Some(condition) = conditional.condition_text() else {
            continue;
        };
        if returning.element_type() == CodeElementType::ReturnStatement
            && !returning.boolean_literals().is_empty()
        {
            let core = expression_core(if forward {
                info.argumentized2()
            } else {
                info.argumentized1()
            })
            .to_string();
            let (before, after) = if forward {
                (condition.to_string(), core)
            } else {
                (core, condition.to_string())
            };
            info.add_replacement(Replacement::new(before, after, ReplacementKind::Conditional));
            return true;
        }
    }
    false
}

/// Validity gate for operator rewrites: an infix-operator replacement
/// may only pair an operator with its logical inverse, its directional
/// mirror, or its arithmetic counterpart. `<` swapped with `!=` is a
/// different predicate, not a rewrite.
pub fn contains_valid_operator_replacements(info: &ReplacementInfo) -> bool {
    info.replacements()
        .of_kind(ReplacementKind::InfixOperator)
        .all(|replacement| {
            let before = replacement.before.as_str();
            let after = replacement.after.as_str();
            inverse_operator(before) == Some(after)
                || matches!(
                    (before, after),
                    ("<", ">") | (">", "<") | ("<=", ">=") | (">=", "<=")
                        | ("+", "-") | ("-", "+") | ("*", "/") | ("/", "*")
                )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Location, ParentNode};
    use crate::refactoring::RefactoringKind;

    fn mapping_id() -> MappingId {
        MappingId::new(Location::new(1, 1, 0, 10), Location::new(1, 1, 0, 10))
    }

    fn if_fragment(text: &str) -> Fragment {
        Fragment::new(text, CodeElementType::IfStatement, Location::default())
    }

    #[test]
    fn test_inverted_equality_condition() {
        let fragment1 = if_fragment("if(a == b)");
        let fragment2 = if_fragment("if(a != b)");
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        let mut refactorings = Vec::new();

        assert!(common_conditional(
            &mut info,
            &fragment1,
            &fragment2,
            &mut refactorings,
            mapping_id()
        ));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::InvertConditional));
        assert!(!info
            .replacements()
            .contains_kind(ReplacementKind::Conditional));
        assert_eq!(refactorings.len(), 1);
        assert_eq!(refactorings[0].kind, RefactoringKind::InvertCondition);
    }

    #[test]
    fn test_negation_prefix_inversion() {
        assert!(inverted_sub_conditions("isValid(x)", "!isValid(x)"));
        assert!(inverted_sub_conditions("a<b", "a>=b"));
        assert!(!inverted_sub_conditions("a<b", "a!=b"));
    }

    #[test]
    fn test_partial_intersection_records_conditional() {
        let fragment1 = if_fragment("if(a == b && c > 0)");
        let fragment2 = if_fragment("if(a == b && d.isReady())");
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        let mut refactorings = Vec::new();

        assert!(common_conditional(
            &mut info,
            &fragment1,
            &fragment2,
            &mut refactorings,
            mapping_id()
        ));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::Conditional));
        assert!(refactorings.is_empty());
    }

    #[test]
    fn test_split_conditional_detected() {
        let fragment1 = if_fragment("if(a && b)");
        let fragment2 = if_fragment("if(a)")
            .with_parent(ParentNode::new("if(b)", CodeElementType::IfStatement));
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        let mut refactorings = Vec::new();

        assert!(common_conditional(
            &mut info,
            &fragment1,
            &fragment2,
            &mut refactorings,
            mapping_id()
        ));
        assert!(refactorings
            .iter()
            .any(|r| r.kind == RefactoringKind::SplitConditional));
    }

    #[test]
    fn test_merge_conditional_detected() {
        let fragment1 = if_fragment("if(a)")
            .with_parent(ParentNode::new("if(b)", CodeElementType::IfStatement));
        let fragment2 = if_fragment("if(a && b)");
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        let mut refactorings = Vec::new();

        assert!(common_conditional(
            &mut info,
            &fragment1,
            &fragment2,
            &mut refactorings,
            mapping_id()
        ));
        assert!(refactorings
            .iter()
            .any(|r| r.kind == RefactoringKind::MergeConditional));
    }

    #[test]
    fn test_equals_swap_counts_as_plain_match() {
        assert_eq!(
            match_sub_condition("name.equals(other)", "other.equals(name)"),
            Some(SubConditionMatch::Plain)
        );
    }

    #[test]
    fn test_boolean_return_involved() {
        let fragment1 = if_fragment("if(list.isEmpty())");
        let fragment2 = Fragment::new(
            "return list.isEmpty();",
            CodeElementType::ReturnStatement,
            Location::default(),
        )
        .with_boolean_literal("true");
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        let mut refactorings = Vec::new();

        assert!(common_conditional(
            &mut info,
            &fragment1,
            &fragment2,
            &mut refactorings,
            mapping_id()
        ));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::Conditional));
    }

    #[test]
    fn test_operator_replacement_validity() {
        let mut valid = ReplacementInfo::new("", "");
        valid.add_replacement(Replacement::new("==", "!=", ReplacementKind::InfixOperator));
        assert!(contains_valid_operator_replacements(&valid));

        let mut invalid = ReplacementInfo::new("", "");
        invalid.add_replacement(Replacement::new("<", "!=", ReplacementKind::InfixOperator));
        assert!(!contains_valid_operator_replacements(&invalid));
    }
}
