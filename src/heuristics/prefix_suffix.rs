//! Heuristics that classify the diff span left between the longest
//! common prefix and suffix of two fragment strings.

use crate::fragment::{CodeElementType, Fragment};
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind};
use crate::text;

/// Trims a statement down to its expression core: a leading `return `
/// and a trailing `;` carry no comparison signal.
pub fn expression_core(statement: &str) -> &str {
    let trimmed = statement.trim().trim_end_matches(';').trim_end();
    trimmed.strip_prefix("return ").unwrap_or(trimmed).trim()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// The differing middles of two strings, with the common prefix
/// backtracked (and the suffix advanced) to identifier boundaries so
/// the diff never cuts a name in half.
pub(crate) fn diff_middles(s1: &str, s2: &str) -> (String, String) {
    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();
    let mut prefix = text::common_prefix_len(s1, s2);
    let mut suffix = text::common_suffix_len(s1, s2, prefix);

    while prefix > 0
        && is_ident_char(chars1[prefix - 1])
        && (chars1.get(prefix).copied().is_some_and(is_ident_char)
            || chars2.get(prefix).copied().is_some_and(is_ident_char))
    {
        prefix -= 1;
    }
    while suffix > 0 {
        let start1 = chars1.len() - suffix;
        let start2 = chars2.len() - suffix;
        let cuts1 = start1 > prefix && is_ident_char(chars1[start1]) && is_ident_char(chars1[start1 - 1]);
        let cuts2 = start2 > prefix && is_ident_char(chars2[start2]) && is_ident_char(chars2[start2 - 1]);
        if cuts1 || cuts2 {
            suffix -= 1;
        } else {
            break;
        }
    }

    let middle1: String = chars1[prefix..chars1.len() - suffix].iter().collect();
    let middle2: String = chars2[prefix..chars2.len() - suffix].iter().collect();
    (middle1, middle2)
}

/// One side inserted a cast over the expression the other side uses
/// bare. No replacement is recorded: a cast does not change identity.
pub fn differ_only_in_cast(info: &ReplacementInfo) -> bool {
    let (middle1, middle2) = diff_middles(info.argumentized1(), info.argumentized2());
    let cast = match (middle1.trim(), middle2.trim()) {
        ("", cast) => cast,
        (cast, "") => cast,
        _ => return false,
    };
    let trimmed = cast.trim();
    trimmed.starts_with('(')
        && trimmed.ends_with(')')
        && trimmed.len() > 2
        && trimmed[1..trimmed.len() - 1]
            .chars()
            .all(|c| is_ident_char(c) || matches!(c, '.' | '[' | ']' | '<' | '>' | ' ' | ','))
}

/// `x` vs `!x` (or `~x`): an inverted condition. Records an
/// invert-conditional replacement over the expression cores.
pub fn differ_only_in_prefix_negation(info: &mut ReplacementInfo) -> bool {
    let core1 = expression_core(info.argumentized1()).to_string();
    let core2 = expression_core(info.argumentized2()).to_string();
    if core1 == core2 {
        return false;
    }
    let inverted = |plain: &str, negated: &str| {
        negated == format!("!{plain}")
            || negated == format!("!({plain})")
            || negated == format!("~{plain}")
    };
    if inverted(&core1, &core2) || inverted(&core2, &core1) {
        info.add_replacement(Replacement::new(
            core1,
            core2,
            ReplacementKind::InvertConditional,
        ));
        return true;
    }
    false
}

/// Texts equal after erasing synthesized `this.` prefixes.
pub fn differ_only_in_this_prefix(info: &ReplacementInfo) -> bool {
    let s1 = info.argumentized1();
    let s2 = info.argumentized2();
    s1 != s2 && s1.replace("this.", "") == s2.replace("this.", "")
}

/// Texts equal after erasing `final` modifiers.
pub fn differ_only_in_final_modifier(info: &ReplacementInfo) -> bool {
    let s1 = info.argumentized1();
    let s2 = info.argumentized2();
    s1 != s2 && s1.replace("final ", "") == s2.replace("final ", "")
}

/// `i++` rewritten as `i = i + 1` or `i += 1` (and the decrement
/// analogues).
pub fn differ_only_in_increment_reflow(info: &mut ReplacementInfo) -> bool {
    let core1 = expression_core(info.argumentized1()).to_string();
    let core2 = expression_core(info.argumentized2()).to_string();
    let matches_reflow = |compact: &str, expanded: &str| -> bool {
        let (variable, operator) = if let Some(v) = compact.strip_suffix("++") {
            (v.trim(), '+')
        } else if let Some(v) = compact.strip_suffix("--") {
            (v.trim(), '-')
        } else {
            return false;
        };
        let normalized: String = expanded.chars().filter(|c| !c.is_whitespace()).collect();
        normalized == format!("{variable}={variable}{operator}1")
            || normalized == format!("{variable}{operator}=1")
    };
    if matches_reflow(&core1, &core2) || matches_reflow(&core2, &core1) {
        info.add_replacement(Replacement::new(
            core1,
            core2,
            ReplacementKind::InfixExpression,
        ));
        return true;
    }
    false
}

/// One side carries a single extra concatenation/infix operand; all
/// other operands agree.
pub fn differ_only_in_infix_operand(info: &mut ReplacementInfo) -> bool {
    let core1 = expression_core(info.argumentized1()).to_string();
    let core2 = expression_core(info.argumentized2()).to_string();
    if !core1.contains('+') && !core2.contains('+') {
        return false;
    }
    let tokens1 = text::concat_tokens(&core1);
    let tokens2 = text::concat_tokens(&core2);
    if tokens1.len() < 2 && tokens2.len() < 2 {
        return false;
    }
    let intersection = text::multiset_intersection_size(&tokens1, &tokens2);
    let min = std::cmp::min(tokens1.len(), tokens2.len());
    let max = std::cmp::max(tokens1.len(), tokens2.len());
    if intersection == min && max == min + 1 && min > 0 {
        info.add_replacement(Replacement::new(
            core1,
            core2,
            ReplacementKind::InfixExpression,
        ));
        return true;
    }
    false
}

/// The diff is a single numeric operator flip. Only the symmetric pairs
/// count, and only at structural positions where a sign flip is a
/// plausible rewrite: an assignment or a loop header.
pub fn differ_only_in_infix_operator(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    let (middle1, middle2) = diff_middles(info.argumentized1(), info.argumentized2());
    let op1 = middle1.trim();
    let op2 = middle2.trim();
    let symmetric = matches!((op1, op2), ("+", "-") | ("-", "+") | ("*", "/") | ("/", "*"));
    if !symmetric {
        return false;
    }
    let structural = |fragment: &Fragment| {
        fragment.element_type().is_loop()
            || (fragment.element_type() == CodeElementType::ExpressionStatement
                && fragment.argumentized().contains('='))
    };
    if structural(fragment1) && structural(fragment2) {
        info.add_replacement(Replacement::new(op1, op2, ReplacementKind::InfixOperator));
        return true;
    }
    false
}

/// An earlier rename whose target is the head of a larger infix
/// expression on one side. If collapsing the extra operands back onto
/// the head makes the strings equal, the rename is upgraded to an
/// infix-expression replacement covering the whole expansion.
pub fn equal_after_infix_expression_expansion(info: &mut ReplacementInfo) -> bool {
    let renames: Vec<Replacement> = info
        .replacements()
        .of_kind(ReplacementKind::VariableName)
        .cloned()
        .collect();
    for rename in renames {
        let s1 = info.argumentized1().to_string();
        let s2 = info.argumentized2().to_string();
        if let Some(expanded) = infix_expansion_of(&s2, &rename.after) {
            if s2.replacen(&expanded, &rename.after, 1) == s1 {
                info.remove_replacement(&rename);
                info.add_replacement(Replacement::new(
                    rename.before,
                    expanded,
                    ReplacementKind::InfixExpression,
                ));
                info.set_argumentized1(s2);
                return true;
            }
        }
        if let Some(expanded) = infix_expansion_of(&s1, &rename.after) {
            if s1.replacen(&expanded, &rename.after, 1) == s2 {
                info.remove_replacement(&rename);
                info.add_replacement(Replacement::new(
                    expanded.replacen(&rename.after, &rename.before, 1),
                    rename.after,
                    ReplacementKind::InfixExpression,
                ));
                info.set_argumentized1(s2);
                return true;
            }
        }
    }
    false
}

/// The maximal `head + operand [+ operand ...]` span in `text` whose
/// leading operand is exactly `head` at an identifier boundary.
fn infix_expansion_of(text: &str, head: &str) -> Option<String> {
    if head.is_empty() {
        return None;
    }
    let mut search = 0;
    while let Some(found) = text[search..].find(head) {
        let pos = search + found;
        let end = pos + head.len();
        let at_boundary = text[..pos].chars().next_back().is_none_or(|c| !is_ident_char(c));
        if at_boundary && text[end..].starts_with(" + ") {
            let mut stop = end;
            while text[stop..].starts_with(" + ") {
                let operand_start = stop + 3;
                let operand_len = text[operand_start..]
                    .find(|c: char| matches!(c, ';' | ',' | ')' | ' '))
                    .unwrap_or(text.len() - operand_start);
                if operand_len == 0 {
                    break;
                }
                stop = operand_start + operand_len;
            }
            if stop > end {
                return Some(text[pos..stop].to_string());
            }
        }
        search = end;
    }
    None
}

/// One side wraps the other's bare expression in a call:
/// `x` vs `f(x)`. Records a method-invocation replacement.
pub fn differ_only_in_wrapped_call(info: &mut ReplacementInfo) -> bool {
    let core1 = expression_core(info.argumentized1()).to_string();
    let core2 = expression_core(info.argumentized2()).to_string();
    if core1 == core2 {
        return false;
    }
    let wraps = |inner: &str, outer: &str| -> bool {
        if !outer.ends_with(')') {
            return false;
        }
        let Some(open) = outer.find('(') else {
            return false;
        };
        let head = &outer[..open];
        let wrapped = &outer[open + 1..outer.len() - 1];
        !head.is_empty()
            && head
                .chars()
                .all(|c| is_ident_char(c) || c == '.')
            && text::strip_parentheses(wrapped) == text::strip_parentheses(inner)
    };
    if wraps(&core1, &core2) || wraps(&core2, &core1) {
        info.add_replacement(Replacement::new(
            core1,
            core2,
            ReplacementKind::MethodInvocation,
        ));
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Location;

    fn info(s1: &str, s2: &str) -> ReplacementInfo {
        ReplacementInfo::new(s1, s2)
    }

    #[test]
    fn test_diff_middles_backtracks_identifiers() {
        let (m1, m2) = diff_middles("f(x)", "f(x1, x2)");
        assert_eq!(m1, "x");
        assert_eq!(m2, "x1, x2");
    }

    #[test]
    fn test_differ_only_in_cast() {
        let info = info("x = value;", "x = (int)value;");
        assert!(differ_only_in_cast(&info));

        let not_cast = ReplacementInfo::new("x = value;", "x = f(value);");
        assert!(!differ_only_in_cast(&not_cast));
    }

    #[test]
    fn test_prefix_negation() {
        let mut info = info("return isValid(x);", "return !isValid(x);");
        assert!(differ_only_in_prefix_negation(&mut info));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::InvertConditional));
    }

    #[test]
    fn test_this_prefix() {
        let info = info("this.count = 0;", "count = 0;");
        assert!(differ_only_in_this_prefix(&info));
    }

    #[test]
    fn test_final_modifier() {
        let info = info("final int x = 1;", "int x = 1;");
        assert!(differ_only_in_final_modifier(&info));
    }

    #[test]
    fn test_increment_reflow() {
        let mut increment = info("i++;", "i = i + 1;");
        assert!(differ_only_in_increment_reflow(&mut increment));

        let mut compound = info("count--;", "count -= 1;");
        assert!(differ_only_in_increment_reflow(&mut compound));
    }

    #[test]
    fn test_extra_infix_operand() {
        let mut info = info("return a + b;", "return a + b + c;");
        assert!(differ_only_in_infix_operand(&mut info));
    }

    #[test]
    fn test_infix_operator_flip_in_assignment() {
        let fragment1 = Fragment::new(
            "offset = base + delta;",
            CodeElementType::ExpressionStatement,
            Location::default(),
        );
        let fragment2 = Fragment::new(
            "offset = base - delta;",
            CodeElementType::ExpressionStatement,
            Location::default(),
        );
        let mut info = info("offset = base + delta;", "offset = base - delta;");
        assert!(differ_only_in_infix_operator(&mut info, &fragment1, &fragment2));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::InfixOperator));
    }

    #[test]
    fn test_infix_operator_flip_rejected_outside_assignment() {
        let fragment1 = Fragment::new(
            "return base + delta;",
            CodeElementType::ReturnStatement,
            Location::default(),
        );
        let fragment2 = Fragment::new(
            "return base - delta;",
            CodeElementType::ReturnStatement,
            Location::default(),
        );
        let mut info = info("return base + delta;", "return base - delta;");
        assert!(!differ_only_in_infix_operator(&mut info, &fragment1, &fragment2));
    }

    #[test]
    fn test_infix_expression_expansion_upgrades_rename() {
        let mut info = info("x = b;", "x = b + c;");
        info.add_replacement(Replacement::new("a", "b", ReplacementKind::VariableName));
        assert!(equal_after_infix_expression_expansion(&mut info));
        assert!(!info
            .replacements()
            .contains_kind(ReplacementKind::VariableName));
        let upgraded = info.replacements().covering("a", "b + c");
        assert!(upgraded.is_some_and(|r| r.kind == ReplacementKind::InfixExpression));
        assert_eq!(info.raw_distance(), 0);
    }

    #[test]
    fn test_wrapped_call() {
        let mut info = info("return value;", "return normalize(value);");
        assert!(differ_only_in_wrapped_call(&mut info));
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::MethodInvocation));
    }
}
