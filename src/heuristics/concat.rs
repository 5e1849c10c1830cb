//! Concatenation heuristics: string-building expressions compared as
//! token multisets, against text blocks, and against call argument
//! lists.

use super::prefix_suffix::expression_core;
use crate::call::concatenated_match;
use crate::fragment::{CodeElementType, Fragment};
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind};
use crate::text;

/// Guard applied before any concatenation comparison: a declaration and
/// a non-declaration only qualify when they manipulate the same
/// variable, otherwise `String s = a + b` would happily match
/// `return a + b` in an unrelated spot.
pub fn valid_statement_for_concat_comparison(fragment1: &Fragment, fragment2: &Fragment) -> bool {
    let declaration1 = fragment1.element_type() == CodeElementType::VariableDeclarationStatement;
    let declaration2 = fragment2.element_type() == CodeElementType::VariableDeclarationStatement;
    if declaration1 == declaration2 {
        return true;
    }
    let (declaring, other) = if declaration1 {
        (fragment1, fragment2)
    } else {
        (fragment2, fragment1)
    };
    declaring
        .variable_declarations()
        .iter()
        .any(|d| other.variables().iter().any(|v| v == &d.name))
}

/// The umbrella concatenation heuristic. Tries, in order: token-multiset
/// comparison of two concatenation expressions, concatenation against a
/// text block, and covering-call argument lists differing only in
/// concatenation shape.
pub fn common_concat(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    let core1 = expression_core(info.argumentized1()).to_string();
    let core2 = expression_core(info.argumentized2()).to_string();
    if core1 == core2 {
        return false;
    }

    if core1.contains('+') && core2.contains('+') && concatenated_match(&core1, &core2) {
        info.add_replacement(Replacement::new(
            core1,
            core2,
            ReplacementKind::Concatenation,
        ));
        return true;
    }

    if concat_matches_text_block(&core1, fragment2.text_blocks())
        || concat_matches_text_block(&core2, fragment1.text_blocks())
    {
        info.add_replacement(Replacement::new(
            core1,
            core2,
            ReplacementKind::Concatenation,
        ));
        return true;
    }

    if let (Some(call1), Some(call2)) = (fragment1.covering_call(), fragment2.covering_call()) {
        if call1.identical_name(call2)
            && !call1.equal_arguments(call2)
            && call1.identical_or_concatenated_arguments(call2)
        {
            info.add_replacement(Replacement::new(
                core1,
                core2,
                ReplacementKind::Concatenation,
            ));
            return true;
        }
    }

    false
}

/// A concatenation expression matched against a multi-line text block:
/// accept when the whitespace-normalized contents differ by less than
/// 10%, or become equal after dropping one offending line of the block.
fn concat_matches_text_block(concat_expression: &str, text_blocks: &[String]) -> bool {
    if !concat_expression.contains('+') || text_blocks.is_empty() {
        return false;
    }
    let normalized_concat = normalize_concatenation(rhs_of_assignment(concat_expression));
    if normalized_concat.is_empty() {
        return false;
    }
    for block in text_blocks {
        let normalized_block = normalize_text_block(block);
        if text::normalized_distance(&normalized_concat, &normalized_block) < 0.1 {
            return true;
        }
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() > 1 {
            for skip in 0..lines.len() {
                let reduced: String = lines
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, l)| *l)
                    .collect();
                if normalize_text_block(&reduced) == normalized_concat {
                    return true;
                }
            }
        }
    }
    false
}

/// Drops a `target =` assignment head so only the built string takes
/// part in the comparison.
fn rhs_of_assignment(core: &str) -> &str {
    let bytes = core.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'=' => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let comparison = matches!(prev, Some(b'=') | Some(b'!') | Some(b'<') | Some(b'>'))
                    || bytes.get(i + 1) == Some(&b'=');
                if comparison {
                    return core;
                }
                return core[i + 1..].trim();
            }
            b'(' | b'"' => return core,
            _ => {}
        }
    }
    core
}

/// Joins the operands of a concatenation, unquoting string literals,
/// and strips everything a text block renders differently.
fn normalize_concatenation(expression: &str) -> String {
    let joined: String = text::concat_tokens(expression)
        .iter()
        .map(|token| token.trim_matches('"').to_string())
        .collect();
    strip_rendering_noise(&joined)
}

fn normalize_text_block(block: &str) -> String {
    strip_rendering_noise(block.trim_matches('"'))
}

fn strip_rendering_noise(content: &str) -> String {
    content
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '"' | '\\' | '$' | '{' | '}'))
        .collect()
}
