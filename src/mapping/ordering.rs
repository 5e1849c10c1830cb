//! Ranking of competing mapping candidates.
//!
//! The comparator is a fixed-order rule table: the first rule that
//! discriminates decides. Every rule is antisymmetric by construction,
//! but the chain as a whole is not transitive; callers pick the best
//! candidate by pairwise comparison, not by sorting large sets.

use std::cmp::Ordering;

use super::Mapping;

type Rule = fn(&Mapping<'_>, &Mapping<'_>) -> Option<Ordering>;

/// The rule table, first entry wins. Reordering entries changes which
/// candidate wins contested fragments, so the order is part of the
/// engine's contract.
const RULES: &[Rule] = &[
    composite_coverage,
    concatenation_penalty,
    extraction_flags,
    identical_position,
    declaration_anchor,
    replacement_kind_subset,
    edit_distance,
    parent_distance_vector,
    composite_children,
    depth_difference,
    index_difference,
    parent_declaration_type,
    parent_variable_overlap,
    source_position,
];

/// Compares two candidate mappings; `Ordering::Less` means `a` is the
/// better candidate.
pub fn compare(a: &Mapping<'_>, b: &Mapping<'_>) -> Ordering {
    for rule in RULES {
        if let Some(ordering) = rule(a, b) {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Picks the best mapping of a non-empty candidate list by pairwise
/// comparison, keeping the earlier candidate on ties.
pub fn best<'m, 'a>(candidates: &'m [Mapping<'a>]) -> Option<&'m Mapping<'a>> {
    candidates.iter().reduce(|best, candidate| {
        if compare(candidate, best) == Ordering::Less {
            candidate
        } else {
            best
        }
    })
}

/// A composite that structurally re-matched more surrounding fragments
/// wins outright.
fn composite_coverage(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    match (a.composite_coverage(), b.composite_coverage()) {
        (Some(coverage_a), Some(coverage_b)) if coverage_a != coverage_b => {
            Some(coverage_b.cmp(&coverage_a))
        }
        _ => None,
    }
}

/// Concatenation matches are loose; a candidate without one beats a
/// candidate with one.
fn concatenation_penalty(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    discriminate(
        !a.has_concatenation_replacement(),
        !b.has_concatenation_replacement(),
    )
}

/// A pair that is identical modulo an extracted or inlined variable
/// outranks a plain textual near-miss.
fn extraction_flags(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    if distances_equal(a, b) {
        return None;
    }
    discriminate(a.identical_via_extraction(), b.identical_via_extraction())
}

/// Same depth, same index, same parent node type: the fragment did not
/// move.
fn identical_position(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    if distances_equal(a, b) {
        return None;
    }
    discriminate(
        a.identical_depth_index_parent_type(),
        b.identical_depth_index_parent_type(),
    )
}

/// The candidate mapping the declaration of a variable the other
/// candidate merely uses wins: renames anchor at declaration sites.
fn declaration_anchor(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    if distances_equal(a, b) {
        return None;
    }
    discriminate(a.declares_variable_used_by(b), b.declares_variable_used_by(a))
}

/// A strictly smaller set of replacement kinds means a strictly simpler
/// explanation of the edit.
fn replacement_kind_subset(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    if distances_equal(a, b) {
        return None;
    }
    let kinds_a = a.replacements().kinds();
    let kinds_b = b.replacements().kinds();
    if kinds_a == kinds_b {
        return None;
    }
    discriminate(
        kinds_a.is_subset(&kinds_b),
        kinds_b.is_subset(&kinds_a),
    )
}

fn edit_distance(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    let distance_a = a.normalized_edit_distance();
    let distance_b = b.normalized_edit_distance();
    (distance_a != distance_b).then(|| {
        distance_a
            .partial_cmp(&distance_b)
            .unwrap_or(Ordering::Equal)
    })
}

/// Equal-distance tie break: the candidate whose enclosing parents look
/// more alike, measured level by level, wins. More identical levels
/// (leading zeros) beat a smaller total.
fn parent_distance_vector(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    let vector_a = a.parent_level_distances();
    let vector_b = b.parent_level_distances();
    if vector_a.is_empty() && vector_b.is_empty() {
        return None;
    }
    let zeros = |v: &[f64]| v.iter().take_while(|d| **d == 0.0).count();
    let zeros_a = zeros(&vector_a);
    let zeros_b = zeros(&vector_b);
    if zeros_a != zeros_b {
        return Some(zeros_b.cmp(&zeros_a));
    }
    let sum_a: f64 = vector_a.iter().sum();
    let sum_b: f64 = vector_b.iter().sum();
    (sum_a != sum_b).then(|| sum_a.partial_cmp(&sum_b).unwrap_or(Ordering::Equal))
}

/// Composites whose child statements are textually identical are the
/// same block even when their headers drifted.
fn composite_children(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    discriminate(a.identical_composite_children(), b.identical_composite_children())
}

fn depth_difference(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    let difference_a = a.depth_difference();
    let difference_b = b.depth_difference();
    (difference_a != difference_b).then(|| difference_a.cmp(&difference_b))
}

fn index_difference(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    let difference_a = a.index_difference();
    let difference_b = b.index_difference();
    (difference_a != difference_b).then(|| difference_a.cmp(&difference_b))
}

fn parent_declaration_type(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    discriminate(
        a.same_parent_declaration_type(),
        b.same_parent_declaration_type(),
    )
}

fn parent_variable_overlap(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    let overlap_a = a.parent_variable_intersection();
    let overlap_b = b.parent_variable_intersection();
    (overlap_a != overlap_b).then(|| overlap_b.cmp(&overlap_a))
}

/// Last resort: prefer the pair closer to the top of both bodies.
fn source_position(a: &Mapping<'_>, b: &Mapping<'_>) -> Option<Ordering> {
    let sum_a = a.line_sum();
    let sum_b = b.line_sum();
    (sum_a != sum_b).then(|| sum_a.cmp(&sum_b))
}

fn distances_equal(a: &Mapping<'_>, b: &Mapping<'_>) -> bool {
    a.normalized_edit_distance() == b.normalized_edit_distance()
}

/// `Less` when only `a` holds, `Greater` when only `b` holds, no
/// opinion otherwise. Antisymmetric by construction.
fn discriminate(a_wins: bool, b_wins: bool) -> Option<Ordering> {
    match (a_wins, b_wins) {
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{CodeElementType, Container, Fragment, Location};
    use crate::heuristics::MatchContext;
    use crate::mapping::Mapper;

    fn containers() -> (Container, Container) {
        (
            Container::new("process", "Service"),
            Container::new("process", "Service"),
        )
    }

    fn statement(text: &str, line: usize) -> Fragment {
        Fragment::new(
            text,
            CodeElementType::ExpressionStatement,
            Location::new(line, line, line * 100, line * 100 + text.len()),
        )
    }

    #[test]
    fn test_exact_match_beats_renamed_match() {
        let (before, after) = containers();
        let mapper = Mapper::new(MatchContext::new(&before, &after));
        let fragment1 = statement("count = f(a);", 1).with_variable("a");
        let exact2 = statement("count = f(a);", 5).with_variable("a");
        let renamed2 = statement("count = f(b);", 1).with_variable("b");

        let exact = mapper.map(&fragment1, &exact2, &[], &[]).unwrap();
        let renamed = mapper.map(&fragment1, &renamed2, &[], &[]).unwrap();
        assert_eq!(compare(&exact, &renamed), Ordering::Less);
        assert_eq!(compare(&renamed, &exact), Ordering::Greater);
    }

    #[test]
    fn test_comparator_is_antisymmetric() {
        let (before, after) = containers();
        let mapper = Mapper::new(MatchContext::new(&before, &after));
        let fragment1 = statement("x = a + b;", 1)
            .with_variable("a")
            .with_variable("b");
        let candidate_a = statement("x = a + c;", 2)
            .with_variable("a")
            .with_variable("c");
        let candidate_b = statement("x = d + b;", 9)
            .with_variable("d")
            .with_variable("b");

        let mapping_a = mapper.map(&fragment1, &candidate_a, &[], &[]).unwrap();
        let mapping_b = mapper.map(&fragment1, &candidate_b, &[], &[]).unwrap();
        let forward = compare(&mapping_a, &mapping_b);
        let backward = compare(&mapping_b, &mapping_a);
        assert_eq!(forward, backward.reverse());
    }

    #[test]
    fn test_closer_line_breaks_full_tie() {
        let (before, after) = containers();
        let mapper = Mapper::new(MatchContext::new(&before, &after));
        let fragment1 = statement("run();", 1);
        let near = statement("run();", 2);
        let far = statement("run();", 40);

        let mapping_near = mapper.map(&fragment1, &near, &[], &[]).unwrap();
        let mapping_far = mapper.map(&fragment1, &far, &[], &[]).unwrap();
        assert_eq!(compare(&mapping_near, &mapping_far), Ordering::Less);
    }

    #[test]
    fn test_best_picks_first_on_tie() {
        let (before, after) = containers();
        let mapper = Mapper::new(MatchContext::new(&before, &after));
        let fragment1 = statement("run();", 1);
        let twin_a = statement("run();", 3);
        let twin_b = statement("run();", 3);

        let candidates = vec![
            mapper.map(&fragment1, &twin_a, &[], &[]).unwrap(),
            mapper.map(&fragment1, &twin_b, &[], &[]).unwrap(),
        ];
        let winner = best(&candidates).unwrap();
        assert!(std::ptr::eq(winner, &candidates[0]));
    }

    #[test]
    fn test_smaller_edit_distance_wins() {
        let (before, after) = containers();
        let mapper = Mapper::new(MatchContext::new(&before, &after));
        let fragment1 = statement("total = base + offset;", 1)
            .with_variable("total")
            .with_variable("base")
            .with_variable("offset");
        let close = statement("total = base + shift;", 1)
            .with_variable("total")
            .with_variable("base")
            .with_variable("shift");
        let distant = statement("sum = base + displacement;", 1)
            .with_variable("sum")
            .with_variable("base")
            .with_variable("displacement");

        let mapping_close = mapper.map(&fragment1, &close, &[], &[]).unwrap();
        let mapping_distant = mapper.map(&fragment1, &distant, &[], &[]).unwrap();
        assert!(mapping_close.is_matched() && mapping_distant.is_matched());
        assert_eq!(compare(&mapping_close, &mapping_distant), Ordering::Less);
    }
}
