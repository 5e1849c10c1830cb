//! End-to-end tests for the fragment-matching engine.

use fragmatch::call::concatenated_match;
use fragmatch::mapping::ordering;
use fragmatch::prelude::*;
use fragmatch::refactoring::add_refactoring;

fn containers() -> (Container, Container) {
    (
        Container::new("process", "Service"),
        Container::new("process", "Service"),
    )
}

fn statement(text: &str, element_type: CodeElementType, line: usize) -> Fragment {
    Fragment::new(
        text,
        element_type,
        Location::new(line, line, line * 100, line * 100 + text.len()),
    )
}

#[test]
fn renamed_log_call_still_maps() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement(
        "logger.debug(\"deleting stale entry\");",
        CodeElementType::ExpressionStatement,
        4,
    )
    .with_invocation(
        Call::invocation("debug")
            .with_receiver("logger")
            .with_argument("\"deleting stale entry\"")
            .with_coverage(Coverage::Only),
    );
    let fragment2 = statement(
        "log.info(\"deleting entry\");",
        CodeElementType::ExpressionStatement,
        4,
    )
    .with_invocation(
        Call::invocation("info")
            .with_receiver("log")
            .with_argument("\"deleting entry\"")
            .with_coverage(Coverage::Only),
    );

    let mapping = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    assert!(mapping.is_matched());
    assert!(!mapping.replacements().is_empty());
}

#[test]
fn split_argument_maps_with_known_names() {
    let (before, mut after) = containers();
    after = after
        .with_parameter(Parameter::new("x1", "int"))
        .with_parameter(Parameter::new("x2", "int"));
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement("f(x);", CodeElementType::ExpressionStatement, 7).with_variable("x");
    let fragment2 = statement("f(x1, x2);", CodeElementType::ExpressionStatement, 7)
        .with_variable("x1")
        .with_variable("x2");

    let mapping = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    assert!(mapping.is_matched());
    let split = mapping
        .replacements()
        .of_kind(ReplacementKind::SplitVariable)
        .next()
        .expect("expected a split replacement");
    assert_eq!(split.before, "x");
    match &split.detail {
        Some(ReplacementDetail::Split { split_variables }) => {
            assert!(split_variables.contains("x1") && split_variables.contains("x2"));
        }
        other => panic!("unexpected detail: {other:?}"),
    }
    assert!(!mapping
        .replacements()
        .contains_kind(ReplacementKind::VariableName));
}

#[test]
fn fully_inverted_condition_reports_invert_refactoring_only() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement("if(count > 0)", CodeElementType::IfStatement, 10);
    let fragment2 = statement("if(count <= 0)", CodeElementType::IfStatement, 10);

    let mapping = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    assert!(mapping.is_matched());
    assert!(mapping
        .replacements()
        .contains_kind(ReplacementKind::InvertConditional));
    assert!(!mapping
        .replacements()
        .contains_kind(ReplacementKind::Conditional));
    assert_eq!(
        mapping.refactorings()[0].kind,
        RefactoringKind::InvertCondition
    );
}

#[test]
fn conditional_split_across_nested_ifs() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement("if(a && b)", CodeElementType::IfStatement, 5);
    let fragment2 = statement("if(a)", CodeElementType::IfStatement, 5)
        .with_parent(ParentNode::new("if(b)", CodeElementType::IfStatement));

    let mapping = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    assert!(mapping.is_matched());
    assert!(mapping
        .replacements()
        .contains_kind(ReplacementKind::Conditional));
    assert!(mapping
        .refactorings()
        .iter()
        .any(|r| r.kind == RefactoringKind::SplitConditional));
}

#[test]
fn extract_variable_deduplicates_across_mappings() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let declaration_statement = statement(
        "int t = a.getX();",
        CodeElementType::VariableDeclarationStatement,
        1,
    )
    .with_variable_declaration(
        VariableDeclaration::new("t", Location::new(1, 100, 0, 100_000))
            .with_type("int")
            .with_initializer(Initializer::new("a.getX()")),
    );
    let statements2 = vec![declaration_statement];

    let use1_before = statement("save(a.getX());", CodeElementType::ExpressionStatement, 3)
        .with_invocation(Call::invocation("getX").with_receiver("a"));
    let use1_after = statement("save(t);", CodeElementType::ExpressionStatement, 3)
        .with_variable("t");
    let use2_before = statement("return a.getX();", CodeElementType::ReturnStatement, 9)
        .with_invocation(Call::invocation("getX").with_receiver("a"));
    let use2_after =
        statement("return t;", CodeElementType::ReturnStatement, 9).with_variable("t");

    let mapping1 = mapper
        .map(&use1_before, &use1_after, &[], &statements2)
        .unwrap();
    let mapping2 = mapper
        .map(&use2_before, &use2_after, &[], &statements2)
        .unwrap();
    assert!(mapping1.identical_with_extracted_variable());
    assert!(mapping2.identical_with_extracted_variable());

    let mut refactorings = Vec::new();
    for mapping in [&mapping1, &mapping2] {
        for refactoring in mapping.refactorings() {
            add_refactoring(&mut refactorings, refactoring.clone());
        }
    }
    assert_eq!(refactorings.len(), 1);
    assert_eq!(refactorings[0].references.len(), 2);
    assert_eq!(refactorings[0].kind, RefactoringKind::ExtractVariable);
}

#[test]
fn concatenation_matches_text_block() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement(
        "s = \"select \" + columns + \" from t\";",
        CodeElementType::ExpressionStatement,
        12,
    )
    .with_variable("s");
    let fragment2 = statement("s = template;", CodeElementType::ExpressionStatement, 12)
        .with_variable("s")
        .with_text_block("select ${columns} from t");

    let mapping = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    assert!(mapping.is_matched());
    assert!(mapping
        .replacements()
        .contains_kind(ReplacementKind::Concatenation));
}

#[test]
fn mapping_the_same_pair_twice_is_deterministic() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement("total = base + offset;", CodeElementType::ExpressionStatement, 2)
        .with_variable("total")
        .with_variable("base")
        .with_variable("offset");
    let fragment2 = statement("total = base + shift;", CodeElementType::ExpressionStatement, 2)
        .with_variable("total")
        .with_variable("base")
        .with_variable("shift");

    let first = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    let second = mapper.map(&fragment1, &fragment2, &[], &[]).unwrap();
    assert_eq!(first.outcome(), second.outcome());
    assert_eq!(first.replacements(), second.replacements());
}

#[test]
fn inverse_replacements_cancel() {
    let mut set = ReplacementSet::new();
    set.insert(Replacement::new("a", "b", ReplacementKind::VariableName));
    set.insert(Replacement::new("b", "a", ReplacementKind::VariableName));
    assert!(!set.contains(&Replacement::new("a", "b", ReplacementKind::VariableName)));
    assert!(!set.contains(&Replacement::new("b", "a", ReplacementKind::VariableName)));
}

#[test]
fn argument_intersection_is_symmetric() {
    let call1 = Call::invocation("f").with_arguments(["a", "b", "c"]);
    let call2 = Call::invocation("g").with_arguments(["c", "d", "a"]);
    assert_eq!(
        call1.argument_intersection(&call2),
        call2.argument_intersection(&call1)
    );
}

#[test]
fn concatenation_threshold_boundary() {
    // Two of three tokens shared: intersection 2, threshold 1 -> accept.
    assert!(concatenated_match(
        "\"a\" + \"b\" + name",
        "\"a\" + \"b\" + title"
    ));
    // One of three tokens shared: intersection 1, threshold 2 -> reject.
    assert!(!concatenated_match(
        "\"a\" + name + suffix",
        "\"a\" + title + header"
    ));
    // Single shared token with nothing unmatched -> accept.
    assert!(concatenated_match("name", "name"));
}

#[test]
fn comparator_is_antisymmetric_across_candidates() {
    let (before, after) = containers();
    let mapper = Mapper::new(MatchContext::new(&before, &after));
    let fragment1 = statement("x = a + b;", CodeElementType::ExpressionStatement, 1)
        .with_variable("a")
        .with_variable("b");
    let candidates2 = vec![
        statement("x = a + b;", CodeElementType::ExpressionStatement, 1)
            .with_variable("a")
            .with_variable("b"),
        statement("x = a + c;", CodeElementType::ExpressionStatement, 6)
            .with_variable("a")
            .with_variable("c"),
        statement("x = d + b;", CodeElementType::ExpressionStatement, 20)
            .with_variable("d")
            .with_variable("b"),
    ];

    let mappings: Vec<Mapping> = candidates2
        .iter()
        .map(|candidate| mapper.map(&fragment1, candidate, &[], &[]).unwrap())
        .collect();
    for a in &mappings {
        for b in &mappings {
            assert_eq!(
                ordering::compare(a, b),
                ordering::compare(b, a).reverse(),
                "comparator must be antisymmetric for {:?} vs {:?}",
                a.fragment2().text(),
                b.fragment2().text()
            );
        }
    }
    let winner = ordering::best(&mappings).unwrap();
    assert_eq!(winner.fragment2().text(), "x = a + b;");
}
