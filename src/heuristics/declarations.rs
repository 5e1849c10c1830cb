//! Declaration-shape heuristics: the same variable declared under a
//! different name, declarations matched against plain assignments or
//! return statements, and initializers that amount to "no value".

use super::prefix_suffix::expression_core;
use crate::fragment::{CodeElementType, Fragment, VariableDeclaration};
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind};
use crate::text;

fn single_declaration(fragment: &Fragment) -> Option<&VariableDeclaration> {
    match fragment.variable_declarations() {
        [declaration] => Some(declaration),
        _ => None,
    }
}

/// `int count = f();` vs `int total = f();` — the same declaration under
/// a different name. Requires matching types (or both untyped) and
/// initializer texts that agree once the rename is applied.
pub fn identical_variable_declarations_with_different_names(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    let (Some(declaration1), Some(declaration2)) =
        (single_declaration(fragment1), single_declaration(fragment2))
    else {
        return false;
    };
    if declaration1.name == declaration2.name || declaration1.type_name != declaration2.type_name {
        return false;
    }
    let renamed = text::replace_token(
        info.argumentized1(),
        &declaration1.name,
        &declaration2.name,
    );
    if renamed != info.argumentized2() {
        return false;
    }
    info.apply(Replacement::new(
        declaration1.name.clone(),
        declaration2.name.clone(),
        ReplacementKind::VariableName,
    ));
    true
}

/// A declaration on one side, a plain assignment to the same name with
/// the same right-hand side on the other.
pub fn declaration_vs_assignment(
    info: &ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    declaration_matches_statement(info, fragment1, fragment2, |declaration, core| {
        let initializer = declaration.initializer.as_ref()?;
        let expected: String = format!("{} = {}", declaration.name, initializer.text)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let actual: String = core.chars().filter(|c| !c.is_whitespace()).collect();
        (expected == actual).then_some(())
    })
}

/// A declaration on one side, a return of the declaration's initializer
/// on the other. The pair matches so extract/inline detection can link
/// the initializer afterwards.
pub fn declaration_vs_return(
    info: &ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    let return1 = fragment1.element_type() == CodeElementType::ReturnStatement;
    let return2 = fragment2.element_type() == CodeElementType::ReturnStatement;
    if return1 == return2 {
        return false;
    }
    declaration_matches_statement(info, fragment1, fragment2, |declaration, core| {
        let initializer = declaration.initializer.as_ref()?;
        (text::strip_parentheses(core) == text::strip_parentheses(&initializer.text)).then_some(())
    })
}

fn declaration_matches_statement(
    info: &ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
    accept: impl Fn(&VariableDeclaration, &str) -> Option<()>,
) -> bool {
    let declaration1 = fragment1.element_type() == CodeElementType::VariableDeclarationStatement;
    let declaration2 = fragment2.element_type() == CodeElementType::VariableDeclarationStatement;
    if declaration1 == declaration2 {
        return false;
    }
    let (declaring, other_core) = if declaration1 {
        (fragment1, expression_core(info.argumentized2()))
    } else {
        (fragment2, expression_core(info.argumentized1()))
    };
    single_declaration(declaring)
        .and_then(|declaration| accept(declaration, other_core))
        .is_some()
}

const DEFAULT_VALUES: [&str; 7] = ["null", "0", "0.0", "0L", "0l", "false", "\"\""];

/// Declarations of the same variable where one side's initializer is a
/// language default. `int x;` and `int x = 0;` declare the same thing.
pub fn default_initializer_equivalence(fragment1: &Fragment, fragment2: &Fragment) -> bool {
    let (Some(declaration1), Some(declaration2)) =
        (single_declaration(fragment1), single_declaration(fragment2))
    else {
        return false;
    };
    if declaration1.name != declaration2.name || declaration1.type_name != declaration2.type_name {
        return false;
    }
    match (&declaration1.initializer, &declaration2.initializer) {
        (Some(initializer), None) | (None, Some(initializer)) => {
            DEFAULT_VALUES.contains(&initializer.text.trim())
        }
        _ => false,
    }
}

/// Catch clauses that differ only in the exception variable's name
/// and/or a `final` modifier.
pub fn catch_clause_rename(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) -> bool {
    if fragment1.element_type() != CodeElementType::CatchClause
        || fragment2.element_type() != CodeElementType::CatchClause
    {
        return false;
    }
    let (Some(declaration1), Some(declaration2)) =
        (single_declaration(fragment1), single_declaration(fragment2))
    else {
        return false;
    };
    if declaration1.type_name != declaration2.type_name {
        return false;
    }
    let normalized1 = text::replace_token(
        &info.argumentized1().replace("final ", ""),
        &declaration1.name,
        &declaration2.name,
    );
    let normalized2 = info.argumentized2().replace("final ", "");
    if normalized1 != normalized2 {
        return false;
    }
    if declaration1.name != declaration2.name {
        info.apply(Replacement::new(
            declaration1.name.clone(),
            declaration2.name.clone(),
            ReplacementKind::VariableName,
        ));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Initializer, Location};

    fn declaration_fragment(text: &str, name: &str, type_name: &str, init: Option<&str>) -> Fragment {
        let mut declaration =
            VariableDeclaration::new(name, Location::default()).with_type(type_name);
        if let Some(init) = init {
            declaration = declaration.with_initializer(Initializer::new(init));
        }
        Fragment::new(
            text,
            CodeElementType::VariableDeclarationStatement,
            Location::default(),
        )
        .with_variable_declaration(declaration)
    }

    #[test]
    fn test_renamed_declaration() {
        let fragment1 = declaration_fragment("int count = f();", "count", "int", Some("f()"));
        let fragment2 = declaration_fragment("int total = f();", "total", "int", Some("f()"));
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());

        assert!(identical_variable_declarations_with_different_names(
            &mut info, &fragment1, &fragment2
        ));
        assert_eq!(info.raw_distance(), 0);
        assert!(info
            .replacements()
            .contains_kind(ReplacementKind::VariableName));
    }

    #[test]
    fn test_renamed_declaration_rejects_type_change() {
        let fragment1 = declaration_fragment("int count = f();", "count", "int", Some("f()"));
        let fragment2 = declaration_fragment("long total = f();", "total", "long", Some("f()"));
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        assert!(!identical_variable_declarations_with_different_names(
            &mut info, &fragment1, &fragment2
        ));
    }

    #[test]
    fn test_declaration_vs_assignment() {
        let fragment1 = declaration_fragment("int x = f();", "x", "int", Some("f()"));
        let fragment2 = Fragment::new(
            "x = f();",
            CodeElementType::ExpressionStatement,
            Location::default(),
        );
        let info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        assert!(declaration_vs_assignment(&info, &fragment1, &fragment2));
    }

    #[test]
    fn test_declaration_vs_return() {
        let fragment1 = declaration_fragment("int t = a.getX();", "t", "int", Some("a.getX()"));
        let fragment2 = Fragment::new(
            "return a.getX();",
            CodeElementType::ReturnStatement,
            Location::default(),
        );
        let info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        assert!(declaration_vs_return(&info, &fragment1, &fragment2));
    }

    #[test]
    fn test_default_initializer_equivalence() {
        let fragment1 = declaration_fragment("int x = 0;", "x", "int", Some("0"));
        let fragment2 = declaration_fragment("int x;", "x", "int", None);
        assert!(default_initializer_equivalence(&fragment1, &fragment2));

        let fragment3 = declaration_fragment("int x = 5;", "x", "int", Some("5"));
        assert!(!default_initializer_equivalence(&fragment3, &fragment2));
    }

    #[test]
    fn test_catch_clause_rename() {
        let fragment1 = Fragment::new(
            "catch(final IOException e)",
            CodeElementType::CatchClause,
            Location::default(),
        )
        .with_variable_declaration(
            VariableDeclaration::new("e", Location::default()).with_type("IOException"),
        );
        let fragment2 = Fragment::new(
            "catch(IOException ex)",
            CodeElementType::CatchClause,
            Location::default(),
        )
        .with_variable_declaration(
            VariableDeclaration::new("ex", Location::default()).with_type("IOException"),
        );
        let mut info = ReplacementInfo::new(fragment1.text(), fragment2.text());
        assert!(catch_clause_rename(&mut info, &fragment1, &fragment2));
    }
}
