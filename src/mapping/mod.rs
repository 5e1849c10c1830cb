//! The fragment-pair mapper: exactness checks, the heuristic driver,
//! extract/inline-variable detection, and the candidate ordering.
//!
//! One [`Mapping`] is produced per attempted (fragment1, fragment2)
//! pair. Competing candidates for the same fragment are ranked with
//! [`ordering::compare`].

pub mod ordering;

use tracing::{debug, trace};

use crate::call::Call;
use crate::error::{EngineError, Result};
use crate::fragment::{Fragment, VariableDeclaration};
use crate::heuristics::{
    MatchContext, arguments, concat, conditionals, declarations, prefix_suffix,
};
use crate::refactoring::{
    MappingId, Refactoring, SubExpressionMapping, add_refactoring,
};
use crate::replacement::{
    Replacement, ReplacementDetail, ReplacementInfo, ReplacementKind, ReplacementSet,
};
use crate::text;

/// Rename detection tolerates this much normalized name distance when
/// camel-case tokens fail to overlap.
const RENAME_DISTANCE_THRESHOLD: f64 = 0.4;

/// Terminal state of one mapping attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Exact,
    Heuristic,
    ExtractVariable,
    InlineVariable,
    Unmatched,
}

/// The result of matching one fragment pair: the accepted replacement
/// set, the inferred refactorings, and the verdict flags the ordering
/// consults.
#[derive(Debug, Clone)]
pub struct Mapping<'a> {
    fragment1: &'a Fragment,
    fragment2: &'a Fragment,
    outcome: MatchOutcome,
    replacements: ReplacementSet,
    refactorings: Vec<Refactoring>,
    identical_with_extracted_variable: bool,
    identical_with_inlined_variable: bool,
}

impl<'a> Mapping<'a> {
    pub fn fragment1(&self) -> &'a Fragment {
        self.fragment1
    }

    pub fn fragment2(&self) -> &'a Fragment {
        self.fragment2
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    pub fn is_exact(&self) -> bool {
        self.outcome == MatchOutcome::Exact
    }

    pub fn is_matched(&self) -> bool {
        self.outcome != MatchOutcome::Unmatched
    }

    pub fn replacements(&self) -> &ReplacementSet {
        &self.replacements
    }

    pub fn refactorings(&self) -> &[Refactoring] {
        &self.refactorings
    }

    pub fn identical_with_extracted_variable(&self) -> bool {
        self.identical_with_extracted_variable
    }

    pub fn identical_with_inlined_variable(&self) -> bool {
        self.identical_with_inlined_variable
    }

    pub fn id(&self) -> MappingId {
        MappingId::new(*self.fragment1.location(), *self.fragment2.location())
    }

    /// Normalized edit distance of the pair, the primary ranking score:
    /// lower-cased argumentized texts with generic type arguments after
    /// dots removed.
    pub fn normalized_edit_distance(&self) -> f64 {
        let s1 = text::strip_generics_after_dot(&self.fragment1.argumentized().to_lowercase());
        let s2 = text::strip_generics_after_dot(&self.fragment2.argumentized().to_lowercase());
        text::normalized_distance(&s1, &s2)
    }

    /// Total number of additionally matched fragments recorded by
    /// composite replacements, if any.
    pub(crate) fn composite_coverage(&self) -> Option<usize> {
        let mut total = None;
        for replacement in self.replacements.of_kind(ReplacementKind::Composite) {
            if let Some(ReplacementDetail::Composite {
                additionally_matched_before,
                additionally_matched_after,
            }) = &replacement.detail
            {
                *total.get_or_insert(0) += additionally_matched_before + additionally_matched_after;
            }
        }
        total
    }

    pub(crate) fn has_concatenation_replacement(&self) -> bool {
        self.replacements
            .contains_kind(ReplacementKind::Concatenation)
    }

    pub(crate) fn identical_via_extraction(&self) -> bool {
        self.identical_with_extracted_variable || self.identical_with_inlined_variable
    }

    pub(crate) fn identical_depth_index_parent_type(&self) -> bool {
        self.fragment1.depth() == self.fragment2.depth()
            && self.fragment1.index() == self.fragment2.index()
            && match (
                self.fragment1.non_block_parent(),
                self.fragment2.non_block_parent(),
            ) {
                (Some(parent1), Some(parent2)) => parent1.element_type == parent2.element_type,
                (None, None) => true,
                _ => false,
            }
    }

    /// True when the other candidate's after-fragment merely uses a
    /// variable this candidate's after-fragment declares: the
    /// declaration site is the anchor for the rename.
    pub(crate) fn declares_variable_used_by(&self, other: &Mapping<'_>) -> bool {
        self.fragment2
            .variable_declarations()
            .iter()
            .any(|declaration| {
                other
                    .fragment2
                    .variables()
                    .iter()
                    .any(|v| v == &declaration.name)
            })
            || self
                .fragment1
                .variable_declarations()
                .iter()
                .any(|declaration| {
                    other
                        .fragment1
                        .variables()
                        .iter()
                        .any(|v| v == &declaration.name)
                })
    }

    /// Per-level normalized distances between the enclosing non-block
    /// parents of the two fragments, innermost first.
    pub(crate) fn parent_level_distances(&self) -> Vec<f64> {
        let parents1: Vec<_> = self.fragment1.parents().iter().collect();
        let parents2: Vec<_> = self.fragment2.parents().iter().collect();
        parents1
            .iter()
            .zip(parents2.iter())
            .map(|(parent1, parent2)| {
                text::normalized_distance(
                    &parent1.text.to_lowercase(),
                    &parent2.text.to_lowercase(),
                )
            })
            .collect()
    }

    pub(crate) fn identical_composite_children(&self) -> bool {
        !self.fragment1.children_texts().is_empty()
            && self.fragment1.children_texts() == self.fragment2.children_texts()
    }

    pub(crate) fn depth_difference(&self) -> usize {
        self.fragment1.depth().abs_diff(self.fragment2.depth())
    }

    pub(crate) fn index_difference(&self) -> usize {
        self.fragment1.index().abs_diff(self.fragment2.index())
    }

    /// True when the enclosing parents of the two fragments declare a
    /// variable of the same type.
    pub(crate) fn same_parent_declaration_type(&self) -> bool {
        let (Some(parent1), Some(parent2)) = (
            self.fragment1.non_block_parent(),
            self.fragment2.non_block_parent(),
        ) else {
            return false;
        };
        parent1.variable_declarations.iter().any(|declaration1| {
            parent2.variable_declarations.iter().any(|declaration2| {
                declaration1.type_name.is_some()
                    && declaration1.type_name == declaration2.type_name
            })
        })
    }

    /// Number of variable names shared by the enclosing parents.
    pub(crate) fn parent_variable_intersection(&self) -> usize {
        let (Some(parent1), Some(parent2)) = (
            self.fragment1.non_block_parent(),
            self.fragment2.non_block_parent(),
        ) else {
            return 0;
        };
        parent1
            .variables
            .iter()
            .filter(|v| parent2.variables.contains(v))
            .count()
    }

    pub(crate) fn line_sum(&self) -> usize {
        self.fragment1.location().line_sum() + self.fragment2.location().line_sum()
    }
}

/// Drives the matching of fragment pairs within one method-body
/// comparison.
pub struct Mapper<'a> {
    context: MatchContext<'a>,
}

impl<'a> Mapper<'a> {
    pub fn new(context: MatchContext<'a>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &MatchContext<'a> {
        &self.context
    }

    /// Attempts to map one fragment pair. `statements1`/`statements2`
    /// are the sibling statements of each side, consulted for
    /// declaration lookups during extract/inline detection.
    ///
    /// "No match" is a normal outcome; an error means the inputs
    /// violate the fragment contract.
    pub fn map(
        &self,
        fragment1: &'a Fragment,
        fragment2: &'a Fragment,
        statements1: &'a [Fragment],
        statements2: &'a [Fragment],
    ) -> Result<Mapping<'a>> {
        if fragment1.text().trim().is_empty() || fragment2.text().trim().is_empty() {
            return Err(EngineError::unsupported("fragment with empty text"));
        }

        let (argumentized1, argumentized2) = preprocess(fragment1, fragment2);

        if self.is_exact(fragment1, fragment2, &argumentized1, &argumentized2) {
            return Ok(Mapping {
                fragment1,
                fragment2,
                outcome: MatchOutcome::Exact,
                replacements: self.context.initial_replacements.clone(),
                refactorings: Vec::new(),
                identical_with_extracted_variable: false,
                identical_with_inlined_variable: false,
            });
        }

        let mut info = ReplacementInfo::new(argumentized1, argumentized2);
        info.add_replacements(self.context.initial_replacements.clone());
        let mut refactorings = Vec::new();
        let mapping_id = MappingId::new(*fragment1.location(), *fragment2.location());

        let matched = self.find_replacements(
            fragment1,
            fragment2,
            &mut info,
            &mut refactorings,
            mapping_id,
        );

        let matched = matched
            && conditionals::contains_valid_operator_replacements(&info)
            && !everything_replaced(fragment1, fragment2, &info);

        if !matched {
            debug!(
                fragment1 = fragment1.text(),
                fragment2 = fragment2.text(),
                "fragment pair left unmapped"
            );
            return Ok(Mapping {
                fragment1,
                fragment2,
                outcome: MatchOutcome::Unmatched,
                replacements: ReplacementSet::new(),
                refactorings: Vec::new(),
                identical_with_extracted_variable: false,
                identical_with_inlined_variable: false,
            });
        }

        let mut mapping = Mapping {
            fragment1,
            fragment2,
            outcome: MatchOutcome::Heuristic,
            replacements: info.into_replacements(),
            refactorings,
            identical_with_extracted_variable: false,
            identical_with_inlined_variable: false,
        };
        self.detect_extract_variable(&mut mapping, statements2);
        self.detect_inline_variable(&mut mapping, statements1);
        if mapping.identical_with_extracted_variable {
            mapping.outcome = MatchOutcome::ExtractVariable;
        } else if mapping.identical_with_inlined_variable {
            mapping.outcome = MatchOutcome::InlineVariable;
        }
        Ok(mapping)
    }

    /// Exactness short-circuit: equal argumentized strings, equal raw
    /// texts, equal covering-call normal forms, texts equal after a
    /// uniform type substitution or a `this.` strip, or an identity
    /// composite already covering the pair. Keyword statements are
    /// excluded: `return;` matches everything and means nothing.
    fn is_exact(
        &self,
        fragment1: &Fragment,
        fragment2: &Fragment,
        argumentized1: &str,
        argumentized2: &str,
    ) -> bool {
        if fragment1.is_keyword_statement() || fragment2.is_keyword_statement() {
            return false;
        }
        if argumentized1 == argumentized2 || fragment1.text() == fragment2.text() {
            return true;
        }
        if let (Some(call1), Some(call2)) =
            (fragment1.covering_call(), fragment2.covering_call())
        {
            let normal1 = text::strip_generics_after_dot(&call1.actual_string());
            let normal2 = text::strip_generics_after_dot(&call2.actual_string());
            if normal1 == normal2 {
                return true;
            }
        }
        let mut substituted = argumentized1.to_string();
        for replacement in self
            .context
            .initial_replacements
            .of_kind(ReplacementKind::Type)
        {
            substituted = text::replace_token(&substituted, &replacement.before, &replacement.after);
        }
        if substituted == argumentized2 {
            return true;
        }
        if argumentized1.replace("this.", "") == argumentized2.replace("this.", "") {
            return true;
        }
        self.context
            .initial_replacements
            .only_identity_composites()
            && self
                .context
                .initial_replacements
                .covering(argumentized1, argumentized2)
                .is_some()
    }

    /// The heuristic driver: element-category inference first, then the
    /// string heuristics in fixed order, then the call-model
    /// comparisons. Later entries read replacements written by earlier
    /// ones, so the order is part of the contract.
    fn find_replacements(
        &self,
        fragment1: &'a Fragment,
        fragment2: &'a Fragment,
        info: &mut ReplacementInfo,
        refactorings: &mut Vec<Refactoring>,
        mapping_id: MappingId,
    ) -> bool {
        infer_element_replacements(info, fragment1, fragment2);
        if info.raw_distance() == 0 {
            trace!("matched after element-category inference");
            return true;
        }

        if prefix_suffix::differ_only_in_cast(info)
            || prefix_suffix::differ_only_in_prefix_negation(info)
            || prefix_suffix::differ_only_in_this_prefix(info)
            || prefix_suffix::differ_only_in_final_modifier(info)
            || prefix_suffix::differ_only_in_increment_reflow(info)
            || prefix_suffix::differ_only_in_infix_operand(info)
            || prefix_suffix::differ_only_in_infix_operator(info, fragment1, fragment2)
            || prefix_suffix::equal_after_infix_expression_expansion(info)
            || prefix_suffix::differ_only_in_wrapped_call(info)
        {
            trace!("matched by prefix/suffix heuristic");
            return true;
        }

        if declarations::identical_variable_declarations_with_different_names(
            info, fragment1, fragment2,
        ) || declarations::declaration_vs_assignment(info, fragment1, fragment2)
            || declarations::declaration_vs_return(info, fragment1, fragment2)
            || declarations::default_initializer_equivalence(fragment1, fragment2)
            || declarations::catch_clause_rename(info, fragment1, fragment2)
        {
            trace!("matched by declaration heuristic");
            return true;
        }

        if conditionals::common_conditional(info, fragment1, fragment2, refactorings, mapping_id) {
            trace!("matched by conditional heuristic");
            return true;
        }

        if arguments::equal_after_argument_merge(info)
            || arguments::equal_after_new_argument_additions(info, &self.context)
        {
            trace!("matched by argument-cardinality heuristic");
            return true;
        }

        if concat::valid_statement_for_concat_comparison(fragment1, fragment2)
            && concat::common_concat(info, fragment1, fragment2)
        {
            trace!("matched by concatenation heuristic");
            return true;
        }

        self.compare_covering_calls(fragment1, fragment2, info)
    }

    /// Call-model comparisons between the covering calls of the two
    /// fragments, tried strict to loose.
    fn compare_covering_calls(
        &self,
        fragment1: &'a Fragment,
        fragment2: &'a Fragment,
        info: &mut ReplacementInfo,
    ) -> bool {
        match (fragment1.covering_call(), fragment2.covering_call()) {
            (Some(call1), Some(call2)) => self.compare_calls(call1, call2, info),
            (Some(call), None) => {
                if let Some(replacement) =
                    call.argument_wrapping_replacement(info.argumentized2())
                {
                    info.add_replacement(replacement);
                    return true;
                }
                false
            }
            (None, Some(call)) => {
                if let Some(replacement) =
                    call.argument_wrapping_replacement(info.argumentized1())
                {
                    info.add_replacement(replacement);
                    return true;
                }
                false
            }
            (None, None) => false,
        }
    }

    fn compare_calls(
        &self,
        call1: &Call,
        call2: &Call,
        info: &mut ReplacementInfo,
    ) -> bool {
        let parameter_map = &self.context.parameter_map;

        if call1.identical(call2, info.replacements(), parameter_map) {
            if !call1.equal_arguments(call2) {
                info.add_replacement(Replacement::new(
                    call1.arguments().join(","),
                    call2.arguments().join(","),
                    ReplacementKind::MethodInvocationArgument,
                ));
            }
            return true;
        }

        if call1.renamed_with_identical_arguments(call2, RENAME_DISTANCE_THRESHOLD)
            || call1.renamed_with_argument_intersection(call2, info.replacements(), parameter_map)
        {
            info.add_replacement(
                Replacement::new(
                    call1.name(),
                    call2.name(),
                    ReplacementKind::MethodInvocationName,
                )
                .with_detail(ReplacementDetail::Invocation {
                    before: call1.clone(),
                    after: call2.clone(),
                    direction: None,
                }),
            );
            return true;
        }

        if call1.only_different_invoker(call2) {
            info.add_replacement(Replacement::new(
                call1.receiver().unwrap_or_default(),
                call2.receiver().unwrap_or_default(),
                ReplacementKind::Invoker,
            ));
            return true;
        }

        if call1.reordered_arguments(call2) {
            info.add_replacement(
                Replacement::new(
                    call1.arguments().join(","),
                    call2.arguments().join(","),
                    ReplacementKind::SwapArgument,
                )
                .with_detail(ReplacementDetail::Swap {
                    before_call: call1.clone(),
                    after_call: call2.clone(),
                }),
            );
            return true;
        }

        if let Some((merged_variables, target)) =
            call1.merged_arguments(call2, info.replacements())
        {
            let before = merged_variables
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(",");
            for variable in &merged_variables {
                let rename =
                    Replacement::new(variable, target.clone(), ReplacementKind::VariableName);
                info.remove_replacement(&rename);
            }
            info.add_replacement(
                Replacement::new(before, target, ReplacementKind::MergeVariable)
                    .with_detail(ReplacementDetail::Merge { merged_variables }),
            );
            return true;
        }

        if call1.expression_became_argument(call2)
            || call1.collapsed_or_expanded_arguments(call2)
            || call1.equal_arguments_except_for_string_literals(call2)
                && call1.identical_name(call2)
        {
            info.add_replacement(Replacement::new(
                call1.actual_string(),
                call2.actual_string(),
                ReplacementKind::MethodInvocation,
            ));
            return true;
        }

        // A guarded log block flattened to (or wrapped around) the bare
        // log call it protects.
        if call1.guards_log_call(call2) || call2.guards_log_call(call1) {
            info.add_replacement(Replacement::new(
                call1.actual_string(),
                call2.actual_string(),
                ReplacementKind::MethodInvocation,
            ));
            return true;
        }

        false
    }

    /// Scans the final replacement set for one whose after-text is a
    /// variable declared on the after side with an initializer matching
    /// the before-text. Such a pair is an extract-variable refactoring,
    /// and the mapping counts as identical via the extracted variable.
    fn detect_extract_variable(&self, mapping: &mut Mapping<'a>, statements2: &'a [Fragment]) {
        let replacements: Vec<Replacement> = mapping.replacements.iter().cloned().collect();
        for replacement in &replacements {
            for declaration in declarations_visible(
                statements2,
                self.context.container2,
                mapping.fragment2,
            ) {
                if let Some(sub_mapping) =
                    initializer_match(&replacement.after, &replacement.before, declaration)
                {
                    let refactoring = Refactoring::extract_variable(
                        declaration.clone(),
                        mapping.id(),
                    )
                    .with_sub_expression_mapping(sub_mapping);
                    add_refactoring(&mut mapping.refactorings, refactoring);
                    mapping.identical_with_extracted_variable = true;
                }
            }
        }
    }

    /// The mirror image: a before-side declaration whose initializer
    /// matches the after-text of a replacement means the variable was
    /// inlined.
    fn detect_inline_variable(&self, mapping: &mut Mapping<'a>, statements1: &'a [Fragment]) {
        let replacements: Vec<Replacement> = mapping.replacements.iter().cloned().collect();
        for replacement in &replacements {
            for declaration in declarations_visible(
                statements1,
                self.context.container1,
                mapping.fragment1,
            ) {
                if let Some(sub_mapping) =
                    initializer_match(&replacement.before, &replacement.after, declaration)
                {
                    let refactoring = Refactoring::inline_variable(
                        declaration.clone(),
                        mapping.id(),
                    )
                    .with_sub_expression_mapping(SubExpressionMapping::new(
                        sub_mapping.after,
                        sub_mapping.before,
                    ));
                    add_refactoring(&mut mapping.refactorings, refactoring);
                    mapping.identical_with_inlined_variable = true;
                }
            }
        }
    }
}

/// Strips the `return ` wrapper when a statement is compared against a
/// bare expression, so `return x;` and `x` line up.
fn preprocess(fragment1: &Fragment, fragment2: &Fragment) -> (String, String) {
    use crate::fragment::CodeElementType::{Expression, ReturnStatement};
    let mut argumentized1 = fragment1.argumentized().to_string();
    let mut argumentized2 = fragment2.argumentized().to_string();
    match (fragment1.element_type(), fragment2.element_type()) {
        (ReturnStatement, Expression) => {
            argumentized1 = prefix_suffix::expression_core(&argumentized1).to_string();
        }
        (Expression, ReturnStatement) => {
            argumentized2 = prefix_suffix::expression_core(&argumentized2).to_string();
        }
        _ => {}
    }
    (argumentized1, argumentized2)
}

/// Declarations visible at `target`: those made by sibling statements
/// plus the container's own table, both filtered by scope subsumption.
fn declarations_visible<'a>(
    statements: &'a [Fragment],
    container: &'a crate::fragment::Container,
    target: &Fragment,
) -> Vec<&'a VariableDeclaration> {
    let mut result: Vec<&VariableDeclaration> = Vec::new();
    for statement in statements {
        for declaration in statement.variable_declarations() {
            if declaration.scope.subsumes(target.location()) {
                result.push(declaration);
            }
        }
    }
    for declaration in container.declarations_in_scope(target.location()) {
        if !result
            .iter()
            .any(|d| d.name == declaration.name && d.scope == declaration.scope)
        {
            result.push(declaration);
        }
    }
    result
}

/// Tests whether `variable_text` is (an access path rooted at) the
/// declared variable and `expression_text` matches its initializer:
/// exactly, as a dotted-suffix continuation, as a ternary branch, as a
/// getter-for-field token rewrite, or as a concatenation expansion.
fn initializer_match(
    variable_text: &str,
    expression_text: &str,
    declaration: &VariableDeclaration,
) -> Option<SubExpressionMapping> {
    let initializer = declaration.initializer.as_ref()?;
    let suffix = if variable_text == declaration.name {
        ""
    } else {
        variable_text.strip_prefix(&declaration.name)?
    };
    if !suffix.is_empty() && !suffix.starts_with('.') && !suffix.starts_with('[') {
        return None;
    }

    // Dotted-suffix continuation: `t.length()` vs `a.getX().length()`.
    let expected_full = format!("{}{}", initializer.text, suffix);
    if expression_text == expected_full
        || text::strip_parentheses(expression_text)
            == text::strip_parentheses(&expected_full)
    {
        return Some(SubExpressionMapping::new(
            expression_text,
            initializer.text.clone(),
        ));
    }
    if !suffix.is_empty() {
        return None;
    }

    // Ternary branch of the initializer.
    for ternary in &initializer.ternaries {
        if ternary.then_expression == expression_text
            || ternary.else_expression == expression_text
        {
            return Some(SubExpressionMapping::new(
                expression_text,
                initializer.text.clone(),
            ));
        }
    }

    // Field access vs getter call: `user.name` vs `user.getName()`.
    if getter_for_field(expression_text, &initializer.text)
        || getter_for_field(&initializer.text, expression_text)
    {
        return Some(SubExpressionMapping::new(
            expression_text,
            initializer.text.clone(),
        ));
    }

    // Concatenation expansion.
    if expression_text.contains('+')
        && initializer.text.contains('+')
        && crate::call::concatenated_match(expression_text, &initializer.text)
    {
        return Some(SubExpressionMapping::new(
            expression_text,
            initializer.text.clone(),
        ));
    }

    None
}

/// Token-for-token comparison of a field access against the
/// corresponding accessor call, ignoring the `get`/`is` prefix and
/// capitalization.
fn getter_for_field(field_access: &str, getter_call: &str) -> bool {
    let call = getter_call.strip_suffix("()").unwrap_or(getter_call);
    let field_tokens: Vec<String> = field_access
        .split('.')
        .flat_map(|part| text::camel_case_tokens(part))
        .map(|t| t.to_lowercase())
        .collect();
    let call_tokens: Vec<String> = call
        .split('.')
        .flat_map(|part| text::camel_case_tokens(part))
        .map(|t| t.to_lowercase())
        .filter(|t| t != "get" && t != "is")
        .collect();
    !field_tokens.is_empty() && getter_call.ends_with("()") && field_tokens == call_tokens
}

/// Element-category replacement inference: removes the elements common
/// to both fragments, then greedily substitutes each remaining element
/// of one side with the candidate of the other side that minimizes the
/// residual edit distance, recording a typed replacement per committed
/// substitution.
fn infer_element_replacements(
    info: &mut ReplacementInfo,
    fragment1: &Fragment,
    fragment2: &Fragment,
) {
    let call_strings1: Vec<String> = fragment1
        .invocations()
        .iter()
        .map(Call::actual_string)
        .collect();
    let call_strings2: Vec<String> = fragment2
        .invocations()
        .iter()
        .map(Call::actual_string)
        .collect();
    let creation_strings1: Vec<String> = fragment1
        .creations()
        .iter()
        .map(Call::actual_string)
        .collect();
    let creation_strings2: Vec<String> = fragment2
        .creations()
        .iter()
        .map(Call::actual_string)
        .collect();

    // Same-category passes first; cross-category variable passes read
    // what is left.
    let passes: [(&[String], &[String], ReplacementKind); 11] = [
        (
            fragment1.infix_operators(),
            fragment2.infix_operators(),
            ReplacementKind::InfixOperator,
        ),
        (fragment1.types(), fragment2.types(), ReplacementKind::Type),
        (
            fragment1.string_literals(),
            fragment2.string_literals(),
            ReplacementKind::StringLiteral,
        ),
        (
            fragment1.number_literals(),
            fragment2.number_literals(),
            ReplacementKind::NumberLiteral,
        ),
        (
            fragment1.boolean_literals(),
            fragment2.boolean_literals(),
            ReplacementKind::BooleanLiteral,
        ),
        (
            fragment1.null_literals(),
            fragment2.null_literals(),
            ReplacementKind::NullLiteral,
        ),
        (
            fragment1.variables(),
            fragment2.variables(),
            ReplacementKind::VariableName,
        ),
        (
            fragment1.array_accesses(),
            fragment2.array_accesses(),
            ReplacementKind::ArrayAccess,
        ),
        (
            fragment1.prefix_expressions(),
            fragment2.prefix_expressions(),
            ReplacementKind::PrefixExpression,
        ),
        (
            &call_strings1,
            &call_strings2,
            ReplacementKind::MethodInvocation,
        ),
        (
            &creation_strings1,
            &creation_strings2,
            ReplacementKind::ClassInstanceCreation,
        ),
    ];
    for (elements1, elements2, kind) in passes {
        greedy_substitute(info, elements1, elements2, kind);
    }

    // Cross-category: a variable traded for an invocation, array
    // access, prefix expression, ternary, or string literal.
    for variable in fragment1.variables() {
        let mut targets: Vec<(String, ReplacementKind)> = Vec::new();
        targets.extend(
            call_strings2
                .iter()
                .map(|c| (c.clone(), ReplacementKind::VariableReplacedWithInvocation)),
        );
        targets.extend(
            fragment2
                .array_accesses()
                .iter()
                .map(|a| (a.clone(), ReplacementKind::VariableReplacedWithArrayAccess)),
        );
        targets.extend(fragment2.prefix_expressions().iter().map(|p| {
            (
                p.clone(),
                ReplacementKind::VariableReplacedWithPrefixExpression,
            )
        }));
        targets.extend(fragment2.ternaries().iter().map(|t| {
            (
                format!("{}?{}:{}", t.condition, t.then_expression, t.else_expression),
                ReplacementKind::VariableReplacedWithTernary,
            )
        }));
        targets.extend(fragment2.string_literals().iter().filter_map(|literal| {
            (!fragment1.string_literals().contains(literal)).then(|| {
                (
                    literal.clone(),
                    ReplacementKind::VariableReplacedWithStringLiteral,
                )
            })
        }));
        targets.extend(fragment2.null_literals().iter().filter_map(|literal| {
            fragment1
                .null_literals()
                .is_empty()
                .then(|| (literal.clone(), ReplacementKind::NullLiteral))
        }));
        commit_best(info, variable, &targets);
    }
    // A null literal overwritten by a named value.
    for null_literal in fragment1.null_literals() {
        let targets: Vec<(String, ReplacementKind)> = fragment2
            .variables()
            .iter()
            .filter(|v| !fragment1.variables().contains(v))
            .map(|v| (v.clone(), ReplacementKind::NullLiteral))
            .collect();
        commit_best(info, null_literal, &targets);
    }
    // The opposite direction: an invocation collapsed into a variable.
    for call_string in &call_strings1 {
        let targets: Vec<(String, ReplacementKind)> = fragment2
            .variables()
            .iter()
            .filter(|v| !fragment1.variables().contains(v))
            .map(|v| {
                (
                    v.clone(),
                    ReplacementKind::VariableReplacedWithInvocation,
                )
            })
            .collect();
        commit_best(info, call_string, &targets);
    }
}

/// One same-category pass: for each unmatched element of the smaller
/// side, commit the substitution minimizing the residual distance,
/// provided it actually lowers it. Elements that also appear on the
/// other side (directly or under a `this.` prefix) are common ground
/// and never substituted.
fn greedy_substitute(
    info: &mut ReplacementInfo,
    elements1: &[String],
    elements2: &[String],
    kind: ReplacementKind,
) {
    let is_common = |element: &String| {
        elements2.contains(element)
            || elements2.contains(&format!("this.{element}"))
            || element
                .strip_prefix("this.")
                .is_some_and(|stripped| elements2.iter().any(|e| e == stripped))
    };
    let unmatched1: Vec<&String> = elements1.iter().filter(|e| !is_common(e)).collect();
    let unmatched2: Vec<&String> = elements2
        .iter()
        .filter(|e| !elements1.contains(e))
        .collect();
    let present1 = |info: &ReplacementInfo, element1: &String| {
        text::contains_token(info.argumentized1(), element1)
            || info.argumentized1().contains(element1.as_str())
    };

    // Enumerate the smaller side so every one of its elements gets a
    // chance at its best-fitting partner on the larger side.
    if unmatched2.len() < unmatched1.len() {
        let mut used1: Vec<&String> = Vec::new();
        for element2 in unmatched2 {
            let current = info.raw_distance();
            let mut best: Option<(&String, usize)> = None;
            for element1 in &unmatched1 {
                if used1.contains(element1) || !present1(info, element1) {
                    continue;
                }
                let candidate = info.distance_after(element1, element2);
                if candidate < current && best.map(|(_, d)| candidate < d).unwrap_or(true) {
                    best = Some((*element1, candidate));
                }
            }
            if let Some((element1, _)) = best {
                used1.push(element1);
                let kind = refine_kind(kind, element1, element2);
                info.apply(Replacement::new(element1.as_str(), element2, kind));
            }
        }
        return;
    }

    let mut used2: Vec<&String> = Vec::new();
    for element1 in unmatched1 {
        if !present1(info, element1) {
            continue;
        }
        let current = info.raw_distance();
        let mut best: Option<(&String, usize)> = None;
        for element2 in &unmatched2 {
            if used2.contains(element2) {
                continue;
            }
            let candidate = info.distance_after(element1, element2);
            if candidate < current && best.map(|(_, d)| candidate < d).unwrap_or(true) {
                best = Some((*element2, candidate));
            }
        }
        if let Some((element2, _)) = best {
            used2.push(element2);
            let kind = refine_kind(kind, element1, element2);
            info.apply(Replacement::new(element1, element2.as_str(), kind));
        }
    }
}

/// Invocation pairs that only changed the method name get the narrower
/// kind.
fn refine_kind(kind: ReplacementKind, element1: &str, element2: &str) -> ReplacementKind {
    if kind != ReplacementKind::MethodInvocation {
        return kind;
    }
    let name = |s: &str| -> Option<String> {
        let open = s.find('(')?;
        Some(s[..open].rsplit('.').next().unwrap_or(&s[..open]).to_string())
    };
    let arguments = |s: &str| -> Option<String> {
        let open = s.find('(')?;
        Some(s[open..].to_string())
    };
    if name(element1) != name(element2) && arguments(element1) == arguments(element2) {
        ReplacementKind::MethodInvocationName
    } else {
        kind
    }
}

/// Commits the best-scoring cross-category substitution for one source
/// element, if any candidate lowers the residual distance.
fn commit_best(
    info: &mut ReplacementInfo,
    element1: &str,
    targets: &[(String, ReplacementKind)],
) {
    if !text::contains_token(info.argumentized1(), element1)
        && !info.argumentized1().contains(element1)
    {
        return;
    }
    let current = info.raw_distance();
    let mut best: Option<(&str, ReplacementKind, usize)> = None;
    for (target, kind) in targets {
        let candidate = info.distance_after(element1, target);
        if candidate < current && best.map(|(_, _, d)| candidate < d).unwrap_or(true) {
            best = Some((target.as_str(), *kind, candidate));
        }
    }
    if let Some((target, kind, _)) = best {
        info.apply(Replacement::new(element1, target, kind));
    }
}

/// Sanity veto: a declaration (or creation) pair where the name, the
/// type, and the initializer were all replaced with incompatible
/// counterparts did not survive as "the same statement" no matter what
/// the textual rewrite says.
fn everything_replaced(
    fragment1: &Fragment,
    fragment2: &Fragment,
    info: &ReplacementInfo,
) -> bool {
    let (Some(declaration1), Some(declaration2)) = (
        fragment1.variable_declarations().first(),
        fragment2.variable_declarations().first(),
    ) else {
        return false;
    };
    if declaration1.name == declaration2.name {
        return false;
    }
    let (Some(type1), Some(type2)) = (&declaration1.type_name, &declaration2.type_name) else {
        return false;
    };
    if type1 == type2 || compatible_types(type1, type2) {
        return false;
    }
    let (Some(initializer1), Some(initializer2)) = (
        &declaration1.initializer,
        &declaration2.initializer,
    ) else {
        return false;
    };
    if initializer1.text == initializer2.text {
        return false;
    }
    // All three differ; the pair only matched because replacements
    // rewrote each part.
    let name_replaced = info
        .replacements()
        .iter()
        .any(|r| r.before == declaration1.name && r.after == declaration2.name);
    name_replaced
        || info
            .replacements()
            .covering(&initializer1.text, &initializer2.text)
            .is_some()
}

/// Types count as compatible when their camel-case token sets overlap.
fn compatible_types(type1: &str, type2: &str) -> bool {
    let tokens1: Vec<String> = text::camel_case_tokens(type1)
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let tokens2: Vec<String> = text::camel_case_tokens(type2)
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    tokens1.iter().any(|t| tokens2.contains(t))
}
