//! The fragment data model: statements, expressions, their extracted
//! sub-elements, and the containers (methods/constructors) that own them.
//!
//! Fragments are built by an external parser front-end and consumed
//! read-only by the matching engine. Builder methods keep construction
//! ergonomic for front-ends and tests.

use serde::{Deserialize, Serialize};

use crate::call::Call;

/// Syntactic kind of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeElementType {
    ExpressionStatement,
    VariableDeclarationStatement,
    ReturnStatement,
    ThrowStatement,
    IfStatement,
    ForStatement,
    EnhancedForStatement,
    WhileStatement,
    DoStatement,
    SwitchStatement,
    SwitchCase,
    TryStatement,
    CatchClause,
    FinallyBlock,
    SynchronizedStatement,
    Block,
    BreakStatement,
    ContinueStatement,
    LabeledStatement,
    AssertStatement,
    EmptyStatement,
    Expression,
    LambdaExpressionBody,
}

impl CodeElementType {
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            CodeElementType::ForStatement
                | CodeElementType::EnhancedForStatement
                | CodeElementType::WhileStatement
                | CodeElementType::DoStatement
        )
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            CodeElementType::IfStatement
                | CodeElementType::SwitchStatement
                | CodeElementType::TryStatement
                | CodeElementType::CatchClause
                | CodeElementType::FinallyBlock
                | CodeElementType::SynchronizedStatement
                | CodeElementType::Block
                | CodeElementType::LabeledStatement
        ) || self.is_loop()
    }
}

/// Source span of a fragment. Offsets are byte offsets in the original
/// compilation unit; lines are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Location {
    pub fn new(start_line: usize, end_line: usize, start_offset: usize, end_offset: usize) -> Self {
        Self {
            start_line,
            end_line,
            start_offset,
            end_offset,
        }
    }

    /// True when this span fully contains `other`.
    pub fn subsumes(&self, other: &Location) -> bool {
        self.start_offset <= other.start_offset && self.end_offset >= other.end_offset
    }

    /// True when this span ends before `other` begins.
    pub fn before(&self, other: &Location) -> bool {
        self.end_offset <= other.start_offset
    }

    pub fn line_sum(&self) -> usize {
        self.start_line + self.end_line
    }
}

/// A ternary expression extracted from a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ternary {
    pub condition: String,
    pub then_expression: String,
    pub else_expression: String,
}

impl Ternary {
    pub fn new(
        condition: impl Into<String>,
        then_expression: impl Into<String>,
        else_expression: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            then_expression: then_expression.into(),
            else_expression: else_expression.into(),
        }
    }
}

/// Initializer expression of a variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<Call>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ternaries: Vec<Ternary>,
}

impl Initializer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Vec::new(),
            ternaries: Vec::new(),
        }
    }

    pub fn with_call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    pub fn with_ternary(mut self, ternary: Ternary) -> Self {
        self.ternaries.push(ternary);
        self
    }
}

/// A variable declaration with its scope, visible to the matching engine
/// for rename, extract and inline detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
    pub scope: Location,
    #[serde(default)]
    pub is_final: bool,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, scope: Location) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            initializer: None,
            scope,
            is_final: false,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}

/// One enclosing composite of a fragment, innermost first.
///
/// The engine never walks a real tree; the front-end flattens the
/// enclosing chain into this list when it builds the fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentNode {
    pub text: String,
    pub element_type: CodeElementType,
    pub depth: usize,
    pub index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_declarations: Vec<VariableDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
}

impl ParentNode {
    pub fn new(text: impl Into<String>, element_type: CodeElementType) -> Self {
        Self {
            text: text.into(),
            element_type,
            depth: 0,
            index: 0,
            variable_declarations: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn at(mut self, depth: usize, index: usize) -> Self {
        self.depth = depth;
        self.index = index;
        self
    }

    pub fn with_variable_declaration(mut self, declaration: VariableDeclaration) -> Self {
        self.variable_declarations.push(declaration);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(name.into());
        self
    }
}

/// One statement or expression, with its pre-extracted sub-elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    text: String,
    argumentized: String,
    element_type: CodeElementType,
    location: Location,
    depth: usize,
    index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variables: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variable_declarations: Vec<VariableDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    invocations: Vec<Call>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    creations: Vec<Call>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    string_literals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    number_literals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    boolean_literals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    null_literals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    infix_operators: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    infix_expressions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    prefix_expressions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    array_accesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ternaries: Vec<Ternary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    text_blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children_texts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parents: Vec<ParentNode>,
}

impl Fragment {
    /// Creates a leaf fragment. The argumentized form defaults to the raw
    /// text until `with_argumentized` overrides it.
    pub fn new(
        text: impl Into<String>,
        element_type: CodeElementType,
        location: Location,
    ) -> Self {
        let text = text.into();
        Self {
            argumentized: text.clone(),
            text,
            element_type,
            location,
            depth: 0,
            index: 0,
            variables: Vec::new(),
            types: Vec::new(),
            variable_declarations: Vec::new(),
            invocations: Vec::new(),
            creations: Vec::new(),
            string_literals: Vec::new(),
            number_literals: Vec::new(),
            boolean_literals: Vec::new(),
            null_literals: Vec::new(),
            infix_operators: Vec::new(),
            infix_expressions: Vec::new(),
            prefix_expressions: Vec::new(),
            array_accesses: Vec::new(),
            ternaries: Vec::new(),
            text_blocks: Vec::new(),
            children_texts: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn with_argumentized(mut self, argumentized: impl Into<String>) -> Self {
        self.argumentized = argumentized.into();
        self
    }

    pub fn at(mut self, depth: usize, index: usize) -> Self {
        self.depth = depth;
        self.index = index;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(name.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    pub fn with_variable_declaration(mut self, declaration: VariableDeclaration) -> Self {
        self.variable_declarations.push(declaration);
        self
    }

    pub fn with_invocation(mut self, call: Call) -> Self {
        self.invocations.push(call);
        self
    }

    pub fn with_creation(mut self, call: Call) -> Self {
        self.creations.push(call);
        self
    }

    pub fn with_string_literal(mut self, literal: impl Into<String>) -> Self {
        self.string_literals.push(literal.into());
        self
    }

    pub fn with_number_literal(mut self, literal: impl Into<String>) -> Self {
        self.number_literals.push(literal.into());
        self
    }

    pub fn with_boolean_literal(mut self, literal: impl Into<String>) -> Self {
        self.boolean_literals.push(literal.into());
        self
    }

    pub fn with_null_literal(mut self) -> Self {
        self.null_literals.push("null".to_string());
        self
    }

    pub fn with_infix_operator(mut self, operator: impl Into<String>) -> Self {
        self.infix_operators.push(operator.into());
        self
    }

    pub fn with_infix_expression(mut self, expression: impl Into<String>) -> Self {
        self.infix_expressions.push(expression.into());
        self
    }

    pub fn with_prefix_expression(mut self, expression: impl Into<String>) -> Self {
        self.prefix_expressions.push(expression.into());
        self
    }

    pub fn with_array_access(mut self, access: impl Into<String>) -> Self {
        self.array_accesses.push(access.into());
        self
    }

    pub fn with_ternary(mut self, ternary: Ternary) -> Self {
        self.ternaries.push(ternary);
        self
    }

    pub fn with_text_block(mut self, block: impl Into<String>) -> Self {
        self.text_blocks.push(block.into());
        self
    }

    pub fn with_child_text(mut self, text: impl Into<String>) -> Self {
        self.children_texts.push(text.into());
        self
    }

    pub fn with_parent(mut self, parent: ParentNode) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn argumentized(&self) -> &str {
        &self.argumentized
    }

    pub fn element_type(&self) -> CodeElementType {
        self.element_type
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn variable_declarations(&self) -> &[VariableDeclaration] {
        &self.variable_declarations
    }

    pub fn invocations(&self) -> &[Call] {
        &self.invocations
    }

    pub fn creations(&self) -> &[Call] {
        &self.creations
    }

    pub fn string_literals(&self) -> &[String] {
        &self.string_literals
    }

    pub fn number_literals(&self) -> &[String] {
        &self.number_literals
    }

    pub fn boolean_literals(&self) -> &[String] {
        &self.boolean_literals
    }

    pub fn null_literals(&self) -> &[String] {
        &self.null_literals
    }

    pub fn infix_operators(&self) -> &[String] {
        &self.infix_operators
    }

    pub fn infix_expressions(&self) -> &[String] {
        &self.infix_expressions
    }

    pub fn prefix_expressions(&self) -> &[String] {
        &self.prefix_expressions
    }

    pub fn array_accesses(&self) -> &[String] {
        &self.array_accesses
    }

    pub fn ternaries(&self) -> &[Ternary] {
        &self.ternaries
    }

    pub fn text_blocks(&self) -> &[String] {
        &self.text_blocks
    }

    pub fn children_texts(&self) -> &[String] {
        &self.children_texts
    }

    pub fn parents(&self) -> &[ParentNode] {
        &self.parents
    }

    /// The innermost enclosing composite that is not a plain block.
    pub fn non_block_parent(&self) -> Option<&ParentNode> {
        self.parents
            .iter()
            .find(|p| p.element_type != CodeElementType::Block)
    }

    /// Number of enclosing if-statements.
    pub fn enclosing_if_count(&self) -> usize {
        self.parents
            .iter()
            .filter(|p| p.element_type == CodeElementType::IfStatement)
            .count()
    }

    /// The single call (invocation or creation) covering the whole
    /// fragment, if any.
    pub fn covering_call(&self) -> Option<&Call> {
        self.invocations
            .iter()
            .chain(self.creations.iter())
            .find(|c| c.coverage().covers_statement())
    }

    /// Finds the variable declaration for `name`, if this fragment
    /// declares it.
    pub fn declaration_of(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variable_declarations.iter().find(|d| d.name == name)
    }

    /// `return;`, `break;` and `continue;` match everywhere and carry no
    /// signal, so exactness checks exclude them.
    pub fn is_keyword_statement(&self) -> bool {
        matches!(self.text.trim(), "return;" | "break;" | "continue;")
    }

    /// True for a statement of the form `if (...)`, at any nesting.
    pub fn is_if_statement(&self) -> bool {
        self.element_type == CodeElementType::IfStatement
    }

    /// The condition text of an if/while statement, when the front-end
    /// stored the composite header as the fragment text.
    pub fn condition_text(&self) -> Option<&str> {
        match self.element_type {
            CodeElementType::IfStatement | CodeElementType::WhileStatement => {
                let trimmed = self.text.trim();
                let open = trimmed.find('(')?;
                let close = trimmed.rfind(')')?;
                if open < close {
                    Some(trimmed[open + 1..close].trim())
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Name and type of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The method or constructor owning one side of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub class_name: String,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<VariableDeclaration>,
}

impl Container {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    pub fn constructor(mut self) -> Self {
        self.is_constructor = true;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    pub fn with_declaration(mut self, declaration: VariableDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn parameter_type_of(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.type_name.as_str())
    }

    /// Declarations whose scope covers `location`.
    pub fn declarations_in_scope(&self, location: &Location) -> Vec<&VariableDeclaration> {
        self.declarations
            .iter()
            .filter(|d| d.scope.subsumes(location))
            .collect()
    }

    pub fn declaration_of(&self, name: &str) -> Option<&VariableDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_subsumes() {
        let outer = Location::new(1, 10, 0, 200);
        let inner = Location::new(3, 4, 50, 80);
        assert!(outer.subsumes(&inner));
        assert!(!inner.subsumes(&outer));
    }

    #[test]
    fn test_fragment_builder() {
        let fragment = Fragment::new(
            "return name;",
            CodeElementType::ReturnStatement,
            Location::new(5, 5, 100, 112),
        )
        .at(2, 3)
        .with_variable("name");

        assert_eq!(fragment.text(), "return name;");
        assert_eq!(fragment.argumentized(), "return name;");
        assert_eq!(fragment.depth(), 2);
        assert_eq!(fragment.index(), 3);
        assert_eq!(fragment.variables(), ["name".to_string()]);
    }

    #[test]
    fn test_keyword_statement() {
        let fragment = Fragment::new(
            "return;",
            CodeElementType::ReturnStatement,
            Location::default(),
        );
        assert!(fragment.is_keyword_statement());

        let other = Fragment::new(
            "return x;",
            CodeElementType::ReturnStatement,
            Location::default(),
        );
        assert!(!other.is_keyword_statement());
    }

    #[test]
    fn test_condition_text() {
        let fragment = Fragment::new(
            "if(a == b)",
            CodeElementType::IfStatement,
            Location::default(),
        );
        assert_eq!(fragment.condition_text(), Some("a == b"));
    }

    #[test]
    fn test_declarations_in_scope() {
        let container = Container::new("compute", "Calculator")
            .with_declaration(
                VariableDeclaration::new("t", Location::new(1, 10, 0, 300))
                    .with_initializer(Initializer::new("a.getX()")),
            )
            .with_declaration(VariableDeclaration::new("u", Location::new(8, 9, 250, 290)));

        let target = Location::new(4, 4, 120, 140);
        let visible = container.declarations_in_scope(&target);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "t");
    }
}
