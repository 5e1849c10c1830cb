//! Stateless string-based heuristics.
//!
//! Each heuristic inspects the two fragment strings (plus surrounding
//! context) and either records replacements in the shared accumulator
//! and reports a match, or leaves the accumulator untouched and reports
//! no match. No heuristic ever rejects a pair outright; failure simply
//! defers to the next heuristic in the mapper's fixed order.

pub mod arguments;
pub mod concat;
pub mod conditionals;
pub mod declarations;
pub mod prefix_suffix;

use crate::call::ParameterMap;
use crate::fragment::Container;
use crate::replacement::ReplacementSet;

/// Read-only context shared by all heuristics for one method-body
/// comparison.
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
    pub container1: &'a Container,
    pub container2: &'a Container,
    pub parameter_map: ParameterMap,
    pub initial_replacements: ReplacementSet,
}

impl<'a> MatchContext<'a> {
    pub fn new(container1: &'a Container, container2: &'a Container) -> Self {
        Self {
            container1,
            container2,
            parameter_map: ParameterMap::new(),
            initial_replacements: ReplacementSet::new(),
        }
    }

    pub fn with_parameter_mapping(
        mut self,
        parameter: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        self.parameter_map.insert(parameter.into(), argument.into());
        self
    }

    pub fn with_initial_replacements(mut self, replacements: ReplacementSet) -> Self {
        self.initial_replacements = replacements;
        self
    }

    /// True when `name` is a parameter, attribute, or known local of the
    /// after-side container.
    pub fn known_name_after(&self, name: &str) -> bool {
        self.container2.parameters.iter().any(|p| p.name == name)
            || self.container2.attributes.iter().any(|a| a == name)
            || self.container2.declaration_of(name).is_some()
    }

    /// True when `name` is a parameter, attribute, or known local of the
    /// before-side container.
    pub fn known_name_before(&self, name: &str) -> bool {
        self.container1.parameters.iter().any(|p| p.name == name)
            || self.container1.attributes.iter().any(|a| a == name)
            || self.container1.declaration_of(name).is_some()
    }
}
