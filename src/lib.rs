//! # Fragmatch
//!
//! A statement and expression fragment-matching engine for diffing two
//! versions of a method body.
//!
//! This crate provides the building blocks for:
//! - Modeling code fragments, calls, and variable declarations as
//!   language-neutral values
//! - Matching fragment pairs through a fixed chain of string heuristics
//! - Accumulating typed replacements that explain each accepted edit
//! - Inferring extract/inline-variable and conditional refactorings as a
//!   byproduct of matching
//! - Ranking competing candidate mappings with an ordered rule table
//!
//! ## Quick Start
//!
//! ```rust
//! use fragmatch::prelude::*;
//!
//! let before_container = Container::new("total", "Invoice");
//! let after_container = Container::new("total", "Invoice");
//! let mapper = Mapper::new(MatchContext::new(&before_container, &after_container));
//!
//! let before = Fragment::new(
//!     "amount = base + tax;",
//!     CodeElementType::ExpressionStatement,
//!     Location::new(3, 3, 40, 60),
//! )
//! .with_variable("amount")
//! .with_variable("base")
//! .with_variable("tax");
//! let after = Fragment::new(
//!     "amount = base + vat;",
//!     CodeElementType::ExpressionStatement,
//!     Location::new(3, 3, 40, 60),
//! )
//! .with_variable("amount")
//! .with_variable("base")
//! .with_variable("vat");
//!
//! let mapping = mapper.map(&before, &after, &[], &[])?;
//! assert!(mapping.is_matched());
//! assert!(mapping.replacements().covering("tax", "vat").is_some());
//! # Ok::<(), fragmatch::error::EngineError>(())
//! ```
//!
//! ## Ranking Candidates
//!
//! When several after-side fragments compete for the same before-side
//! fragment, [`mapping::ordering::compare`] decides:
//!
//! ```rust
//! use fragmatch::mapping::ordering;
//! use fragmatch::prelude::*;
//!
//! let before_container = Container::new("run", "Job");
//! let after_container = Container::new("run", "Job");
//! let mapper = Mapper::new(MatchContext::new(&before_container, &after_container));
//!
//! let fragment = Fragment::new(
//!     "log.close();",
//!     CodeElementType::ExpressionStatement,
//!     Location::new(2, 2, 10, 22),
//! );
//! let near = Fragment::new(
//!     "log.close();",
//!     CodeElementType::ExpressionStatement,
//!     Location::new(3, 3, 30, 42),
//! );
//! let far = Fragment::new(
//!     "log.close();",
//!     CodeElementType::ExpressionStatement,
//!     Location::new(90, 90, 900, 912),
//! );
//!
//! let candidates = vec![
//!     mapper.map(&fragment, &near, &[], &[])?,
//!     mapper.map(&fragment, &far, &[], &[])?,
//! ];
//! let winner = ordering::best(&candidates).unwrap();
//! assert_eq!(winner.fragment2().location().start_line, 3);
//! # Ok::<(), fragmatch::error::EngineError>(())
//! ```

pub mod call;
pub mod error;
pub mod fragment;
pub mod heuristics;
pub mod mapping;
pub mod refactoring;
pub mod replacement;
pub mod text;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::call::{Call, CallKind, Coverage, ParameterMap};
    pub use crate::error::{EngineError, Result};
    pub use crate::fragment::{
        CodeElementType, Container, Fragment, Initializer, Location, Parameter, ParentNode,
        Ternary, VariableDeclaration,
    };
    pub use crate::heuristics::MatchContext;
    pub use crate::mapping::{Mapper, Mapping, MatchOutcome};
    pub use crate::refactoring::{
        MappingId, Refactoring, RefactoringKind, SubExpressionMapping,
    };
    pub use crate::replacement::{
        Direction, Replacement, ReplacementDetail, ReplacementInfo, ReplacementKind,
        ReplacementSet,
    };
}

pub use prelude::*;
