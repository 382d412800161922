//! Bundled platform tools. The analysis engine never depends on any specific
//! tool here; these ship with the host the way an IDE ships its inspections.

pub mod common;
pub mod java;
pub mod kotlin;

use std::sync::Arc;

use crate::inspect::{ToolRegistry, ToolScope};

pub fn register_bundled(registry: &mut ToolRegistry) {
    registry.register(ToolScope::Local, Arc::new(kotlin::VarCouldBeValInspection));
    registry.register(
        ToolScope::Local,
        Arc::new(kotlin::RedundantVisibilityModifierInspection),
    );
    registry.register(ToolScope::Local, Arc::new(java::EmptyCatchBlockInspection));
    registry.register(ToolScope::Local, Arc::new(common::TodoCommentInspection));
    registry.register(ToolScope::GlobalSimple, Arc::new(common::LineLengthInspection));
    registry.register(
        ToolScope::UnsupportedGlobal,
        Arc::new(common::DuplicateCodeInspection),
    );
}
