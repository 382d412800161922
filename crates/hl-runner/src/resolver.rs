use std::sync::Arc;

use hl_core::{Error, InspectionPlan, ProblemLevel, Result};
use hl_host::{InspectionProfile, InspectionTool, Project, RegisteredTool, ToolRegistry, ToolScope};

use crate::logger::ProxyLogger;

const DEFAULT_PROFILE_FILE: &str = "Project_Default.xml";

/// One inspection selected for the run, with its working severity decided at
/// resolution time.
#[derive(Clone)]
pub struct ResolvedTool {
    pub registered: RegisteredTool,
    /// The name it was configured under (explicit mode) or the profile entry
    /// class (inherited mode).
    pub name: String,
    pub level: Option<ProblemLevel>,
    pub quick_fix: bool,
}

impl ResolvedTool {
    pub fn tool(&self) -> &Arc<dyn InspectionTool> {
        &self.registered.tool
    }

    pub fn class_name(&self) -> &'static str {
        self.registered.class_name()
    }

    pub fn scope(&self) -> ToolScope {
        self.registered.scope
    }
}

/// Decide the working set of inspections from the plan.
///
/// Explicit mode builds the set from the three severity buckets and fails on
/// the first name the registrar cannot resolve. Inherited mode loads a
/// profile (named file under `.idea/inspectionProfiles`, else the host's
/// current profile) and takes every enabled entry at the profile's level.
pub fn resolve_tools(
    registry: &ToolRegistry,
    plan: &InspectionPlan,
    project: &Project,
    logger: &ProxyLogger,
) -> Result<Vec<ResolvedTool>> {
    logger.info(&format!("InheritFromIdea = {}", plan.inherit_from_idea));
    if plan.inherit_from_idea {
        resolve_from_profile(registry, plan, project, logger)
    } else {
        resolve_explicit(registry, plan, logger)
    }
}

fn resolve_explicit(
    registry: &ToolRegistry,
    plan: &InspectionPlan,
    logger: &ProxyLogger,
) -> Result<Vec<ResolvedTool>> {
    let names = |set: &hl_core::InspectionSet| {
        set.inspections.keys().cloned().collect::<Vec<_>>().join(", ")
    };
    logger.info(&format!("Error inspections: [{}]", names(&plan.errors)));
    logger.info(&format!("Warning inspections: [{}]", names(&plan.warnings)));
    logger.info(&format!("Info inspections: [{}]", names(&plan.info)));

    let specs = plan.all_inspections();
    let levels = plan.configured_levels();
    let mut resolved = Vec::new();
    for (name, spec) in specs {
        let registered = registry
            .find(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        resolved.push(ResolvedTool {
            registered: registered.clone(),
            name: name.to_string(),
            level: levels.get(name).copied(),
            quick_fix: spec.quick_fix,
        });
    }
    Ok(resolved)
}

fn resolve_from_profile(
    registry: &ToolRegistry,
    plan: &InspectionPlan,
    project: &Project,
    logger: &ProxyLogger,
) -> Result<Vec<ResolvedTool>> {
    let file_name = plan
        .profile_name
        .clone()
        .unwrap_or_else(|| DEFAULT_PROFILE_FILE.to_string());
    let profile_path = project.profiles_dir().join(&file_name);
    let profile = if profile_path.is_file() {
        InspectionProfile::load(&profile_path)?
    } else {
        InspectionProfile::from_registry(registry)
    };
    logger.info(&format!("Profile file = {}", profile.name));

    let specs = plan.all_inspections();
    let mut resolved = Vec::new();
    for entry in profile.enabled_entries() {
        let Some(registered) = registry.find(&entry.class) else {
            logger.warn(&format!(
                "Profile tool '{}' is not found in registrar, skipped",
                entry.class
            ));
            continue;
        };
        let quick_fix = specs
            .get(entry.class.as_str())
            .map(|spec| spec.quick_fix)
            .unwrap_or(false);
        resolved.push(ResolvedTool {
            registered: registered.clone(),
            name: entry.class.clone(),
            level: entry.level,
            quick_fix,
        });
    }
    Ok(resolved)
}
