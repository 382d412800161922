pub mod html;
pub mod xml;

use std::collections::HashMap;

use hl_core::{InspectionPlan, ProblemLevel};

use crate::logger::ProxyLogger;
use crate::problems::PinnedProblem;

pub use html::HtmlReport;
pub use xml::XmlReport;

/// Push-based report sink: one `report` call per surviving problem in sorted
/// order, then one `generate` to flush the document to disk.
pub trait ReportGenerator {
    fn report(&mut self, problem: &PinnedProblem, inspection_class: &str);
    fn generate(&mut self) -> anyhow::Result<()>;
}

/// Order problems for deterministic output: sort by (line, row), then group
/// by file in order of each file's first problem.
pub fn sorted_for_report<'a>(
    results: &'a [(String, Vec<PinnedProblem>)],
) -> Vec<(&'a str, &'a PinnedProblem)> {
    let mut pairs: Vec<(&str, &PinnedProblem)> = results
        .iter()
        .flat_map(|(class, problems)| problems.iter().map(move |p| (class.as_str(), p)))
        .collect();
    pairs.sort_by_key(|(_, p)| p.sort_key());

    let mut file_order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<(&str, &PinnedProblem)>> = HashMap::new();
    for (class, problem) in pairs {
        let file = problem.file_name.as_str();
        if !groups.contains_key(file) {
            file_order.push(file);
        }
        groups.entry(file).or_default().push((class, problem));
    }

    file_order
        .into_iter()
        .flat_map(|file| groups.remove(file).unwrap_or_default())
        .collect()
}

/// Emit one problem to the wire logger at its severity's level. This line
/// format is a stable output surface.
pub fn log_problem(logger: &ProxyLogger, problem: &PinnedProblem) {
    let line = format!("{}: {}", problem.level, problem.render());
    match problem.level {
        ProblemLevel::Info => logger.info(&line),
        ProblemLevel::Warning | ProblemLevel::WeakWarning => logger.warn(&line),
        ProblemLevel::Error => logger.error(&line),
    }
}

/// Report every collected problem: log lines (unless quiet) plus the
/// configured XML/HTML generators.
pub fn report_problems(
    plan: &InspectionPlan,
    results: &[(String, Vec<PinnedProblem>)],
    logger: &ProxyLogger,
) -> anyhow::Result<()> {
    let total: usize = results.iter().map(|(_, problems)| problems.len()).sum();
    logger.info(&format!("Total of {total} problem(s) found"));

    let mut generators: Vec<Box<dyn ReportGenerator>> = Vec::new();
    if let Some(target) = &plan.report_parameters.xml {
        generators.push(Box::new(XmlReport::new(target.path.clone())));
    }
    if let Some(target) = &plan.report_parameters.html {
        generators.push(Box::new(HtmlReport::new(target.path.clone())));
    }

    for (class, problem) in sorted_for_report(results) {
        if !plan.report_parameters.is_quiet {
            log_problem(logger, problem);
        }
        for generator in &mut generators {
            generator.report(problem, class);
        }
    }
    for generator in &mut generators {
        generator.generate()?;
    }
    Ok(())
}

/// Escape text for XML/HTML bodies and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
