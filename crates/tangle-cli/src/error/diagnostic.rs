//! Miette diagnostic conversion for CLI errors.

use std::fmt::Write as _;

use miette::Report;
use tangle_graph::{CrawlError, ModuleError, ModuleName};

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Crawl(e) => crawl_error_to_miette(e),
        CliError::Config(e) => miette::miette!(
            "Configuration error: {}\n\nHint: Check tangle.toml and TANGLE_* environment variables",
            e
        ),
        CliError::InvalidModule(e) => miette::miette!(
            "{}\n\nHint: Module names are dot-separated segments that start with an uppercase letter, like Json.Decode",
            e
        ),
        CliError::Output { path, source } => {
            miette::miette!("Failed to write {}: {:#}", path.display(), source)
        }
        other => miette::miette!("{}", other),
    }
}

/// Convert CrawlError to miette Report
pub fn crawl_error_to_miette(err: CrawlError) -> Report {
    match &err {
        CrawlError::NoRoots => miette::miette!(
            "No root modules to crawl\n\nHint: Pass module names, or set entry-modules / exposed-modules in tangle.toml"
        ),
        CrawlError::Modules { problems, .. } => {
            let mut message = format!("{} module(s) could not be resolved:\n", problems.len());
            for (name, problem) in problems {
                let _ = write!(message, "\n  {name}: {problem}");
                let chain = err.import_chain(name);
                if chain.len() > 1 {
                    let _ = write!(message, "\n    imported via {}", render_chain(&chain));
                }
                if let Some(hint) = hint_for(problem) {
                    let _ = write!(message, "\n    hint: {hint}");
                }
            }
            miette::miette!("{}", message)
        }
        CrawlError::Cycle(cycle) => miette::miette!(
            "Import cycle detected:\n\n  {}\n\nHint: Move the shared definitions into a module that none of these import",
            render_chain(&closed(&cycle.modules))
        ),
    }
}

fn closed(modules: &[ModuleName]) -> Vec<ModuleName> {
    let mut path = modules.to_vec();
    if let Some(first) = modules.first() {
        path.push(first.clone());
    }
    path
}

fn render_chain(chain: &[ModuleName]) -> String {
    chain
        .iter()
        .map(ModuleName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn hint_for(problem: &ModuleError) -> Option<&'static str> {
    match problem {
        ModuleError::BadName { .. } => Some("rename the file or fix the module declaration"),
        ModuleError::PortsInPackage { .. } => Some("port modules are only allowed in applications"),
        ModuleError::EffectsUnexpected { .. } => {
            Some("set effect-modules = true in tangle.toml to allow effect modules")
        }
        _ => None,
    }
}
