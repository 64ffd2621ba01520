//! Version command handler

use crate::validators::{CheckRegistry, Pipeline};

/// Version line plus the built-in checks and pipelines
pub fn version_text() -> String {
    let registry = CheckRegistry::with_builtin_checks();
    let checks = registry
        .all()
        .iter()
        .map(|check| format!("    {:<36} {}\n", check.name(), check.description()))
        .collect::<String>();

    format!(
        "gitops-validator {}\n  {}\n  License: {}\n\n  Checks:\n{}\n  Pipelines: {}\n",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_LICENSE"),
        checks,
        Pipeline::names().join(", ")
    )
}

/// Display version information
pub fn display_version() {
    print!("{}", version_text());
}
