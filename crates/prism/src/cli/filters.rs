//! The `prism filters` command: list the filter catalog.

use prism_core::{Config, Filter, CATALOG};

/// Print the catalog with in-process/external annotation.
pub fn execute(config: &Config) -> anyhow::Result<()> {
    println!("Available filters:");
    for name in CATALOG {
        // parse cannot fail for catalog names
        let filter = Filter::parse(name, 1, &config.external)?;
        let kind = if filter.is_external() {
            "external"
        } else {
            "in-process"
        };
        println!("  {name:<10} {kind}");
    }
    Ok(())
}
