use anyhow::Result;
use colored::*;
use convoy_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    let result = manager.list_packages();

    println!("{}", "Packages".bold().underline());

    let mut packages: Vec<_> = result.packages.iter().collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    if packages.is_empty() {
        println!("  {}", "No packages found".dimmed());
        return Ok(());
    }

    for package in packages {
        println!(
            "{} {}",
            package.name.blue().bold(),
            package.path.display().to_string().dimmed()
        );
    }

    Ok(())
}
