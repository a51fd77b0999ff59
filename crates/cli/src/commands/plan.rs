use anyhow::Result;
use colored::*;
use convoy_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, exempt: Option<&str>) -> Result<()> {
    println!("{}", "Execution plan".bold());

    let plan = manager
        .execution_plan(exempt)
        .map_err(|e| anyhow::anyhow!("Failed to compute execution plan: {}", e))?;

    if plan.waves.is_empty() {
        println!("  {}", "No packages found".dimmed());
        return Ok(());
    }

    for (i, wave) in plan.waves.iter().enumerate() {
        println!();
        println!("{}:", format!("Wave {}", i + 1).bold());
        for name in wave {
            let color = plan
                .package_colors
                .get(name)
                .copied()
                .unwrap_or(Color::White);
            println!("  {}", name.color(color));
        }
    }

    Ok(())
}
