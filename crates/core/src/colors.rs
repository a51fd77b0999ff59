//! Stable terminal colors for package labels.

use colored::Color;

/// Get a consistent color for a package name.
pub fn get_package_color(package_name: &str) -> Color {
    // Simple byte hash so a package keeps its color across runs and hosts.
    let hash = package_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Label palette kept away from the red/green/yellow used by status lines.
    let colors = [
        Color::TrueColor {
            r: 140,
            g: 120,
            b: 226,
        },
        Color::TrueColor {
            r: 64,
            g: 200,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 150,
            b: 40,
        },
        Color::TrueColor {
            r: 205,
            g: 60,
            b: 144,
        },
        Color::TrueColor {
            r: 95,
            g: 178,
            b: 220,
        },
        Color::TrueColor {
            r: 160,
            g: 90,
            b: 240,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}
