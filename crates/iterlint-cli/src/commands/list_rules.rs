//! List rules command implementation.

use iterlint_core::Severity;
use iterlint_rules::all_matchers;

/// Runs the list-rules command.
pub fn run() {
    println!("Available categories (in priority order):\n");
    println!(
        "{:<8} {:<34} {:<9} Description",
        "Code", "Name", "Severity"
    );
    println!("{}", "-".repeat(100));

    for matcher in all_matchers() {
        let category = matcher.category();
        println!(
            "{:<8} {:<34} {:<9} {}",
            category.code(),
            category.name(),
            matcher.default_severity().to_string(),
            matcher.description()
        );
    }

    println!("\nPresets:");
    println!("  recommended  - all categories as {} (default)", Severity::Warning);
    println!("  strict       - all categories as {}", Severity::Error);
    println!("  minimal      - IT001 and IT002 only (for gradual adoption)");

    println!("\nUse --disable to turn categories off, e.g.:");
    println!("  iterlint lint --disable map-for-side-effect-only,IT005");
}
