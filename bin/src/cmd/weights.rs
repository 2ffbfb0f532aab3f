//! Weights command implementation.

use navrank_pipeline::EngineConfig;

/// Print the composite score weight table in effect.
pub(crate) fn show_weights(config: &EngineConfig) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Composite Weights                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("{:<28} {:>8}  {}", "Metric", "Weight", "Direction");
    println!("{}", "─".repeat(52));
    for (name, weight, inverted) in config.weights.entries() {
        let direction = if inverted { "lower is better" } else { "higher is better" };
        println!("{name:<28} {weight:>8.2}  {direction}");
    }
    println!("{}", "─".repeat(52));
    println!("{:<28} {:>8.2}", "total", config.weights.sum());
    println!();
    println!("AUM is reported but not scored.");
    println!();
}
