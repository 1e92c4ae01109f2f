use console::style;
use scriptline_core::{MetricsSnapshot, ScriptReport};

fn print_metrics(stage: &str, m: &MetricsSnapshot) {
    println!(
        "  {:<18} {} ok  {} failed  {} retries  {}/{} tokens",
        style(stage).dim(),
        style(m.successes).green(),
        style(m.failures).red(),
        m.retries,
        m.input_tokens,
        m.output_tokens
    );
}

pub fn print_report(report: &ScriptReport) {
    println!("\n{}", style("Metrics").bold());
    print_metrics("segment_extractor", &report.extraction);
    print_metrics("media_assembly", &report.assembly);

    if report.errors.is_empty() {
        return;
    }

    println!("\n{} {}", style("Errors").red().bold(), style(format!("({})", report.errors.len())).dim());
    for e in &report.errors {
        println!("  {} {}", style(format!("[{}]", e.stage)).yellow(), e.error);
    }
}
