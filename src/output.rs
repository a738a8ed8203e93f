use console::Style;

use crate::aggregator::Summary;
use crate::scanner::ScanWarning;

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_success(msg: &str) {
    let style = Style::new().green().bold();
    println!("{} {}", style.apply_to("✓"), msg);
}

pub fn print_scan_warnings(warnings: &[ScanWarning]) {
    let dim = Style::new().dim();
    for warning in warnings {
        eprintln!(
            "  {} skipped {}: {}",
            dim.apply_to("·"),
            warning.file_path,
            warning.message,
        );
    }
}

pub fn print_summary(summary: &Summary) {
    let counts = &summary.counts;
    let score_pct = summary.score * 100.0;

    if counts.escaped == 0 {
        let style = Style::new().green().bold();
        println!(
            "{} {} mutants: {} killed, {} timed out, {} errored, {} uncovered ({:.1}% score)",
            style.apply_to("✓"),
            counts.total,
            counts.killed,
            counts.timed_out,
            counts.errored,
            counts.uncovered,
            score_pct,
        );
    } else {
        let style = Style::new().yellow().bold();
        println!(
            "{} {} mutants: {} killed, {} escaped, {} timed out, {} errored, {} uncovered ({:.1}% score)",
            style.apply_to("!"),
            counts.total,
            counts.killed,
            counts.escaped,
            counts.timed_out,
            counts.errored,
            counts.uncovered,
            score_pct,
        );
    }
    if counts.pending > 0 {
        let dim = Style::new().dim();
        println!(
            "  {} {} mutants still pending (session interrupted?)",
            dim.apply_to("·"),
            counts.pending,
        );
    }

    if !summary.by_operator.is_empty() {
        let dim = Style::new().dim();
        println!();
        for (operator, c) in &summary.by_operator {
            println!(
                "  {} {:<14} {:>4} mutants, {} killed, {} escaped",
                dim.apply_to("·"),
                operator,
                c.total,
                c.killed,
                c.escaped,
            );
        }
    }

    if !summary.escaped.is_empty() {
        println!();
        for m in &summary.escaped {
            let loc_style = Style::new().cyan().bold();
            let op_style = Style::new().magenta();
            println!(
                "  {} [{}] {} → {}",
                loc_style.apply_to(format!("{}:{}", m.file, m.line)),
                m.operator,
                op_style.apply_to(&m.original),
                op_style.apply_to(if m.replacement.is_empty() {
                    "<removed>"
                } else {
                    m.replacement.as_str()
                }),
            );
            for line in m.diff.lines() {
                if line.starts_with('-') {
                    println!("    {}", Style::new().red().apply_to(line));
                } else if line.starts_with('+') {
                    println!("    {}", Style::new().green().apply_to(line));
                }
            }
        }
    }
}

pub fn print_status(summary: &Summary) {
    let counts = &summary.counts;
    println!(
        "Last session: {} mutants, {} killed, {} escaped, {} uncovered ({:.1}% score)",
        counts.total,
        counts.killed,
        counts.escaped,
        counts.uncovered,
        summary.score * 100.0,
    );
    if !summary.escaped.is_empty() {
        println!();
        for m in &summary.escaped {
            println!("  {}:{} {} → {}", m.file, m.line, m.original, m.replacement);
        }
    }
}
