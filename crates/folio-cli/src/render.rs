use colored::Colorize;
use folio_diff::{ChangeReport, FieldDiff, TextDiff};

pub fn print_report(report: &ChangeReport) {
    let from = report
        .from
        .map(|id| id.short_id())
        .unwrap_or_else(|| "(none)".into());
    println!(
        "Document {}  {} -> {}",
        report.document.short_id().cyan(),
        from.yellow(),
        report.to.short_id().yellow()
    );
    if let Some(user) = &report.user {
        println!("  User: {user}");
    }
    if !report.tags.is_empty() {
        let tags: Vec<String> = report.tags.iter().map(ToString::to_string).collect();
        println!("  Tags: {}", tags.join(", ").blue());
    }
    if report.tombstone_changed() {
        let state = if report.deleted_after { "deleted".red() } else { "restored".green() };
        println!("  Document {state}");
    }

    if report.changes.is_empty() {
        println!("\nNo field changes.");
    }
    for change in &report.changes {
        println!();
        print_change(change);
    }

    if !report.undeclared_fields.is_empty() {
        println!(
            "\n{} {}",
            "Not in schema:".dimmed(),
            report.undeclared_fields.join(", ").dimmed()
        );
    }
}

fn print_change(change: &FieldDiff) {
    println!("{} {} [{}]", "~".yellow().bold(), change.field().bold(), change.kind());
    match change {
        FieldDiff::Localized(diff) => {
            for entry in &diff.added {
                println!("    {} {}: {:?}", "+".green(), entry.locale, entry.value);
            }
            for entry in &diff.removed {
                println!("    {} {}: {:?}", "-".red(), entry.locale, entry.value);
            }
            for (locale, text) in &diff.modified {
                println!("    {} {}", "~".yellow(), locale);
                print_text_diff(text, 6);
            }
        }
        FieldDiff::Scalar(diff) => {
            println!(
                "    {} -> {}",
                display_scalar(diff.from.as_deref()).red(),
                display_scalar(diff.to.as_deref()).green()
            );
        }
        FieldDiff::Structured(diff) => {
            println!(
                "    {} added, {} removed, {} modified",
                diff.additions(),
                diff.removals(),
                diff.modifications()
            );
            for change in &diff.changes {
                println!("    {change}");
            }
        }
        FieldDiff::Text(diff) => {
            println!(
                "    {} {}",
                format!("+{}", diff.diff.added_lines).green(),
                format!("-{}", diff.diff.removed_lines).red()
            );
            print_text_diff(&diff.diff, 4);
        }
    }
}

fn print_text_diff(diff: &TextDiff, indent: usize) {
    for line in colorize_unified(&diff.unified_diff).lines() {
        println!("{:indent$}{line}", "");
    }
}

fn display_scalar(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => "null".to_string(),
    }
}

/// Color a unified diff the way `git diff` does.
pub fn colorize_unified(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len());
    for line in diff.lines() {
        let colored = if line.starts_with("---") || line.starts_with("+++") {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else {
            line.to_string()
        };
        out.push_str(&colored);
        out.push('\n');
    }
    out
}
