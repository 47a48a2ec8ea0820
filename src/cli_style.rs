use crate::orchestrator::RunReport;
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::Stylize;
use unicode_width::UnicodeWidthStr;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Run Summary
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 255,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 136,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

const CHECK: &str = "✓";
const CROSS_MARK: &str = "✗";
const HORIZONTAL: &str = "─";

fn pad(cell: &str, width: usize) -> String {
    format!("{}{}", cell, " ".repeat(width.saturating_sub(cell.width())))
}

/// Plain-text rows of the summary table: stage, statement, table, time.
pub fn summary_rows(report: &RunReport) -> Vec<[String; 4]> {
    report
        .stages
        .iter()
        .flat_map(|stage| {
            stage.statements.iter().map(move |statement| {
                [
                    stage.stage.to_string(),
                    statement.name.clone(),
                    statement.table.to_string(),
                    format!("{}ms", statement.elapsed.as_millis()),
                ]
            })
        })
        .collect()
}

pub fn print_run_summary(report: &RunReport) {
    let headers = ["stage", "statement", "table", "time"];
    let rows = summary_rows(report);

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    println!();
    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  {}", header_line.with(colors::CYAN).bold());
    let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    println!("  {}", HORIZONTAL.repeat(rule_width).with(colors::CYAN));

    for row in &rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", line);
    }
    println!();

    print_success(&format!(
        "{} job committed {} statements on {} in {:.1}s",
        report.job,
        report.statements_committed(),
        report.endpoint.host,
        report.elapsed.as_secs_f64()
    ));
}

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        CHECK.with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        " {} {}",
        CROSS_MARK.with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_hint(message: &str) {
    eprintln!("   {}", message.with(colors::DIM));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Job;
    use crate::pipeline::{Stage, StageReport, StatementOutcome};
    use crate::provisioning::ClusterEndpoint;
    use std::time::Duration;

    #[test]
    fn test_summary_rows_follow_stage_order() {
        let report = RunReport {
            job: Job::CreateTables,
            endpoint: ClusterEndpoint::local(),
            stages: vec![StageReport {
                stage: Stage::CreateSchema,
                statements: vec![StatementOutcome {
                    position: 1,
                    name: "user_table_create".to_string(),
                    table: "users",
                    elapsed: Duration::from_millis(12),
                }],
                elapsed: Duration::from_millis(12),
            }],
            elapsed: Duration::from_millis(20),
        };

        let rows = summary_rows(&report);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "create-schema");
        assert_eq!(rows[0][1], "user_table_create");
        assert_eq!(rows[0][3], "12ms");
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abcdef");
    }
}
