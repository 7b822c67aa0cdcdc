//! Report rendering: text for terminals, JSON for automation.

use serde::Serialize;

use crate::error::Result;
use crate::ui::{format_duration, HostprepTheme};

use super::Report;

/// Render the ordered outcome listing plus summary statistics.
pub fn render_text(report: &Report, theme: &HostprepTheme) -> String {
    let mut out = String::new();

    out.push_str(&theme.format_header("Provisioning summary"));
    if report.dry_run {
        out.push_str(&format!(" {}", theme.dim.apply_to("(dry run)")));
    }
    out.push('\n');

    for outcome in report.outcomes() {
        out.push_str("  ");
        out.push_str(&theme.format_outcome(outcome));
        out.push('\n');
    }

    out.push_str(&format!("  {}\n", theme.border.apply_to("─".repeat(36))));

    let rows = [
        ("Packages installed", report.packages_installed.to_string()),
        ("Admin user", report.username.clone()),
        ("Timezone", report.timezone.clone()),
        ("Elapsed", format_duration(report.elapsed())),
        (
            "Failures",
            format!(
                "{} (warnings: {})",
                report.error_count(),
                report.warning_count()
            ),
        ),
    ];
    for (key, value) in rows {
        out.push_str(&format!(
            "  {} {}\n",
            theme.key.apply_to(format!("{:<19}", format!("{}:", key))),
            theme.value.apply_to(value)
        ));
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a Report,
    error_count: usize,
    warning_count: usize,
    exit_status: u8,
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String> {
    let view = JsonReport {
        report,
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        exit_status: report.exit_status(),
    };
    serde_json::to_string_pretty(&view).map_err(|e| anyhow::Error::from(e).into())
}
