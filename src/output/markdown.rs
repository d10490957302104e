//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a harvest,
//! including statistics and every failed page and image.

use crate::output::report::{CrawlReport, FailureRecord, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a crawl to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Sumi-Harvest Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Domain**: {}\n", report.domain));
    md.push_str(&format!(
        "- **Image Directory**: {}\n",
        report.image_dir.display()
    ));
    if let Some(started) = stats.started_at {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(finished) = stats.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = stats.duration_seconds() {
        md.push_str(&format!("- **Duration**: {} seconds\n", duration));
    }
    md.push_str(&format!("- **Status**: {}\n\n", report.phase));

    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages visited | {} |\n", stats.pages_visited));
    md.push_str(&format!(
        "| Pages succeeded | {} |\n",
        stats.pages_succeeded()
    ));
    md.push_str(&format!("| Pages failed | {} |\n", stats.pages_failed));
    md.push_str(&format!(
        "| Deepest level | {} |\n",
        stats.max_depth_reached
    ));
    md.push_str(&format!(
        "| Images submitted | {} |\n",
        stats.images_submitted
    ));
    md.push_str(&format!(
        "| Images downloaded | {} |\n",
        stats.images_downloaded
    ));
    md.push_str(&format!("| Images failed | {} |\n", stats.images_failed));
    md.push_str(&format!(
        "| Images without filename | {} |\n",
        stats.images_unnamed
    ));
    md.push_str(&format!("| Bytes written | {} |\n", stats.bytes_written));
    md.push_str(&format!(
        "| Off-domain links | {} |\n",
        stats.links_off_domain
    ));
    md.push_str(&format!(
        "| Links beyond max depth | {} |\n\n",
        stats.links_beyond_depth
    ));

    if !report.visit_order.is_empty() {
        md.push_str(&format!(
            "## Pages Visited ({})\n\n",
            report.visit_order.len()
        ));
        for (i, url) in report.visit_order.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, url));
        }
        md.push('\n');
    }

    push_failures(&mut md, "Failed Pages", &report.failed_pages);
    push_failures(&mut md, "Failed Images", &report.failed_images);

    md
}

fn push_failures(md: &mut String, title: &str, failures: &[FailureRecord]) {
    if failures.is_empty() {
        return;
    }

    md.push_str(&format!("## {} ({})\n\n", title, failures.len()));
    md.push_str("| URL | Error |\n");
    md.push_str("|-----|-------|\n");
    for failure in failures {
        md.push_str(&format!(
            "| {} | {} |\n",
            failure.url,
            failure.message.replace('|', "\\|")
        ));
    }
    md.push('\n');
}
