use std::fmt::Write;
use std::path::Path;

use anyhow::Context;

use crate::planner::{ChartSpec, Dashboard, Plan};

pub const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";
pub const CHARTS_JS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/charts.js"));
pub const DASHBOARD_CSS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/dashboard.css"));

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Serializes a chart spec for embedding in a `<script>` block.
fn chart_json(chart: &ChartSpec) -> String {
    serde_json::to_string(chart)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/")
}

pub fn render_dashboard(plan: &Plan) -> String {
    match plan {
        Plan::NoData => render_empty_state(),
        Plan::Dashboard(dashboard) => render_populated(dashboard),
    }
}

fn render_empty_state() -> String {
    let mut output = String::new();
    let _ = writeln!(output, r#"<div class="empty-state">"#);
    let _ = writeln!(output, r#"  <div class="empty-icon">📭</div>"#);
    let _ = writeln!(output, "  <h2>No Data Found</h2>");
    let _ = writeln!(output, "  <p>Try adjusting your query or check your filters</p>");
    let _ = writeln!(output, "</div>");
    output
}

fn render_populated(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, r#"<div class="dashboard-header">"#);
    let _ = writeln!(
        output,
        r#"  <h2 class="dashboard-title">{}</h2>"#,
        escape_html(&dashboard.title)
    );
    let _ = writeln!(
        output,
        r#"  <p class="dashboard-subtitle">{}</p>"#,
        escape_html(&dashboard.subtitle)
    );
    let _ = writeln!(output, "</div>");

    let _ = writeln!(output, r#"<div class="kpi-grid">"#);
    for kpi in &dashboard.kpis {
        let _ = writeln!(output, r#"  <div class="kpi-card">"#);
        let _ = writeln!(
            output,
            r#"    <div class="kpi-value">{}</div>"#,
            escape_html(&kpi.value)
        );
        let _ = writeln!(
            output,
            r#"    <div class="kpi-label">{}</div>"#,
            escape_html(&kpi.label)
        );
        let _ = writeln!(output, "  </div>");
    }
    let _ = writeln!(output, "</div>");

    if dashboard.charts.is_empty() {
        let _ = writeln!(
            output,
            r#"<p class="no-charts">No visualizations available for this query</p>"#
        );
        return output;
    }

    let _ = writeln!(output, r#"<div class="chart-grid">"#);
    for chart in &dashboard.charts {
        let id = escape_html(&chart.id);
        let _ = writeln!(output, r#"  <div class="chart-container">"#);
        let _ = writeln!(output, r#"    <div id="{id}" class="chart"></div>"#);
        let _ = writeln!(
            output,
            r#"    <script type="application/json" class="chart-spec" data-target="{id}">{}</script>"#,
            chart_json(chart)
        );
        let _ = writeln!(output, "  </div>");
    }
    let _ = writeln!(output, "</div>");

    output
}

/// Wraps a rendered fragment in a self-contained page that draws its charts
/// once the document loads.
pub fn render_document(fragment: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, r#"<html lang="en">"#);
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, r#"  <meta charset="UTF-8">"#);
    let _ = writeln!(output, "  <title>Workforce Dashboard</title>");
    let _ = writeln!(
        output,
        r#"  <script src="{PLOTLY_SRC}" charset="utf-8"></script>"#
    );
    let _ = writeln!(output, "  <style>\n{DASHBOARD_CSS}  </style>");
    let _ = writeln!(output, "  <script>\n{CHARTS_JS}  </script>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<main>");
    let _ = write!(output, "{fragment}");
    let _ = writeln!(output, "</main>");
    let _ = writeln!(
        output,
        "<script>document.addEventListener('DOMContentLoaded', () => drawCharts(document));</script>"
    );
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");
    output
}

pub fn write_document(path: &Path, fragment: &str) -> anyhow::Result<()> {
    std::fs::write(path, render_document(fragment))
        .with_context(|| format!("failed to write {}", path.display()))
}
