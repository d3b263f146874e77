use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::filter_dataset;
use crate::fixtures::Fixtures;
use crate::intent::IntentParser;
use crate::models::QueryIntent;
use crate::planner::{plan, Plan};
use crate::report::render_dashboard;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub html: String,
    pub query_interpretation: QueryIntent,
}

/// Runs one query through parse, filter, plan and render. Filtering and
/// planning run on the blocking pool; a panic there surfaces as an error.
pub async fn generate_dashboard(
    parser: &dyn IntentParser,
    fixtures: Arc<Fixtures>,
    query: &str,
    today: NaiveDate,
) -> anyhow::Result<DashboardResponse> {
    let intent = parser.parse(query).await;
    tracing::info!(
        backend = parser.backend_name(),
        dashboard_type = ?intent.dashboard_type,
        time_period = ?intent.time_period,
        filters = intent.filters.len(),
        "query interpreted"
    );

    let planned = intent.clone();
    let html = tokio::task::spawn_blocking(move || {
        let dataset =
            filter_dataset(&planned, &fixtures.employees, &fixtures.time_entries, today);
        let plan = plan(&planned, &dataset);
        match &plan {
            Plan::NoData => tracing::info!("filters matched no active employees"),
            Plan::Dashboard(dashboard) => tracing::info!(
                employees = dataset.employees.len(),
                time_entries = dataset.time_entries.len(),
                charts = dashboard.charts.len(),
                "dashboard planned"
            ),
        }
        render_dashboard(&plan)
    })
    .await
    .context("dashboard generation failed")?;

    Ok(DashboardResponse {
        success: true,
        html,
        query_interpretation: intent,
    })
}
