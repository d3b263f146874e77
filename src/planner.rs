use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Band, DashboardType, Department, Employee, FilteredDataset, QueryIntent, TimeEntry};

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_PERIOD: &str = "Last 90 Days";
const EMPLOYEE_AXIS: &str = "Number of Employees";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

impl Kpi {
    fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    HorizontalBar,
    Pie,
    Histogram { bins: u32 },
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Declarative chart description. For histograms `categories` is empty and
/// the single series holds the raw observations; every other kind aligns each
/// series' values with `categories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            kind,
            x_title: None,
            y_title: None,
            categories: Vec::new(),
            series: Vec::new(),
        }
    }

    fn x_title(mut self, title: &str) -> Self {
        self.x_title = Some(title.to_string());
        self
    }

    fn y_title(mut self, title: &str) -> Self {
        self.y_title = Some(title.to_string());
        self
    }

    fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    fn series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.push(Series {
            name: name.into(),
            values,
        });
        self
    }

    fn ranked(self, name: &str, ranked: &[(String, f64)]) -> Self {
        let (categories, values): (Vec<String>, Vec<f64>) = ranked.iter().cloned().unzip();
        self.categories(categories).series(name, values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub subtitle: String,
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// No active employee survived the filters.
    NoData,
    Dashboard(Dashboard),
}

struct PlanContext<'a> {
    employees: &'a [Employee],
    active: Vec<&'a Employee>,
    time_entries: &'a [TimeEntry],
    period_label: &'static str,
}

struct Branch {
    kpis: fn(&PlanContext<'_>) -> Vec<Kpi>,
    charts: fn(&PlanContext<'_>) -> Vec<ChartSpec>,
}

fn branch_for(dashboard_type: DashboardType) -> Branch {
    match dashboard_type {
        DashboardType::Attrition => Branch {
            kpis: attrition_kpis,
            charts: attrition_charts,
        },
        DashboardType::Hours => Branch {
            kpis: hours_kpis,
            charts: hours_charts,
        },
        DashboardType::BandAnalysis => Branch {
            kpis: band_kpis,
            charts: band_charts,
        },
        DashboardType::Demographics => Branch {
            kpis: demographics_kpis,
            charts: demographics_charts,
        },
        DashboardType::LocationCompare => Branch {
            kpis: location_kpis,
            charts: location_charts,
        },
        DashboardType::Project => Branch {
            kpis: project_kpis,
            charts: no_charts,
        },
        DashboardType::General => Branch {
            kpis: general_kpis,
            charts: general_charts,
        },
    }
}

/// Builds the KPI cards and chart specs for a filtered dataset. Pure: the same
/// intent and dataset always produce the same plan.
pub fn plan(intent: &QueryIntent, dataset: &FilteredDataset) -> Plan {
    let active: Vec<&Employee> = dataset.active_employees().collect();
    if active.is_empty() {
        return Plan::NoData;
    }

    let context = PlanContext {
        employees: &dataset.employees,
        active,
        time_entries: &dataset.time_entries,
        period_label: intent
            .time_period
            .map(|period| period.title())
            .unwrap_or(DEFAULT_PERIOD),
    };

    let branch = branch_for(intent.dashboard_type);
    let kpis = (branch.kpis)(&context);
    let mut charts = (branch.charts)(&context);
    for (index, chart) in charts.iter_mut().enumerate() {
        chart.id = format!("chart{}", index + 1);
    }

    let mut title = title_case(&intent.focus);
    if let Some(period) = intent.time_period {
        title.push_str(" - ");
        title.push_str(period.title());
    }

    Plan::Dashboard(Dashboard {
        title,
        subtitle: format!("Generated from {} employee records", dataset.employees.len()),
        kpis,
        charts,
    })
}

fn no_charts(_: &PlanContext<'_>) -> Vec<ChartSpec> {
    Vec::new()
}

fn attrition_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    let active = ctx.active.len();
    let terminated = ctx.employees.len() - active;
    let rate = terminated as f64 / (active + terminated) as f64 * 100.0;

    vec![
        Kpi::new("Active Employees", active),
        Kpi::new("Terminated", terminated),
        Kpi::new("Attrition Rate", format_percent(rate)),
        Kpi::new("Avg Tenure", format_years(mean_tenure(&ctx.active))),
    ]
}

fn attrition_charts(ctx: &PlanContext<'_>) -> Vec<ChartSpec> {
    let mut by_department: BTreeMap<Department, (usize, usize)> = BTreeMap::new();
    for employee in ctx.employees {
        let entry = by_department.entry(employee.department).or_insert((0, 0));
        if employee.is_active() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    let categories = by_department.keys().map(|d| d.to_string()).collect();
    let mut status = ChartSpec::new("Employee Status by Department", ChartKind::StackedBar)
        .categories(categories)
        .series(
            "Active",
            by_department.values().map(|(active, _)| *active as f64).collect(),
        );
    if by_department.values().any(|(_, terminated)| *terminated > 0) {
        status = status.series(
            "Terminated",
            by_department.values().map(|(_, terminated)| *terminated as f64).collect(),
        );
    }

    let tenure = ChartSpec::new("Tenure Distribution", ChartKind::Histogram { bins: 20 })
        .x_title("Years of Service")
        .y_title(EMPLOYEE_AXIS)
        .series("Tenure", ctx.active.iter().map(|e| e.tenure_years).collect());

    let locations = ChartSpec::new("Active Employees by Location", ChartKind::HorizontalBar)
        .x_title(EMPLOYEE_AXIS)
        .ranked("Employees", &ascending(top_n(location_counts(&ctx.active), 8)));

    vec![status, tenure, locations]
}

fn hours_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    if ctx.time_entries.is_empty() {
        return ["No Time Data", "Available", "For This", "Period"]
            .into_iter()
            .map(|label| Kpi::new(label, NOT_AVAILABLE))
            .collect();
    }

    let total: f64 = ctx.time_entries.iter().map(|entry| entry.hours).sum();
    let daily = daily_hours(ctx.time_entries);
    let avg_daily = daily.values().sum::<f64>() / daily.len() as f64;
    let top_activity = max_key(&sum_by(ctx.time_entries, |entry| entry.work_type))
        .map(|work_type| first_word(work_type.as_str()).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    vec![
        Kpi::new(
            format!("Total Hours ({})", ctx.period_label),
            format!("{}h", format_thousands(total as i64)),
        ),
        Kpi::new("Avg Daily Hours", format!("{avg_daily:.1}h")),
        Kpi::new("Top Activity", top_activity),
        Kpi::new("Active Projects", distinct_projects(ctx.time_entries)),
    ]
}

fn hours_charts(ctx: &PlanContext<'_>) -> Vec<ChartSpec> {
    if ctx.time_entries.is_empty() {
        return Vec::new();
    }

    let departments: HashMap<&str, Department> = ctx
        .employees
        .iter()
        .map(|employee| (employee.corporate_id.as_str(), employee.department))
        .collect();
    let mut by_department: BTreeMap<String, f64> = BTreeMap::new();
    for entry in ctx.time_entries {
        if let Some(department) = departments.get(entry.corporate_id.as_str()) {
            *by_department.entry(department.to_string()).or_insert(0.0) += entry.hours;
        }
    }

    let department_chart = ChartSpec::new(
        format!("Total Hours by Department ({})", ctx.period_label),
        ChartKind::Bar,
    )
    .ranked("Hours", &rank(by_department));

    let by_work_type = sum_by(ctx.time_entries, |entry| entry.work_type.to_string());
    let work_type_chart =
        ChartSpec::new("Hours by Work Type", ChartKind::Pie).ranked("Hours", &rank(by_work_type));

    let daily = daily_hours(ctx.time_entries);
    let totals: Vec<f64> = daily.values().copied().collect();
    let average = trailing_mean(&totals, 7);
    let trend = ChartSpec::new("Daily Hours Trend", ChartKind::Line)
        .x_title("Date")
        .y_title("Hours")
        .categories(daily.keys().map(|date| date.to_string()).collect())
        .series("Daily Hours", totals)
        .series("7-Day Average", average);

    let by_project = sum_by(ctx.time_entries, |entry| entry.project_code.clone());
    let projects = ChartSpec::new("Top 10 Projects by Hours", ChartKind::HorizontalBar)
        .x_title("Total Hours")
        .ranked("Hours", &ascending(top_n(by_project, 10)));

    vec![department_chart, work_type_chart, trend, projects]
}

fn band_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    let counts = count_by(&ctx.active, |employee| employee.band);
    let most_common = max_key(&counts)
        .map(|band| band.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let senior = ctx.active.iter().filter(|e| e.band.is_senior()).count();

    vec![
        Kpi::new("Total Employees", ctx.active.len()),
        Kpi::new("Most Common Band", most_common),
        Kpi::new("Senior Level (IV-V)", senior),
        Kpi::new("Band Levels", counts.len()),
    ]
}

fn band_charts(ctx: &PlanContext<'_>) -> Vec<ChartSpec> {
    let counts = count_by(&ctx.active, |employee| employee.band);
    let distribution = ChartSpec::new("Employee Distribution by Band", ChartKind::Bar)
        .x_title("Band Level")
        .y_title(EMPLOYEE_AXIS)
        .categories(Band::ALL.iter().map(|band| band.to_string()).collect())
        .series(
            "Employees",
            Band::ALL
                .iter()
                .map(|band| counts.get(band).copied().unwrap_or(0) as f64)
                .collect(),
        );

    let departments = count_by(&ctx.active, |employee| employee.department);
    let mut by_department = ChartSpec::new("Band Distribution by Department", ChartKind::StackedBar)
        .y_title(EMPLOYEE_AXIS)
        .categories(departments.keys().map(|d| d.to_string()).collect());
    for band in counts.keys() {
        let values = departments
            .keys()
            .map(|department| {
                ctx.active
                    .iter()
                    .filter(|e| e.department == *department && e.band == *band)
                    .count() as f64
            })
            .collect();
        by_department = by_department.series(band.to_string(), values);
    }

    let tenure: Vec<(String, f64)> = counts
        .keys()
        .map(|band| {
            let members: Vec<&Employee> = ctx
                .active
                .iter()
                .copied()
                .filter(|e| e.band == *band)
                .collect();
            (band.to_string(), mean_tenure(&members))
        })
        .collect();
    let tenure_chart = ChartSpec::new("Average Tenure by Band", ChartKind::Bar)
        .x_title("Band")
        .y_title("Average Tenure (Years)")
        .ranked("Avg Tenure", &tenure);

    vec![distribution, by_department, tenure_chart]
}

fn demographics_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    let ages: Vec<u32> = ctx.active.iter().map(|employee| employee.age).collect();
    let mean_age = ages.iter().map(|age| f64::from(*age)).sum::<f64>() / ages.len() as f64;
    let youngest = ages.iter().min().copied().unwrap_or_default();
    let oldest = ages.iter().max().copied().unwrap_or_default();

    vec![
        Kpi::new("Active Employees", ctx.active.len()),
        Kpi::new("Average Age", format!("{mean_age:.0}")),
        Kpi::new("Age Range", format!("{youngest}-{oldest}")),
        Kpi::new("Departments", count_by(&ctx.active, |e| e.department).len()),
    ]
}

fn demographics_charts(ctx: &PlanContext<'_>) -> Vec<ChartSpec> {
    let ages = ChartSpec::new("Age Distribution", ChartKind::Histogram { bins: 15 })
        .x_title("Age")
        .y_title(EMPLOYEE_AXIS)
        .series("Age", ctx.active.iter().map(|e| f64::from(e.age)).collect());

    let departments = count_by(&ctx.active, |employee| employee.department.to_string());
    let department_chart = ChartSpec::new("Employees by Department", ChartKind::Pie)
        .ranked("Employees", &rank(as_f64(departments)));

    let locations = ChartSpec::new("Top Work Locations", ChartKind::HorizontalBar)
        .x_title(EMPLOYEE_AXIS)
        .ranked("Employees", &ascending(top_n(location_counts(&ctx.active), 8)));

    vec![ages, department_chart, locations]
}

fn location_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    let ranking = rank(location_counts(&ctx.active));
    let largest = ranking
        .first()
        .map(|(location, _)| location.split(',').next().unwrap_or(location.as_str()).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    vec![
        Kpi::new("Total Employees", ctx.active.len()),
        Kpi::new("Locations", ranking.len()),
        Kpi::new("Largest Office", largest),
        Kpi::new("Avg Tenure", format_years(mean_tenure(&ctx.active))),
    ]
}

fn location_charts(ctx: &PlanContext<'_>) -> Vec<ChartSpec> {
    let top_locations = top_n(location_counts(&ctx.active), 10);
    let headcount = ChartSpec::new("Employee Count by Location", ChartKind::Bar)
        .y_title(EMPLOYEE_AXIS)
        .ranked("Employees", &top_locations);

    let mut top_five: Vec<&str> = top_locations
        .iter()
        .take(5)
        .map(|(location, _)| location.as_str())
        .collect();
    top_five.sort_unstable();
    let in_top_five: Vec<&Employee> = ctx
        .active
        .iter()
        .copied()
        .filter(|e| top_five.contains(&e.work_location.as_str()))
        .collect();
    let departments = count_by(&in_top_five, |employee| employee.department);

    let mut mix = ChartSpec::new("Department Mix by Location", ChartKind::StackedBar)
        .y_title(EMPLOYEE_AXIS)
        .categories(top_five.iter().map(|location| location.to_string()).collect());
    for department in departments.keys() {
        let values = top_five
            .iter()
            .map(|location| {
                in_top_five
                    .iter()
                    .filter(|e| e.work_location == *location && e.department == *department)
                    .count() as f64
            })
            .collect();
        mix = mix.series(department.to_string(), values);
    }

    let mut members: BTreeMap<String, Vec<&Employee>> = BTreeMap::new();
    for employee in &ctx.active {
        members
            .entry(employee.work_location.clone())
            .or_default()
            .push(*employee);
    }
    let tenure_by_location: BTreeMap<String, f64> = members
        .into_iter()
        .map(|(location, employees)| (location, mean_tenure(&employees)))
        .collect();
    let tenure = ChartSpec::new("Average Tenure by Location", ChartKind::Bar)
        .y_title("Average Tenure (Years)")
        .ranked("Avg Tenure", &top_n(tenure_by_location, 8));

    vec![headcount, mix, tenure]
}

fn project_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    if ctx.time_entries.is_empty() {
        return (0..4)
            .map(|_| Kpi::new("No Project Data", NOT_AVAILABLE))
            .collect();
    }

    let by_project = sum_by(ctx.time_entries, |entry| entry.project_code.clone());
    let top_project = max_key(&by_project)
        .map(|code| code.split('-').next().unwrap_or(code.as_str()).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let total: f64 = by_project.values().sum();

    vec![
        Kpi::new("Active Projects", by_project.len()),
        Kpi::new("Top Project", top_project),
        Kpi::new(
            "Total Hours",
            format!("{}h", format_thousands(total.round_ties_even() as i64)),
        ),
        Kpi::new("Team Members", ctx.active.len()),
    ]
}

fn general_kpis(ctx: &PlanContext<'_>) -> Vec<Kpi> {
    vec![
        Kpi::new("Active Employees", ctx.active.len()),
        Kpi::new("Locations", location_counts(&ctx.active).len()),
        Kpi::new("Departments", count_by(&ctx.active, |e| e.department).len()),
        Kpi::new("Avg Tenure", format_years(mean_tenure(&ctx.active))),
    ]
}

fn general_charts(ctx: &PlanContext<'_>) -> Vec<ChartSpec> {
    let departments = count_by(&ctx.active, |employee| employee.department.to_string());
    let department_chart = ChartSpec::new("Employees by Department", ChartKind::Bar)
        .y_title(EMPLOYEE_AXIS)
        .ranked("Employees", &rank(as_f64(departments)));

    let orgs = count_by(&ctx.active, |employee| employee.supervisory_org.clone());
    let org_chart = ChartSpec::new("Distribution by Supervisory Organization", ChartKind::Pie)
        .ranked("Employees", &rank(as_f64(orgs)));

    let locations = ChartSpec::new("Employees by Location", ChartKind::HorizontalBar)
        .x_title(EMPLOYEE_AXIS)
        .ranked("Employees", &ascending(top_n(location_counts(&ctx.active), 8)));

    vec![department_chart, org_chart, locations]
}

fn count_by<K: Ord>(employees: &[&Employee], key: impl Fn(&Employee) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for employee in employees {
        *counts.entry(key(*employee)).or_insert(0) += 1;
    }
    counts
}

fn sum_by<K: Ord>(entries: &[TimeEntry], key: impl Fn(&TimeEntry) -> K) -> BTreeMap<K, f64> {
    let mut sums = BTreeMap::new();
    for entry in entries {
        *sums.entry(key(entry)).or_insert(0.0) += entry.hours;
    }
    sums
}

fn daily_hours(entries: &[TimeEntry]) -> BTreeMap<NaiveDate, f64> {
    sum_by(entries, |entry| entry.entry_date)
}

fn distinct_projects(entries: &[TimeEntry]) -> usize {
    sum_by(entries, |entry| entry.project_code.clone()).len()
}

fn location_counts(employees: &[&Employee]) -> BTreeMap<String, f64> {
    as_f64(count_by(employees, |employee| employee.work_location.clone()))
}

fn as_f64(counts: BTreeMap<String, usize>) -> BTreeMap<String, f64> {
    counts
        .into_iter()
        .map(|(key, count)| (key, count as f64))
        .collect()
}

/// First key holding the largest value; ties go to the smallest key.
fn max_key<K: Ord + Clone, V: PartialOrd + Copy>(values: &BTreeMap<K, V>) -> Option<K> {
    let mut best: Option<(&K, V)> = None;
    for (key, value) in values {
        match best {
            Some((_, current)) if *value <= current => {}
            _ => best = Some((key, *value)),
        }
    }
    best.map(|(key, _)| key.clone())
}

/// Largest value first, label ascending among ties.
fn rank(values: BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = values.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

fn top_n(values: BTreeMap<String, f64>, n: usize) -> Vec<(String, f64)> {
    let mut ranked = rank(values);
    ranked.truncate(n);
    ranked
}

fn ascending(mut ranked: Vec<(String, f64)>) -> Vec<(String, f64)> {
    ranked.reverse();
    ranked
}

fn mean_tenure(employees: &[&Employee]) -> f64 {
    if employees.is_empty() {
        return 0.0;
    }
    employees.iter().map(|e| e.tenure_years).sum::<f64>() / employees.len() as f64
}

fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|index| {
            let slice = &values[(index + 1).saturating_sub(window)..=index];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or(text)
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_years(value: f64) -> String {
    format!("{value:.1}yr")
}

pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Capitalizes the first letter of every word and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if previous_is_letter {
            output.extend(ch.to_lowercase());
        } else {
            output.extend(ch.to_uppercase());
        }
        previous_is_letter = ch.is_alphabetic();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentStatus, TimePeriod, WorkType};

    fn employee(index: usize, band: Band, department: Department, location: &str) -> Employee {
        let hire_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        Employee {
            corporate_id: format!("EMP{:05}", index + 1000),
            first_name: "Avery".to_string(),
            last_name: "Lee".to_string(),
            full_name: "Avery Lee".to_string(),
            age: 25 + (index % 30) as u32,
            year_of_birth: 2000,
            work_location: location.to_string(),
            supervisory_org: if index % 2 == 0 { "AAB" } else { "XYZ" }.to_string(),
            job_profile_name: "Software Engineer".to_string(),
            job_profile_code: "JP001".to_string(),
            cost_center_code: "CCAA100".to_string(),
            job_code: "J001".to_string(),
            position_title: "Software Engineer".to_string(),
            hire_date,
            company_service_date: hire_date,
            band,
            department,
            employment_status: EmploymentStatus::Active,
            termination_date: None,
            tenure_years: 1.0 + (index % 5) as f64,
        }
    }

    fn terminate(mut employee: Employee) -> Employee {
        employee.employment_status = EmploymentStatus::Terminated;
        employee.termination_date = NaiveDate::from_ymd_opt(2025, 12, 1);
        employee
    }

    fn entry(id: &str, day: u32, hours: f64, work_type: WorkType, project: &str) -> TimeEntry {
        let entry_date = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
        TimeEntry {
            corporate_id: id.to_string(),
            entry_date,
            hours,
            work_type,
            project_code: project.to_string(),
            week_number: 1,
            month: "2026-01".to_string(),
            quarter: "Q1 2026".to_string(),
        }
    }

    fn intent(dashboard_type: DashboardType) -> QueryIntent {
        QueryIntent {
            dashboard_type,
            filters: BTreeMap::new(),
            focus: "test focus".to_string(),
            time_period: None,
        }
    }

    fn dashboard(plan: Plan) -> Dashboard {
        match plan {
            Plan::Dashboard(dashboard) => dashboard,
            Plan::NoData => panic!("expected a dashboard"),
        }
    }

    fn kpi<'a>(dashboard: &'a Dashboard, label: &str) -> &'a str {
        dashboard
            .kpis
            .iter()
            .find(|kpi| kpi.label == label)
            .map(|kpi| kpi.value.as_str())
            .unwrap_or_else(|| panic!("missing kpi {label}"))
    }

    fn mixed_workforce() -> Vec<Employee> {
        let departments = [Department::Engineering, Department::Design, Department::Operations];
        let locations = ["Herndon, VA", "Seattle, WA", "Austin, TX", "Boston, MA"];
        let bands = [Band::BI, Band::BII, Band::BIII];
        (0..75)
            .map(|i| {
                let employee = employee(i, bands[i % 3], departments[i % 3], locations[i % 4]);
                if i < 3 {
                    terminate(employee)
                } else {
                    employee
                }
            })
            .collect()
    }

    #[test]
    fn empty_active_subset_is_no_data() {
        let dataset = FilteredDataset::default();
        for dashboard_type in [DashboardType::Attrition, DashboardType::Hours, DashboardType::General] {
            assert_eq!(plan(&intent(dashboard_type), &dataset), Plan::NoData);
        }

        let only_terminated = FilteredDataset {
            employees: vec![terminate(employee(0, Band::BI, Department::Design, "Austin, TX"))],
            time_entries: Vec::new(),
        };
        assert_eq!(plan(&intent(DashboardType::Attrition), &only_terminated), Plan::NoData);
    }

    #[test]
    fn attrition_rate_uses_whole_population() {
        let employees: Vec<Employee> = (0..100)
            .map(|i| {
                let e = employee(i, Band::BII, Department::Engineering, "Denver, CO");
                if i < 5 {
                    terminate(e)
                } else {
                    e
                }
            })
            .collect();
        let dataset = FilteredDataset {
            employees,
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::Attrition), &dataset));

        assert_eq!(kpi(&result, "Active Employees"), "95");
        assert_eq!(kpi(&result, "Terminated"), "5");
        assert_eq!(kpi(&result, "Attrition Rate"), "5.0%");
        assert_eq!(result.charts.len(), 3);
        assert_eq!(result.charts[0].kind, ChartKind::StackedBar);
        assert_eq!(result.charts[0].series.len(), 2);
        assert_eq!(result.charts[1].kind, ChartKind::Histogram { bins: 20 });
        assert_eq!(result.charts[1].series[0].values.len(), 95);
    }

    #[test]
    fn band_scenario_counts_active_and_emits_three_charts() {
        let dataset = FilteredDataset {
            employees: mixed_workforce(),
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::BandAnalysis), &dataset));

        assert_eq!(kpi(&result, "Total Employees"), "72");
        assert_eq!(kpi(&result, "Senior Level (IV-V)"), "0");
        assert_eq!(kpi(&result, "Band Levels"), "3");
        assert_eq!(result.kpis.len(), 4);
        assert_eq!(result.charts.len(), 3);
        let titles: Vec<&str> = result.charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Employee Distribution by Band",
                "Band Distribution by Department",
                "Average Tenure by Band"
            ]
        );
        assert_eq!(
            result.charts.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            ["chart1", "chart2", "chart3"]
        );
    }

    #[test]
    fn band_bar_zero_fills_every_level() {
        let dataset = FilteredDataset {
            employees: vec![
                employee(0, Band::BII, Department::Design, "Austin, TX"),
                employee(1, Band::BII, Department::Design, "Austin, TX"),
                employee(2, Band::BV, Department::Engineering, "Austin, TX"),
            ],
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::BandAnalysis), &dataset));
        let distribution = &result.charts[0];

        assert_eq!(distribution.categories, ["BI", "BII", "BIII", "BIV", "BV"]);
        assert_eq!(distribution.series[0].values, [0.0, 2.0, 0.0, 0.0, 1.0]);
        assert_eq!(kpi(&result, "Most Common Band"), "BII");
        assert_eq!(kpi(&result, "Senior Level (IV-V)"), "1");
    }

    #[test]
    fn general_dashboard_has_four_kpis_and_three_charts() {
        let dataset = FilteredDataset {
            employees: mixed_workforce(),
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::General), &dataset));

        assert_eq!(result.kpis.len(), 4);
        assert_eq!(kpi(&result, "Locations"), "4");
        assert_eq!(kpi(&result, "Departments"), "3");
        assert_eq!(result.charts.len(), 3);
        assert_eq!(result.charts[1].kind, ChartKind::Pie);
        assert_eq!(result.subtitle, "Generated from 75 employee records");
        assert_eq!(result.title, "Test Focus");
    }

    #[test]
    fn hours_without_entries_degrade_to_placeholders() {
        let dataset = FilteredDataset {
            employees: mixed_workforce(),
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::Hours), &dataset));
        assert_eq!(result.kpis.len(), 4);
        assert!(result.kpis.iter().all(|kpi| kpi.value == "N/A"));
        assert!(result.charts.is_empty());

        let project = dashboard(plan(&intent(DashboardType::Project), &dataset));
        assert!(project.kpis.iter().all(|kpi| kpi.value == "N/A"));
    }

    #[test]
    fn hours_dashboard_aggregates_entries() {
        let employees = vec![
            employee(0, Band::BI, Department::Engineering, "Austin, TX"),
            employee(1, Band::BI, Department::Design, "Austin, TX"),
        ];
        let mut time_entries = Vec::new();
        for day in 5..=14 {
            time_entries.push(entry("EMP01000", day, 500.0, WorkType::CodeReview, "PRJ001-Alpha"));
            time_entries.push(entry("EMP01001", day, 40.625, WorkType::Meetings, "INT-001-Infrastructure"));
        }
        let dataset = FilteredDataset {
            employees,
            time_entries,
        };
        let mut query = intent(DashboardType::Hours);
        query.time_period = Some(TimePeriod::ThisMonth);
        let result = dashboard(plan(&query, &dataset));

        assert_eq!(kpi(&result, "Total Hours (This Month)"), "5,406h");
        assert_eq!(kpi(&result, "Avg Daily Hours"), "540.6h");
        assert_eq!(kpi(&result, "Top Activity"), "Code");
        assert_eq!(kpi(&result, "Active Projects"), "2");
        assert_eq!(result.title, "Test Focus - This Month");

        assert_eq!(result.charts.len(), 4);
        assert_eq!(result.charts[0].categories, ["Engineering", "Design"]);
        let trend = &result.charts[2];
        assert_eq!(trend.kind, ChartKind::Line);
        assert_eq!(trend.categories.len(), 10);
        assert_eq!(trend.series[0].name, "Daily Hours");
        assert_eq!(trend.series[1].name, "7-Day Average");
        assert!((trend.series[1].values[9] - 540.625).abs() < 1e-9);
        assert_eq!(result.charts[3].categories, ["INT-001-Infrastructure", "PRJ001-Alpha"]);

        let project = dashboard(plan(&intent(DashboardType::Project), &dataset));
        assert_eq!(kpi(&project, "Top Project"), "PRJ001");
        assert_eq!(kpi(&project, "Total Hours"), "5,406h");
        assert_eq!(kpi(&project, "Team Members"), "2");
        assert!(project.charts.is_empty());
    }

    #[test]
    fn project_total_rounds_half_to_even() {
        let employees = vec![employee(0, Band::BII, Department::Engineering, "Austin, TX")];
        let totals = |hours: f64| {
            let dataset = FilteredDataset {
                employees: employees.clone(),
                time_entries: vec![
                    entry("EMP01000", 5, hours, WorkType::ProjectWork, "PRJ002-Beta"),
                    entry("EMP01000", 6, hours, WorkType::ProjectWork, "PRJ002-Beta"),
                ],
            };
            let project = dashboard(plan(&intent(DashboardType::Project), &dataset));
            kpi(&project, "Total Hours").to_string()
        };

        assert_eq!(totals(2702.25), "5,404h");
        assert_eq!(totals(2702.75), "5,406h");
    }

    #[test]
    fn location_compare_ranks_offices() {
        let dataset = FilteredDataset {
            employees: mixed_workforce(),
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::LocationCompare), &dataset));

        assert_eq!(kpi(&result, "Locations"), "4");
        assert_eq!(result.charts.len(), 3);
        let headcount = &result.charts[0];
        let total: f64 = headcount.series[0].values.iter().sum();
        assert_eq!(total, 72.0);
        assert!(headcount.series[0]
            .values
            .windows(2)
            .all(|pair| pair[0] >= pair[1]));
        assert_eq!(kpi(&result, "Largest Office"), headcount.categories[0].split(',').next().unwrap());
        assert_eq!(result.charts[1].series.len(), 3);
    }

    #[test]
    fn demographics_reports_age_span() {
        let dataset = FilteredDataset {
            employees: vec![
                employee(0, Band::BI, Department::Design, "Austin, TX"),
                employee(10, Band::BI, Department::Design, "Austin, TX"),
            ],
            time_entries: Vec::new(),
        };
        let result = dashboard(plan(&intent(DashboardType::Demographics), &dataset));
        assert_eq!(kpi(&result, "Average Age"), "30");
        assert_eq!(kpi(&result, "Age Range"), "25-35");
        assert_eq!(kpi(&result, "Departments"), "1");
    }

    #[test]
    fn planning_is_deterministic() {
        let dataset = FilteredDataset {
            employees: mixed_workforce(),
            time_entries: Vec::new(),
        };
        let query = intent(DashboardType::LocationCompare);
        assert_eq!(plan(&query, &dataset), plan(&query, &dataset));
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_percent(4.0), "4.0%");
        assert_eq!(format_years(3.26), "3.3yr");
        assert_eq!(title_case("employee attrition analysis"), "Employee Attrition Analysis");
        assert_eq!(trailing_mean(&[2.0, 4.0, 6.0], 2), [2.0, 3.0, 5.0]);
    }
}
