use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{Band, Department, Employee, EmploymentStatus, TimeEntry, WorkType};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra", "Donald", "Ashley", "Steven", "Kimberly", "Paul", "Emily",
    "Andrew", "Donna", "Joshua", "Michelle",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White",
];

const WORK_LOCATIONS: &[&str] = &[
    "Herndon, VA",
    "Seattle, WA",
    "New York, NY",
    "Austin, TX",
    "Chicago, IL",
    "San Francisco, CA",
    "Boston, MA",
    "Denver, CO",
    "Atlanta, GA",
    "Remote - US",
];

const SUPERVISORY_ORGS: &[&str] = &["AAB", "XYZ", "DEF", "GHI", "JKL", "MNO", "PQR", "STU"];

const JOB_PROFILES: &[(&str, &str, &str)] = &[
    ("Software Engineer", "JP001", "J001"),
    ("Senior Software Engineer", "JP002", "J002"),
    ("Data Analyst", "JP003", "J003"),
    ("Senior Data Analyst", "JP004", "J004"),
    ("Product Manager", "JP005", "J005"),
    ("Senior Product Manager", "JP006", "J006"),
    ("DevOps Engineer", "JP007", "J007"),
    ("UX Designer", "JP008", "J008"),
    ("Data Scientist", "JP009", "J009"),
    ("Business Analyst", "JP010", "J010"),
    ("Project Manager", "JP011", "J011"),
    ("QA Engineer", "JP012", "J012"),
];

pub const PROJECT_CODES: &[&str] = &[
    "PRJ001-Alpha",
    "PRJ002-Beta",
    "PRJ003-Gamma",
    "PRJ004-Delta",
    "PRJ005-Epsilon",
    "INT-001-Infrastructure",
    "MAINT-Support",
];

#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub employee_count: usize,
    pub days: i64,
    pub seed: Option<u64>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            employee_count: 75,
            days: 90,
            seed: None,
        }
    }
}

/// Synthetic employee and time tracking tables. Built once and shared
/// read-only behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub employees: Vec<Employee>,
    pub time_entries: Vec<TimeEntry>,
}

impl Fixtures {
    pub fn generate(config: &FixtureConfig, today: NaiveDate) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let employees = generate_employees(&mut rng, config.employee_count, today);
        let time_entries = generate_time_entries(&mut rng, &employees, config.days, today);
        Self {
            employees,
            time_entries,
        }
    }

    pub fn export_csv(&self, employees_path: &Path, time_entries_path: &Path) -> anyhow::Result<()> {
        write_csv(employees_path, &self.employees)?;
        write_csv(time_entries_path, &self.time_entries)?;
        Ok(())
    }
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

pub fn quarter_label(date: NaiveDate) -> String {
    format!("Q{} {}", (date.month() - 1) / 3 + 1, date.year())
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn generate_employees(rng: &mut StdRng, count: usize, today: NaiveDate) -> Vec<Employee> {
    let mut employees = Vec::with_capacity(count);

    for i in 0..count {
        let first_name = *pick(rng, FIRST_NAMES);
        let last_name = *pick(rng, LAST_NAMES);
        let age: u32 = rng.gen_range(22..=65);
        let siglum = *pick(rng, SUPERVISORY_ORGS);
        let (job_profile_name, job_profile_code, job_code) = *pick(rng, JOB_PROFILES);
        let cost_center_code = format!("CC{}{}", &siglum[..2], rng.gen_range(100..=999));
        let days_ago: i64 = rng.gen_range(180..=7300);
        let hire_date = today - Duration::days(days_ago);

        let band = if job_profile_name.contains("Senior") || job_profile_name.contains("Lead") {
            *pick(rng, &[Band::BIII, Band::BIV, Band::BV])
        } else {
            *pick(rng, &[Band::BI, Band::BII, Band::BIII])
        };

        let (employment_status, termination_date) = if rng.gen::<f64>() > 0.95 {
            let terminated = today - Duration::days(rng.gen_range(1..=180));
            (EmploymentStatus::Terminated, Some(terminated.max(hire_date)))
        } else {
            (EmploymentStatus::Active, None)
        };

        employees.push(Employee {
            corporate_id: format!("EMP{:05}", i + 1000),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            full_name: format!("{first_name} {last_name}"),
            age,
            year_of_birth: today.year() - age as i32,
            work_location: pick(rng, WORK_LOCATIONS).to_string(),
            supervisory_org: siglum.to_string(),
            job_profile_name: job_profile_name.to_string(),
            job_profile_code: job_profile_code.to_string(),
            cost_center_code,
            job_code: job_code.to_string(),
            position_title: job_profile_name.to_string(),
            hire_date,
            company_service_date: hire_date,
            band,
            department: Department::for_job_profile(job_profile_name),
            employment_status,
            termination_date,
            tenure_years: round_to(days_ago as f64 / 365.25, 1),
        });
    }

    employees
}

fn generate_time_entries(
    rng: &mut StdRng,
    employees: &[Employee],
    days: i64,
    today: NaiveDate,
) -> Vec<TimeEntry> {
    let base_date = today - Duration::days(days);
    let mut entries = Vec::new();

    for employee in employees.iter().filter(|employee| employee.is_active()) {
        for day in 0..days {
            let date = base_date + Duration::days(day);
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            if rng.gen::<f64>() > 0.9 {
                continue;
            }

            let entry_count = rng.gen_range(1..=4);
            let mut remaining: f64 = rng.gen_range(7.5..9.5);

            for index in 0..entry_count {
                let work_type = *pick(rng, &WorkType::ALL);
                let project_code = pick(rng, PROJECT_CODES).to_string();

                let hours = if index == entry_count - 1 {
                    remaining
                } else {
                    let slice = rng.gen_range(1.0..(remaining * 0.4).max(1.0 + f64::EPSILON));
                    remaining -= slice;
                    slice
                };

                entries.push(TimeEntry {
                    corporate_id: employee.corporate_id.clone(),
                    entry_date: date,
                    hours: round_to(hours, 2),
                    work_type,
                    project_code,
                    week_number: date.iso_week().week(),
                    month: month_label(date),
                    quarter: quarter_label(date),
                });
            }
        }
    }

    entries
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
