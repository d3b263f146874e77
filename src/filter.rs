use std::borrow::Cow;
use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::fixtures::{month_label, quarter_label};
use crate::models::{Employee, FilteredDataset, QueryIntent, TimeEntry, TimePeriod};

enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Missing,
}

impl FieldValue<'_> {
    fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (FieldValue::Text(actual), Value::String(expected)) => actual == expected,
            (FieldValue::Number(actual), Value::Number(expected)) => {
                expected.as_f64().is_some_and(|expected| *actual == expected)
            }
            _ => false,
        }
    }
}

/// Looks up an employee column by its export header. `None` for unknown names.
fn field_value<'a>(employee: &'a Employee, field: &str) -> Option<FieldValue<'a>> {
    let text = |value: &'a str| Some(FieldValue::Text(Cow::Borrowed(value)));
    let date = |value: NaiveDate| Some(FieldValue::Text(Cow::Owned(value.to_string())));

    match field {
        "Corporate_ID" => text(&employee.corporate_id),
        "First_Name" => text(&employee.first_name),
        "Last_Name" => text(&employee.last_name),
        "Full_Name" => text(&employee.full_name),
        "Age" => Some(FieldValue::Number(f64::from(employee.age))),
        "Year_of_Birth" => Some(FieldValue::Number(f64::from(employee.year_of_birth))),
        "Work_Location" => text(&employee.work_location),
        "Supervisory_Organization_Siglum" => text(&employee.supervisory_org),
        "Job_Profile_Name" => text(&employee.job_profile_name),
        "Job_Profile_Code" => text(&employee.job_profile_code),
        "Cost_Center_Code" => text(&employee.cost_center_code),
        "Job_Code" => text(&employee.job_code),
        "Position_Title" => text(&employee.position_title),
        "Hire_Date" => date(employee.hire_date),
        "Company_Service_Date" => date(employee.company_service_date),
        "Band" => text(employee.band.as_str()),
        "Department" => text(employee.department.as_str()),
        "Employment_Status" => text(employee.employment_status.as_str()),
        "Termination_Date" => Some(
            employee
                .termination_date
                .map(|value| FieldValue::Text(Cow::Owned(value.to_string())))
                .unwrap_or(FieldValue::Missing),
        ),
        "Tenure_Years" => Some(FieldValue::Number(employee.tenure_years)),
        _ => None,
    }
}

fn matches_filters(employee: &Employee, intent: &QueryIntent) -> bool {
    intent.filters.iter().all(|(field, expected)| {
        match field_value(employee, field) {
            Some(actual) => actual.matches(expected),
            None => true,
        }
    })
}

fn within_period(entry: &TimeEntry, period: Option<TimePeriod>, today: NaiveDate) -> bool {
    match period {
        Some(TimePeriod::ThisQuarter) => entry.quarter == quarter_label(today),
        Some(TimePeriod::ThisMonth) => entry.month == month_label(today),
        Some(TimePeriod::Last90Days) | None => true,
    }
}

/// Applies the intent's equality filters to `employees` and keeps the time
/// entries owned by the survivors that fall inside the intent's period.
pub fn filter_dataset(
    intent: &QueryIntent,
    employees: &[Employee],
    time_entries: &[TimeEntry],
    today: NaiveDate,
) -> FilteredDataset {
    let employees: Vec<Employee> = employees
        .iter()
        .filter(|employee| matches_filters(employee, intent))
        .cloned()
        .collect();

    let ids: HashSet<&str> = employees
        .iter()
        .map(|employee| employee.corporate_id.as_str())
        .collect();

    let time_entries = time_entries
        .iter()
        .filter(|entry| ids.contains(entry.corporate_id.as_str()))
        .filter(|entry| within_period(entry, intent.time_period, today))
        .cloned()
        .collect();

    FilteredDataset {
        employees,
        time_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixtureConfig, Fixtures};
    use crate::models::DashboardType;
    use std::collections::BTreeMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 11).unwrap()
    }

    fn fixtures() -> Fixtures {
        let config = FixtureConfig {
            seed: Some(11),
            ..FixtureConfig::default()
        };
        Fixtures::generate(&config, today())
    }

    fn intent(filters: &[(&str, Value)], time_period: Option<TimePeriod>) -> QueryIntent {
        QueryIntent {
            dashboard_type: DashboardType::General,
            filters: filters
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect::<BTreeMap<_, _>>(),
            focus: "general overview".to_string(),
            time_period,
        }
    }

    fn assert_referential(dataset: &FilteredDataset) {
        let ids: HashSet<&str> = dataset
            .employees
            .iter()
            .map(|employee| employee.corporate_id.as_str())
            .collect();
        assert!(dataset
            .time_entries
            .iter()
            .all(|entry| ids.contains(entry.corporate_id.as_str())));
    }

    #[test]
    fn empty_filters_keep_everything() {
        let fixtures = fixtures();
        let dataset = filter_dataset(
            &intent(&[], None),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert_eq!(dataset.employees.len(), fixtures.employees.len());
        assert_eq!(dataset.time_entries.len(), fixtures.time_entries.len());
    }

    #[test]
    fn filters_combine_conjunctively() {
        let fixtures = fixtures();
        let query = intent(
            &[
                ("Department", Value::from("Engineering")),
                ("Work_Location", Value::from("Seattle, WA")),
            ],
            None,
        );
        let dataset = filter_dataset(&query, &fixtures.employees, &fixtures.time_entries, today());

        for employee in &dataset.employees {
            assert_eq!(employee.department.as_str(), "Engineering");
            assert_eq!(employee.work_location, "Seattle, WA");
        }
        let expected = fixtures
            .employees
            .iter()
            .filter(|e| e.department.as_str() == "Engineering" && e.work_location == "Seattle, WA")
            .count();
        assert_eq!(dataset.employees.len(), expected);
        assert_referential(&dataset);
    }

    #[test]
    fn numeric_fields_compare_numerically() {
        let fixtures = fixtures();
        let age = fixtures.employees[0].age;
        let dataset = filter_dataset(
            &intent(&[("Age", Value::from(age))], None),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert!(!dataset.employees.is_empty());
        assert!(dataset.employees.iter().all(|employee| employee.age == age));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let fixtures = fixtures();
        let dataset = filter_dataset(
            &intent(&[("Favorite_Color", Value::from("teal"))], None),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert_eq!(dataset.employees.len(), fixtures.employees.len());
    }

    #[test]
    fn unmatched_filter_empties_both_tables() {
        let fixtures = fixtures();
        let dataset = filter_dataset(
            &intent(&[("Work_Location", Value::from("Lisbon, PT"))], None),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert!(dataset.employees.is_empty());
        assert!(dataset.time_entries.is_empty());
    }

    #[test]
    fn time_period_restricts_entries() {
        let fixtures = fixtures();
        let quarter = filter_dataset(
            &intent(&[], Some(TimePeriod::ThisQuarter)),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert!(!quarter.time_entries.is_empty());
        assert!(quarter.time_entries.iter().all(|entry| entry.quarter == "Q1 2026"));
        assert!(quarter.time_entries.len() < fixtures.time_entries.len());

        let month = filter_dataset(
            &intent(&[], Some(TimePeriod::ThisMonth)),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert!(month.time_entries.iter().all(|entry| entry.month == "2026-02"));
        assert!(month.time_entries.len() < quarter.time_entries.len());
    }

    #[test]
    fn filtering_is_idempotent() {
        let fixtures = fixtures();
        let query = intent(
            &[("Band", Value::from("BII"))],
            Some(TimePeriod::ThisQuarter),
        );
        let once = filter_dataset(&query, &fixtures.employees, &fixtures.time_entries, today());
        let twice = filter_dataset(&query, &once.employees, &once.time_entries, today());
        assert_eq!(once, twice);
        assert_referential(&once);
    }

    #[test]
    fn terminated_status_filter_has_no_time_entries() {
        let fixtures = fixtures();
        let dataset = filter_dataset(
            &intent(&[("Employment_Status", Value::from("Terminated"))], None),
            &fixtures.employees,
            &fixtures.time_entries,
            today(),
        );
        assert!(dataset
            .employees
            .iter()
            .all(|employee| !employee.is_active()));
        assert!(dataset.time_entries.is_empty());
    }
}
