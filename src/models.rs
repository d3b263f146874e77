use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    BI,
    BII,
    BIII,
    BIV,
    BV,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::BI, Band::BII, Band::BIII, Band::BIV, Band::BV];

    pub fn as_str(self) -> &'static str {
        match self {
            Band::BI => "BI",
            Band::BII => "BII",
            Band::BIII => "BIII",
            Band::BIV => "BIV",
            Band::BV => "BV",
        }
    }

    pub fn is_senior(self) -> bool {
        matches!(self, Band::BIV | Band::BV)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Data & Analytics")]
    DataAnalytics,
    Design,
    Engineering,
    Operations,
    #[serde(rename = "Product Management")]
    ProductManagement,
    #[serde(rename = "Quality Assurance")]
    QualityAssurance,
}

impl Department {
    /// Derives the department from a job profile name.
    pub fn for_job_profile(profile: &str) -> Self {
        if profile.contains("Engineer") || profile.contains("DevOps") {
            Department::Engineering
        } else if profile.contains("Data") {
            Department::DataAnalytics
        } else if profile.contains("Product") {
            Department::ProductManagement
        } else if profile.contains("UX") || profile.contains("Designer") {
            Department::Design
        } else if profile.contains("QA") {
            Department::QualityAssurance
        } else {
            Department::Operations
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Department::DataAnalytics => "Data & Analytics",
            Department::Design => "Design",
            Department::Engineering => "Engineering",
            Department::Operations => "Operations",
            Department::ProductManagement => "Product Management",
            Department::QualityAssurance => "Quality Assurance",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Active,
    Terminated,
}

impl EmploymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentStatus::Active => "Active",
            EmploymentStatus::Terminated => "Terminated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkType {
    Administrative,
    #[serde(rename = "Client Communication")]
    ClientCommunication,
    #[serde(rename = "Code Review")]
    CodeReview,
    Documentation,
    Meetings,
    #[serde(rename = "Project Work")]
    ProjectWork,
    Training,
}

impl WorkType {
    pub const ALL: [WorkType; 7] = [
        WorkType::ProjectWork,
        WorkType::Meetings,
        WorkType::Training,
        WorkType::Administrative,
        WorkType::CodeReview,
        WorkType::Documentation,
        WorkType::ClientCommunication,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkType::Administrative => "Administrative",
            WorkType::ClientCommunication => "Client Communication",
            WorkType::CodeReview => "Code Review",
            WorkType::Documentation => "Documentation",
            WorkType::Meetings => "Meetings",
            WorkType::ProjectWork => "Project Work",
            WorkType::Training => "Training",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per person. Column names match the CSV export headers and the
/// field names accepted in `QueryIntent::filters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "Corporate_ID")]
    pub corporate_id: String,
    #[serde(rename = "First_Name")]
    pub first_name: String,
    #[serde(rename = "Last_Name")]
    pub last_name: String,
    #[serde(rename = "Full_Name")]
    pub full_name: String,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Year_of_Birth")]
    pub year_of_birth: i32,
    #[serde(rename = "Work_Location")]
    pub work_location: String,
    #[serde(rename = "Supervisory_Organization_Siglum")]
    pub supervisory_org: String,
    #[serde(rename = "Job_Profile_Name")]
    pub job_profile_name: String,
    #[serde(rename = "Job_Profile_Code")]
    pub job_profile_code: String,
    #[serde(rename = "Cost_Center_Code")]
    pub cost_center_code: String,
    #[serde(rename = "Job_Code")]
    pub job_code: String,
    #[serde(rename = "Position_Title")]
    pub position_title: String,
    #[serde(rename = "Hire_Date")]
    pub hire_date: NaiveDate,
    #[serde(rename = "Company_Service_Date")]
    pub company_service_date: NaiveDate,
    #[serde(rename = "Band")]
    pub band: Band,
    #[serde(rename = "Department")]
    pub department: Department,
    #[serde(rename = "Employment_Status")]
    pub employment_status: EmploymentStatus,
    #[serde(rename = "Termination_Date")]
    pub termination_date: Option<NaiveDate>,
    #[serde(rename = "Tenure_Years")]
    pub tenure_years: f64,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.employment_status == EmploymentStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(rename = "Corporate_ID")]
    pub corporate_id: String,
    #[serde(rename = "Entry_Date")]
    pub entry_date: NaiveDate,
    #[serde(rename = "Hours")]
    pub hours: f64,
    #[serde(rename = "Work_Type")]
    pub work_type: WorkType,
    #[serde(rename = "Project_Code")]
    pub project_code: String,
    #[serde(rename = "Week_Number")]
    pub week_number: u32,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Quarter")]
    pub quarter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardType {
    Attrition,
    Hours,
    Demographics,
    BandAnalysis,
    LocationCompare,
    Project,
    General,
}

impl DashboardType {
    /// Unknown labels resolve to `General`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "attrition" => DashboardType::Attrition,
            "hours" => DashboardType::Hours,
            "demographics" => DashboardType::Demographics,
            "band_analysis" => DashboardType::BandAnalysis,
            "location_compare" => DashboardType::LocationCompare,
            "project" => DashboardType::Project,
            _ => DashboardType::General,
        }
    }
}

impl<'de> Deserialize<'de> for DashboardType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(DashboardType::from_label(&label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "this quarter")]
    ThisQuarter,
    #[serde(rename = "this month")]
    ThisMonth,
    #[serde(rename = "last 90 days")]
    Last90Days,
}

impl TimePeriod {
    pub fn title(self) -> &'static str {
        match self {
            TimePeriod::ThisQuarter => "This Quarter",
            TimePeriod::ThisMonth => "This Month",
            TimePeriod::Last90Days => "Last 90 Days",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub dashboard_type: DashboardType,
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
    #[serde(default = "default_focus")]
    pub focus: String,
    #[serde(default)]
    pub time_period: Option<TimePeriod>,
}

fn default_focus() -> String {
    "dashboard".to_string()
}

/// Employees matching an intent's filters and the time entries that belong
/// to them. Every `TimeEntry::corporate_id` appears in `employees`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredDataset {
    pub employees: Vec<Employee>,
    pub time_entries: Vec<TimeEntry>,
}

impl FilteredDataset {
    pub fn active_employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|employee| employee.is_active())
    }
}
