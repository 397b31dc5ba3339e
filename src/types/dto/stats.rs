use poem_openapi::Object;
use std::collections::HashMap;

/// Headline figures for the dashboard.
#[derive(Object, Debug, PartialEq)]
#[oai(rename_all = "camelCase")]
pub struct Kpis {
    pub total_projects: u32,
    pub active_projects: u32,
    pub total_clients: u32,
    /// Rounded percentage of completed over completed+paused projects.
    pub success_rate: u32,
    pub total_users: u32,
    pub users_by_role: HashMap<String, u32>,
}

#[derive(Object, Debug, PartialEq)]
pub struct StatusCount {
    pub name: String,
    pub value: u32,
}

#[derive(Object, Debug, PartialEq)]
pub struct ClientProjects {
    pub client: String,
    pub projects: u32,
}

#[derive(Object, Debug, PartialEq)]
pub struct TechUsage {
    pub tech: String,
    pub count: u32,
}

/// Projects created in one month of the current calendar year.
#[derive(Object, Debug, PartialEq)]
pub struct MonthlyCount {
    pub month: String,
    pub new: u32,
    pub completed: u32,
    pub active: u32,
}

#[derive(Object, Debug, PartialEq)]
#[oai(rename_all = "camelCase")]
pub struct Charts {
    pub projects_by_status: Vec<StatusCount>,
    pub client_projects: Vec<ClientProjects>,
    pub tech_stack_usage: Vec<TechUsage>,
    pub monthly_projects: Vec<MonthlyCount>,
}

/// Full statistics payload; derived on every request, never stored.
#[derive(Object, Debug, PartialEq)]
pub struct StatsResponse {
    pub kpis: Kpis,
    pub charts: Charts,
}
