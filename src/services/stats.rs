use crate::types::db::{Project, ProjectStatus, User};
use crate::types::dto::stats::{
    Charts, ClientProjects, Kpis, MonthlyCount, StatsResponse, StatusCount, TechUsage,
};
use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Derive the full dashboard payload from the current collections. Pure,
/// recomputed on every request.
pub fn compute(projects: &[Project], users: &[User]) -> StatsResponse {
    let total_projects = projects.len() as u32;
    let active_projects = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Active)
        .count() as u32;
    let completed = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Completed)
        .count() as u32;
    let paused = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Paused)
        .count() as u32;

    // Percentage of finished work that finished successfully.
    let success_rate = if completed + paused == 0 {
        0
    } else {
        (100.0 * completed as f64 / (completed + paused) as f64).round() as u32
    };

    let mut by_client: HashMap<&str, u32> = HashMap::new();
    for project in projects {
        if !project.client.is_empty() {
            *by_client.entry(project.client.as_str()).or_default() += 1;
        }
    }
    let total_clients = by_client.len() as u32;

    let mut client_projects: Vec<ClientProjects> = by_client
        .into_iter()
        .map(|(client, count)| ClientProjects {
            client: client.to_string(),
            projects: count,
        })
        .collect();
    client_projects.sort_by(|a, b| b.projects.cmp(&a.projects).then(a.client.cmp(&b.client)));

    let mut by_status: HashMap<&str, u32> = HashMap::new();
    for project in projects {
        *by_status.entry(project.status.as_str()).or_default() += 1;
    }
    let mut projects_by_status: Vec<StatusCount> = by_status
        .into_iter()
        .map(|(name, value)| StatusCount {
            name: name.to_string(),
            value,
        })
        .collect();
    projects_by_status.sort_by(|a, b| b.value.cmp(&a.value).then(a.name.cmp(&b.name)));

    let mut by_tech: HashMap<&str, u32> = HashMap::new();
    for project in projects {
        for tech in &project.tech_stack {
            *by_tech.entry(tech.as_str()).or_default() += 1;
        }
    }
    let mut tech_stack_usage: Vec<TechUsage> = by_tech
        .into_iter()
        .map(|(tech, count)| TechUsage {
            tech: tech.to_string(),
            count,
        })
        .collect();
    tech_stack_usage.sort_by(|a, b| b.count.cmp(&a.count).then(a.tech.cmp(&b.tech)));
    tech_stack_usage.truncate(10);

    let mut users_by_role: HashMap<String, u32> = HashMap::new();
    for user in users {
        *users_by_role.entry(user.role.as_str().to_string()).or_default() += 1;
    }

    StatsResponse {
        kpis: Kpis {
            total_projects,
            active_projects,
            total_clients,
            success_rate,
            total_users: users.len() as u32,
            users_by_role,
        },
        charts: Charts {
            projects_by_status,
            client_projects,
            tech_stack_usage,
            monthly_projects: monthly_buckets(projects, Utc::now().year()),
        },
    }
}

/// Twelve buckets for the given calendar year, keyed on `createdAt`.
/// Unparseable dates simply fall out of every bucket.
fn monthly_buckets(projects: &[Project], year: i32) -> Vec<MonthlyCount> {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(index, month)| {
            let in_month: Vec<&Project> = projects
                .iter()
                .filter(|p| {
                    DateTime::parse_from_rfc3339(&p.created_at)
                        .map(|date| {
                            date.year() == year && date.month0() as usize == index
                        })
                        .unwrap_or(false)
                })
                .collect();

            MonthlyCount {
                month: month.to_string(),
                new: in_month.len() as u32,
                completed: in_month
                    .iter()
                    .filter(|p| p.status == ProjectStatus::Completed)
                    .count() as u32,
                active: in_month
                    .iter()
                    .filter(|p| p.status == ProjectStatus::Active)
                    .count() as u32,
            }
        })
        .collect()
}
