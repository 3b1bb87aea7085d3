use chrono::{DateTime, Utc};

use crate::model::{Idea, Project};

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

fn checkbox(done: bool) -> &'static str {
    if done {
        "x"
    } else {
        " "
    }
}

pub fn format_project_detail(project: &Project, now: DateTime<Utc>) -> String {
    let vitality = project.vitality(now);
    let progress = project.progress();
    let mut output = String::new();
    output.push_str(&format!("Project ID: {}\n", project.id));
    output.push_str(&format!("Name: {}\n", project.name));
    output.push_str(&format!("Domain: {}\n", project.domain));
    output.push_str(&format!("Status: {}\n", project.status.as_str()));
    if !project.description.trim().is_empty() {
        output.push_str(&format!("Description: {}\n", project.description));
    }
    output.push_str(&format!(
        "Last touched: {} ({}, {})\n",
        format_datetime(project.last_touched_at),
        vitality.label(),
        vitality.tier.as_str()
    ));
    output.push_str(&format!("Tasks: {}/{}\n", progress.done, progress.total));
    output.push('\n');
    if project.ideas.is_empty() {
        output.push_str("Ideas: (none)");
        return output;
    }
    output.push_str("Ideas:\n");
    for idea in &project.ideas {
        output.push_str(&format_idea(idea));
    }
    output.trim_end().to_string()
}

fn format_idea(idea: &Idea) -> String {
    let progress = idea.progress();
    let mut output = format!(
        "- {} (idea id {}, tasks {}/{})\n",
        idea.name, idea.id, progress.done, progress.total
    );
    for task in &idea.tasks {
        output.push_str(&format!(
            "  - [{}] {} (task id {})\n",
            checkbox(task.is_completed),
            task.name,
            task.id
        ));
    }
    output
}

pub fn format_project_table(projects: &[Project], now: DateTime<Utc>) -> String {
    let mut output = format!(
        "{:<15} {:<8} {:<17} {:<6} {:<24} {}\n",
        "ID", "STATUS", "DOMAIN", "IDEAS", "NAME", "TOUCHED"
    );
    for project in projects {
        output.push_str(&format!(
            "{:<15} {:<8} {:<17} {:<6} {:<24} {}\n",
            project.id,
            project.status.as_str(),
            project.domain,
            project.ideas.len(),
            project.name,
            project.vitality(now).label()
        ));
    }
    output.trim_end().to_string()
}
