use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Active,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnHold => "On Hold",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub is_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A tracked project and the ideas it owns.
///
/// `description` and `status` default when absent so that collections written
/// before those fields existed still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub domain: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub ideas: Vec<Idea>,
    pub last_touched_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        id: i64,
        name: String,
        domain: String,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            domain,
            status: ProjectStatus::Active,
            ideas: Vec::new(),
            last_touched_at: now,
        }
    }

    pub fn idea(&self, idea_id: i64) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == idea_id)
    }

    pub fn idea_mut(&mut self, idea_id: i64) -> Option<&mut Idea> {
        self.ideas.iter_mut().find(|idea| idea.id == idea_id)
    }

    pub fn max_idea_id(&self) -> i64 {
        self.ideas.iter().map(|idea| idea.id).max().unwrap_or(0)
    }

    /// Appends a new idea. The id must not already be used by another idea.
    pub fn add_idea(&mut self, id: i64, name: String) -> Result<&Idea, AppError> {
        ensure_non_empty("idea name", &name)?;
        if self.idea(id).is_some() {
            return Err(AppError::InvalidInput(format!(
                "idea id {id} already exists in project {}",
                self.id
            )));
        }
        self.ideas.push(Idea {
            id,
            name,
            tasks: Vec::new(),
        });
        Ok(&self.ideas[self.ideas.len() - 1])
    }

    pub fn rename_idea(&mut self, idea_id: i64, name: String) -> Result<bool, AppError> {
        ensure_non_empty("idea name", &name)?;
        Ok(match self.idea_mut(idea_id) {
            Some(idea) => {
                idea.name = name;
                true
            }
            None => false,
        })
    }

    pub fn remove_idea(&mut self, idea_id: i64) -> bool {
        let before = self.ideas.len();
        self.ideas.retain(|idea| idea.id != idea_id);
        self.ideas.len() != before
    }

    pub fn progress(&self) -> Progress {
        self.ideas
            .iter()
            .map(Idea::progress)
            .fold(Progress::default(), |acc, item| Progress {
                done: acc.done + item.done,
                total: acc.total + item.total,
            })
    }

    pub fn vitality(&self, now: DateTime<Utc>) -> Vitality {
        Vitality::between(self.last_touched_at, now)
    }
}

impl Idea {
    pub fn task_mut(&mut self, task_id: i64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    pub fn max_task_id(&self) -> i64 {
        self.tasks.iter().map(|task| task.id).max().unwrap_or(0)
    }

    /// Appends an open task. The id must not already be used in this idea.
    pub fn add_task(&mut self, id: i64, name: String) -> Result<&Task, AppError> {
        ensure_non_empty("task name", &name)?;
        if self.tasks.iter().any(|task| task.id == id) {
            return Err(AppError::InvalidInput(format!(
                "task id {id} already exists in idea {}",
                self.id
            )));
        }
        self.tasks.push(Task {
            id,
            name,
            is_completed: false,
        });
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flips completion and returns the new state, or `None` for an unknown id.
    pub fn toggle_task(&mut self, task_id: i64) -> Option<bool> {
        let task = self.task_mut(task_id)?;
        task.is_completed = !task.is_completed;
        Some(task.is_completed)
    }

    pub fn rename_task(&mut self, task_id: i64, name: String) -> Result<bool, AppError> {
        ensure_non_empty("task name", &name)?;
        Ok(match self.task_mut(task_id) {
            Some(task) => {
                task.name = name;
                true
            }
            None => false,
        })
    }

    pub fn remove_task(&mut self, task_id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        self.tasks.len() != before
    }

    pub fn progress(&self) -> Progress {
        Progress {
            done: self.tasks.iter().filter(|task| task.is_completed).count(),
            total: self.tasks.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VitalityTier {
    Bright,
    Fading,
    Dormant,
}

impl VitalityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bright => "bright",
            Self::Fading => "fading",
            Self::Dormant => "dormant",
        }
    }
}

/// How recently a project was touched, in whole days.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Vitality {
    pub days_ago: i64,
    pub tier: VitalityTier,
}

impl Vitality {
    const BRIGHT_DAYS: i64 = 3;
    const FADING_DAYS: i64 = 14;

    pub fn between(touched_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days_ago = ((now - touched_at).num_seconds() / 86_400).max(0);
        let tier = if days_ago <= Self::BRIGHT_DAYS {
            VitalityTier::Bright
        } else if days_ago <= Self::FADING_DAYS {
            VitalityTier::Fading
        } else {
            VitalityTier::Dormant
        };
        Self { days_ago, tier }
    }

    pub fn label(&self) -> String {
        match self.days_ago {
            0 => "touched today".to_string(),
            1 => "touched yesterday".to_string(),
            days => format!("touched {days} days ago"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ProjectSort {
    #[default]
    LastTouched,
    Name,
    Ideas,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum DomainFilter {
    #[default]
    All,
    Only(String),
}

impl DomainFilter {
    pub fn from_option(domain: Option<String>) -> Self {
        match domain {
            Some(domain) => Self::Only(domain.trim().to_string()),
            None => Self::All,
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        match self {
            Self::All => true,
            Self::Only(domain) => project.domain == *domain,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProjectQuery {
    pub domain: DomainFilter,
    pub status: Option<ProjectStatus>,
    pub sort: ProjectSort,
}

impl ProjectQuery {
    /// Filters and orders `projects`. Sorting is stable, so ties keep stored order.
    pub fn apply(&self, mut projects: Vec<Project>) -> Vec<Project> {
        projects.retain(|project| {
            self.domain.matches(project)
                && self.status.map_or(true, |status| project.status == status)
        });
        match self.sort {
            ProjectSort::LastTouched => {
                projects.sort_by(|a, b| b.last_touched_at.cmp(&a.last_touched_at))
            }
            ProjectSort::Name => {
                projects.sort_by_cached_key(|project| project.name.to_lowercase())
            }
            ProjectSort::Ideas => projects.sort_by(|a, b| b.ideas.len().cmp(&a.ideas.len())),
        }
        projects
    }
}

/// Issues time-ordered ids that never repeat within a process.
///
/// The next id is the largest of the current epoch millisecond, the last issued
/// id plus one, and `floor + 1` where `floor` is the largest id already present
/// in the sequence the id is destined for.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn next_above(&self, floor: i64) -> Result<i64, AppError> {
        let now = Utc::now().timestamp_millis();
        let above_floor = floor.checked_add(1).ok_or_else(id_space_exhausted)?;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let after_last = current.checked_add(1).ok_or_else(id_space_exhausted)?;
            let candidate = now.max(after_last).max(above_floor);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(candidate),
                Err(actual) => current = actual,
            }
        }
    }
}

fn id_space_exhausted() -> AppError {
    AppError::InvalidInput("id space exhausted".to_string())
}

/// Trims a domain name and rejects blank input.
pub fn normalize_domain(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidDomain(name.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn ensure_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{label} cannot be empty")));
    }
    Ok(())
}
