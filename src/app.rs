use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::model::{
    normalize_domain, DomainFilter, IdGenerator, Project, ProjectQuery, ProjectSort,
    VitalityTier,
};
use crate::seed::{seed_domains, seed_projects};
use crate::store::{self, DOMAINS_KEY, PROJECTS_KEY};

/// The project store service.
///
/// Every operation is one load-modify-store cycle inside a single transaction
/// over the blob store. Nested idea and task edits are not operations here:
/// callers build the new project value and hand it to [`App::update_project`].
pub struct App {
    db: DatabaseConnection,
    ids: IdGenerator,
}

impl App {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            ids: IdGenerator::default(),
        }
    }

    /// Returns a fresh id strictly above `floor`.
    pub fn next_id(&self, floor: i64) -> Result<i64, AppError> {
        self.ids.next_above(floor)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let txn = self.db.begin().await?;
        let result = load_projects(&txn).await;
        let projects = finalize_transaction(txn, result).await?;
        debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }

    pub async fn create_project(
        &self,
        name: String,
        domain: String,
        description: String,
    ) -> Result<Project, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<Project, AppError> = async {
            let mut projects = load_projects(&txn).await?;
            let floor = projects.iter().map(|project| project.id).max().unwrap_or(0);
            let id = self.next_id(floor)?;
            let project = Project::new(id, name, domain, description, Utc::now());
            projects.push(project.clone());
            save_projects(&txn, &projects).await?;
            info!(id = project.id, domain = %project.domain, "created project");
            Ok(project)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// Replaces the stored project with the same id and stamps `last_touched_at`.
    ///
    /// An unknown id leaves the stored collection as it was; the input is still
    /// returned with a fresh timestamp.
    pub async fn update_project(&self, project: Project) -> Result<Project, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<Project, AppError> = async {
            let mut projects = load_projects(&txn).await?;
            let updated = match projects.iter_mut().find(|stored| stored.id == project.id) {
                Some(stored) => {
                    let touched = touch_time(stored.last_touched_at);
                    *stored = Project {
                        last_touched_at: touched,
                        ..project
                    };
                    info!(id = stored.id, "updated project");
                    stored.clone()
                }
                None => {
                    warn!(id = project.id, "update for unknown project id discarded");
                    Project {
                        last_touched_at: Utc::now(),
                        ..project
                    }
                }
            };
            save_projects(&txn, &projects).await?;
            Ok(updated)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            let mut projects = load_projects(&txn).await?;
            let before = projects.len();
            projects.retain(|project| project.id != id);
            save_projects(&txn, &projects).await?;
            if projects.len() == before {
                debug!(id, "delete for unknown project id");
            } else {
                info!(id, "deleted project");
            }
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn list_domains(&self) -> Result<Vec<String>, AppError> {
        let txn = self.db.begin().await?;
        let result = load_domains(&txn).await;
        let domains = finalize_transaction(txn, result).await?;
        debug!(count = domains.len(), "listed domains");
        Ok(domains)
    }

    /// Registers a domain. Fails when the trimmed name is blank or already known.
    pub async fn add_domain(&self, name: &str) -> Result<String, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<String, AppError> = async {
            let mut domains = load_domains(&txn).await?;
            let trimmed = normalize_domain(name)?;
            if domains.contains(&trimmed) {
                return Err(AppError::InvalidDomain(trimmed));
            }
            domains.push(trimmed.clone());
            store::write_json(&txn, DOMAINS_KEY, &domains).await?;
            info!(domain = %trimmed, "registered domain");
            Ok(trimmed)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// Unregisters a domain. Refuses while any project still uses it.
    pub async fn remove_domain(&self, name: &str) -> Result<String, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<String, AppError> = async {
            let trimmed = name.trim().to_string();
            let mut domains = load_domains(&txn).await?;
            if !domains.contains(&trimmed) {
                return Err(AppError::NotFound(format!("domain `{trimmed}`")));
            }
            let projects = load_projects(&txn).await?;
            let count = projects
                .iter()
                .filter(|project| project.domain == trimmed)
                .count();
            if count > 0 {
                return Err(AppError::DomainInUse {
                    domain: trimmed,
                    count,
                });
            }
            domains.retain(|domain| *domain != trimmed);
            store::write_json(&txn, DOMAINS_KEY, &domains).await?;
            info!(domain = %trimmed, "removed domain");
            Ok(trimmed)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, AppError> {
        self.list_projects()
            .await?
            .into_iter()
            .find(|project| project.id == id)
            .ok_or_else(|| AppError::NotFound(format!("project id {id}")))
    }

    pub async fn query_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, AppError> {
        let projects = self.list_projects().await?;
        Ok(query.apply(projects))
    }

    /// The most recently touched project.
    pub async fn resume_project(&self) -> Result<Option<Project>, AppError> {
        let projects = self.list_projects().await?;
        Ok(projects
            .into_iter()
            .reduce(|best, project| {
                if project.last_touched_at > best.last_touched_at {
                    project
                } else {
                    best
                }
            }))
    }

    /// Dormant projects, oldest first.
    pub async fn forgotten_projects(&self, now: DateTime<Utc>) -> Result<Vec<Project>, AppError> {
        let mut projects = self.list_projects().await?;
        projects.retain(|project| project.vitality(now).tier == VitalityTier::Dormant);
        projects.sort_by(|a, b| a.last_touched_at.cmp(&b.last_touched_at));
        Ok(projects)
    }

    pub async fn pick_project<R: Rng + ?Sized>(
        &self,
        domain: &DomainFilter,
        rng: &mut R,
    ) -> Result<Option<Project>, AppError> {
        let query = ProjectQuery {
            domain: domain.clone(),
            status: None,
            sort: ProjectSort::LastTouched,
        };
        let candidates = self.query_projects(&query).await?;
        Ok(candidates.choose(rng).cloned())
    }
}

async fn load_projects<C: ConnectionTrait>(conn: &C) -> Result<Vec<Project>, AppError> {
    if let Some(projects) = store::read_json(conn, PROJECTS_KEY).await? {
        return Ok(projects);
    }
    let projects = seed_projects();
    store::write_json(conn, PROJECTS_KEY, &projects).await?;
    info!(count = projects.len(), "seeded project collection");
    Ok(projects)
}

async fn save_projects<C: ConnectionTrait>(conn: &C, projects: &[Project]) -> Result<(), AppError> {
    store::write_json(conn, PROJECTS_KEY, projects).await
}

async fn load_domains<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, AppError> {
    if let Some(domains) = store::read_json(conn, DOMAINS_KEY).await? {
        return Ok(domains);
    }
    let domains = seed_domains();
    store::write_json(conn, DOMAINS_KEY, &domains).await?;
    info!(count = domains.len(), "seeded domain registry");
    Ok(domains)
}

fn touch_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}

async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                return Err(rollback_err.into());
            }
            Err(err)
        }
    }
}
