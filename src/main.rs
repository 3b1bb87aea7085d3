mod app;
mod cli;
mod db;
mod entities;
mod error;
mod model;
mod seed;
mod store;
mod util;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{
    Cli, Command, DomainCommand, DomainName, IdeaAdd, IdeaCommand, IdeaRef, IdeaRename,
    ProjectAdd, ProjectCommand, ProjectList, ProjectPick, ProjectRemove, ProjectShow,
    ProjectUpdate, TaskAdd, TaskCommand, TaskRef, TaskRename,
};
use crate::error::AppError;
use crate::model::{ensure_non_empty, DomainFilter, Idea, Project, ProjectQuery};
use crate::util::{format_project_detail, format_project_table};

const LOG_ENV: &str = "UNIVERSE_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // Stdout carries command output; diagnostics go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<(), AppError> {
    let Cli { data_dir, command } = Cli::parse();

    let data_dir = db::resolve_data_dir(data_dir)?;
    let db_path = db::resolve_db_path(&data_dir);
    db::ensure_parent_dir(&db_path)?;
    let mut lock = db::open_lock(&db_path)?;
    let _guard = lock.write()?;

    let db = db::connect(&db_path).await?;
    db::ensure_schema(&db).await?;
    let app = App::new(db);

    match command {
        Command::Project(command) => handle_project(&app, command).await,
        Command::Idea(command) => handle_idea(&app, command).await,
        Command::Task(command) => handle_task(&app, command).await,
        Command::Domain(command) => handle_domain(&app, command).await,
    }
}

async fn handle_project(app: &App, command: ProjectCommand) -> Result<(), AppError> {
    match command {
        ProjectCommand::Add(args) => handle_project_add(app, args).await,
        ProjectCommand::List(args) => handle_project_list(app, args).await,
        ProjectCommand::Show(args) => handle_project_show(app, args).await,
        ProjectCommand::Update(args) => handle_project_update(app, args).await,
        ProjectCommand::Remove(args) => handle_project_remove(app, args).await,
        ProjectCommand::Resume => handle_project_resume(app).await,
        ProjectCommand::Forgotten => handle_project_forgotten(app).await,
        ProjectCommand::Pick(args) => handle_project_pick(app, args).await,
    }
}

async fn handle_idea(app: &App, command: IdeaCommand) -> Result<(), AppError> {
    match command {
        IdeaCommand::Add(args) => handle_idea_add(app, args).await,
        IdeaCommand::Rename(args) => handle_idea_rename(app, args).await,
        IdeaCommand::Remove(args) => handle_idea_remove(app, args).await,
    }
}

async fn handle_task(app: &App, command: TaskCommand) -> Result<(), AppError> {
    match command {
        TaskCommand::Add(args) => handle_task_add(app, args).await,
        TaskCommand::Toggle(args) => handle_task_toggle(app, args).await,
        TaskCommand::Rename(args) => handle_task_rename(app, args).await,
        TaskCommand::Remove(args) => handle_task_remove(app, args).await,
    }
}

async fn handle_domain(app: &App, command: DomainCommand) -> Result<(), AppError> {
    match command {
        DomainCommand::List => {
            for domain in app.list_domains().await? {
                println!("{domain}");
            }
            Ok(())
        }
        DomainCommand::Add(DomainName { name }) => {
            let added = app.add_domain(&name).await?;
            println!("Added domain: {added}");
            Ok(())
        }
        DomainCommand::Remove(DomainName { name }) => {
            let removed = app.remove_domain(&name).await?;
            println!("Removed domain: {removed}");
            Ok(())
        }
    }
}

async fn handle_project_add(app: &App, args: ProjectAdd) -> Result<(), AppError> {
    let ProjectAdd {
        name,
        domain,
        description,
        new_domain,
    } = args;
    let name = name.trim().to_string();
    ensure_non_empty("project name", &name)?;
    let domain = if new_domain {
        app.add_domain(&domain).await?
    } else {
        domain.trim().to_string()
    };
    ensure_non_empty("project domain", &domain)?;

    let project = app
        .create_project(name, domain, description.trim().to_string())
        .await?;
    println!("Created project ID: {}: {}", project.id, project.name);
    Ok(())
}

async fn handle_project_list(app: &App, args: ProjectList) -> Result<(), AppError> {
    let query = ProjectQuery {
        domain: DomainFilter::from_option(args.domain),
        status: args.status.map(Into::into),
        sort: args.sort.into(),
    };
    let projects = app.query_projects(&query).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }
    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }
    println!("{}", format_project_table(&projects, Utc::now()));
    Ok(())
}

async fn handle_project_show(app: &App, args: ProjectShow) -> Result<(), AppError> {
    let project = app.get_project(args.id).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        println!("{}", format_project_detail(&project, Utc::now()));
    }
    Ok(())
}

async fn handle_project_update(app: &App, args: ProjectUpdate) -> Result<(), AppError> {
    let ProjectUpdate {
        id,
        name,
        description,
        domain,
        status,
    } = args;
    let mut project = app.get_project(id).await?;
    if let Some(name) = name {
        ensure_non_empty("project name", &name)?;
        project.name = name.trim().to_string();
    }
    if let Some(description) = description {
        project.description = description.trim().to_string();
    }
    if let Some(domain) = domain {
        ensure_non_empty("project domain", &domain)?;
        project.domain = domain.trim().to_string();
    }
    if let Some(status) = status {
        project.status = status.into();
    }

    let updated = app.update_project(project).await?;
    println!("Updated project ID: {}", updated.id);
    Ok(())
}

async fn handle_project_remove(app: &App, args: ProjectRemove) -> Result<(), AppError> {
    app.delete_project(args.id).await?;
    println!("Removed project ID: {}", args.id);
    Ok(())
}

async fn handle_project_resume(app: &App) -> Result<(), AppError> {
    match app.resume_project().await? {
        Some(project) => println!("{}", format_project_detail(&project, Utc::now())),
        None => println!("No projects found."),
    }
    Ok(())
}

async fn handle_project_forgotten(app: &App) -> Result<(), AppError> {
    let now = Utc::now();
    let projects = app.forgotten_projects(now).await?;
    if projects.is_empty() {
        println!("No forgotten projects.");
        return Ok(());
    }
    println!("{}", format_project_table(&projects, now));
    Ok(())
}

async fn handle_project_pick(app: &App, args: ProjectPick) -> Result<(), AppError> {
    let filter = DomainFilter::from_option(args.domain);
    let mut rng = rand::thread_rng();
    match app.pick_project(&filter, &mut rng).await? {
        Some(project) => println!("{}", format_project_detail(&project, Utc::now())),
        None => println!("No projects found."),
    }
    Ok(())
}

async fn handle_idea_add(app: &App, args: IdeaAdd) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    let id = app.next_id(project.max_idea_id())?;
    project.add_idea(id, args.name)?;
    let updated = app.update_project(project).await?;
    println!("Created idea ID: {} in project {}", id, updated.id);
    Ok(())
}

async fn handle_idea_rename(app: &App, args: IdeaRename) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    if !project.rename_idea(args.idea_id, args.name)? {
        return Err(missing_idea(&project, args.idea_id));
    }
    app.update_project(project).await?;
    println!("Renamed idea ID: {}", args.idea_id);
    Ok(())
}

async fn handle_idea_remove(app: &App, args: IdeaRef) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    if !project.remove_idea(args.idea_id) {
        return Err(missing_idea(&project, args.idea_id));
    }
    app.update_project(project).await?;
    println!("Removed idea ID: {}", args.idea_id);
    Ok(())
}

async fn handle_task_add(app: &App, args: TaskAdd) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    let idea = idea_in(&mut project, args.idea_id)?;
    let id = app.next_id(idea.max_task_id())?;
    idea.add_task(id, args.name)?;
    app.update_project(project).await?;
    println!("Created task ID: {} in idea {}", id, args.idea_id);
    Ok(())
}

async fn handle_task_toggle(app: &App, args: TaskRef) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    let idea = idea_in(&mut project, args.idea_id)?;
    let completed = idea
        .toggle_task(args.task_id)
        .ok_or_else(|| missing_task(args.idea_id, args.task_id))?;
    app.update_project(project).await?;
    let state = if completed { "done" } else { "open" };
    println!("Task ID: {} is now {}", args.task_id, state);
    Ok(())
}

async fn handle_task_rename(app: &App, args: TaskRename) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    let idea = idea_in(&mut project, args.idea_id)?;
    if !idea.rename_task(args.task_id, args.name)? {
        return Err(missing_task(args.idea_id, args.task_id));
    }
    app.update_project(project).await?;
    println!("Renamed task ID: {}", args.task_id);
    Ok(())
}

async fn handle_task_remove(app: &App, args: TaskRef) -> Result<(), AppError> {
    let mut project = app.get_project(args.project_id).await?;
    let idea = idea_in(&mut project, args.idea_id)?;
    if !idea.remove_task(args.task_id) {
        return Err(missing_task(args.idea_id, args.task_id));
    }
    app.update_project(project).await?;
    println!("Removed task ID: {}", args.task_id);
    Ok(())
}

fn idea_in(project: &mut Project, idea_id: i64) -> Result<&mut Idea, AppError> {
    let project_id = project.id;
    project
        .idea_mut(idea_id)
        .ok_or_else(|| AppError::NotFound(format!("idea id {idea_id} in project {project_id}")))
}

fn missing_idea(project: &Project, idea_id: i64) -> AppError {
    AppError::NotFound(format!("idea id {idea_id} in project {}", project.id))
}

fn missing_task(idea_id: i64, task_id: i64) -> AppError {
    AppError::NotFound(format!("task id {task_id} in idea {idea_id}"))
}
