use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::{ProjectSort, ProjectStatus};

#[derive(Parser, Debug)]
#[command(
    name = "universe",
    version,
    about = "Track projects, ideas and tasks grouped by domain"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Data directory (defaults to $UNIVERSE_HOME, then ~/.universe)"
    )]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Project(ProjectCommand),
    #[command(subcommand)]
    Idea(IdeaCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Domain(DomainCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    Add(ProjectAdd),
    List(ProjectList),
    Show(ProjectShow),
    Update(ProjectUpdate),
    Remove(ProjectRemove),
    #[command(about = "Show the most recently touched project")]
    Resume,
    #[command(about = "List dormant projects, oldest first")]
    Forgotten,
    #[command(about = "Pick a random project")]
    Pick(ProjectPick),
}

#[derive(Subcommand, Debug)]
pub enum IdeaCommand {
    Add(IdeaAdd),
    Rename(IdeaRename),
    Remove(IdeaRef),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    Add(TaskAdd),
    Toggle(TaskRef),
    Rename(TaskRename),
    Remove(TaskRef),
}

#[derive(Subcommand, Debug)]
pub enum DomainCommand {
    List,
    Add(DomainName),
    Remove(DomainName),
}

#[derive(Args, Debug)]
pub struct ProjectAdd {
    pub name: String,
    #[arg(long)]
    pub domain: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, help = "Register the domain before creating the project")]
    pub new_domain: bool,
}

#[derive(Args, Debug)]
pub struct ProjectList {
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<ProjectStatusArg>,
    #[arg(long, value_enum, default_value = "touched")]
    pub sort: ProjectSortArg,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProjectShow {
    pub id: i64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProjectUpdate {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<ProjectStatusArg>,
}

#[derive(Args, Debug)]
pub struct ProjectRemove {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct ProjectPick {
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdeaAdd {
    pub project_id: i64,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct IdeaRename {
    pub project_id: i64,
    pub idea_id: i64,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct IdeaRef {
    pub project_id: i64,
    pub idea_id: i64,
}

#[derive(Args, Debug)]
pub struct TaskAdd {
    pub project_id: i64,
    pub idea_id: i64,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct TaskRef {
    pub project_id: i64,
    pub idea_id: i64,
    pub task_id: i64,
}

#[derive(Args, Debug)]
pub struct TaskRename {
    pub project_id: i64,
    pub idea_id: i64,
    pub task_id: i64,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DomainName {
    pub name: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ProjectStatusArg {
    Active,
    OnHold,
}

impl From<ProjectStatusArg> for ProjectStatus {
    fn from(value: ProjectStatusArg) -> Self {
        match value {
            ProjectStatusArg::Active => Self::Active,
            ProjectStatusArg::OnHold => Self::OnHold,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ProjectSortArg {
    Touched,
    Name,
    Ideas,
}

impl From<ProjectSortArg> for ProjectSort {
    fn from(value: ProjectSortArg) -> Self {
        match value {
            ProjectSortArg::Touched => Self::LastTouched,
            ProjectSortArg::Name => Self::Name,
            ProjectSortArg::Ideas => Self::Ideas,
        }
    }
}
