use chrono::{DateTime, TimeZone, Utc};

use crate::model::{Idea, Project, ProjectStatus, Task};

pub const SEED_DOMAINS: [&str; 4] = ["Art", "Code", "Music", "Content Creation"];

pub fn seed_domains() -> Vec<String> {
    SEED_DOMAINS.iter().map(|name| name.to_string()).collect()
}

/// The collection written on first access when no projects are stored yet.
pub fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            name: "Amazfit Watchfaces".to_string(),
            description: String::new(),
            domain: "Code".to_string(),
            status: ProjectStatus::Active,
            ideas: vec![Idea {
                id: 101,
                name: "Ben 10 Omnitrix".to_string(),
                tasks: vec![
                    task(1001, "Design the watch face UI in Figma", true),
                    task(1002, "Code the basic time-telling functionality", false),
                    task(1003, "Research legality of selling a copyrighted design", false),
                ],
            }],
            last_touched_at: timestamp(2023, 10, 15, 10, 0),
        },
        Project {
            id: 2,
            name: "Social Media Content".to_string(),
            description: String::new(),
            domain: "Art".to_string(),
            status: ProjectStatus::Active,
            ideas: vec![Idea {
                id: 102,
                name: "TikTok account for drawing with left hand".to_string(),
                tasks: vec![
                    task(1004, "Brainstorm 10 initial video ideas", false),
                    task(1005, "Film and edit the first video", false),
                ],
            }],
            last_touched_at: timestamp(2023, 11, 1, 12, 30),
        },
        Project {
            id: 3,
            name: "Tierlistify App".to_string(),
            description: String::new(),
            domain: "Code".to_string(),
            status: ProjectStatus::Active,
            ideas: vec![Idea {
                id: 103,
                name: "Launch V1".to_string(),
                tasks: vec![
                    task(1006, "Finalize the README", true),
                    task(1007, "Deploy to production server", false),
                    task(1008, "Post about it on r/webdev and Indie Hackers", false),
                ],
            }],
            last_touched_at: timestamp(2023, 11, 5, 18, 0),
        },
    ]
}

fn task(id: i64, name: &str, is_completed: bool) -> Task {
    Task {
        id,
        name: name.to_string(),
        is_completed,
    }
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}
