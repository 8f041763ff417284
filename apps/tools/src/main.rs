use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use shared::domain::{DocumentId, Role, UserId};
use storage::Storage;
use uuid::Uuid;

const DEMO_TITLES: [&str; 10] = [
    "Quarterly report",
    "budget draft",
    "Onboarding guide",
    "meeting minutes",
    "Roadmap",
    "zephyr notes",
    "Alpha proposal",
    "charter",
    "Retrospective",
    "incident review",
];

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/documents.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateUser {
        username: String,
    },
    CreateDocument {
        owner_user_id: i64,
        title: String,
    },
    Grant {
        document_id: Uuid,
        user_id: i64,
        role: String,
    },
    /// Fills the listing of `user_id` with documents spread over time and roles.
    SeedDemo {
        user_id: i64,
        #[arg(long, default_value_t = 45)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateUser { username } => {
            let user_id = storage.create_user(&username).await?;
            println!("created user_id={}", user_id.0);
        }
        Command::CreateDocument {
            owner_user_id,
            title,
        } => {
            let document_id = storage
                .create_document(UserId(owner_user_id), &title)
                .await?;
            println!("created document_id={document_id}");
        }
        Command::Grant {
            document_id,
            user_id,
            role,
        } => {
            let role: Role = role.parse()?;
            storage
                .grant_access(DocumentId(document_id), UserId(user_id), role)
                .await?;
            println!("granted {role} on {document_id} to user_id={user_id}");
        }
        Command::SeedDemo { user_id, count } => {
            let viewer = UserId(user_id);
            if !storage.user_exists(viewer).await? {
                anyhow::bail!("user_id={user_id} does not exist");
            }
            let collaborator = storage.create_user("demo-collaborator").await?;
            let start = Utc::now() - Duration::days(count as i64);
            for index in 0..count {
                let created_at = start + Duration::days(index as i64);
                let updated_at = created_at + Duration::minutes(((index * 137) % 2000) as i64);
                let title = format!("{} {}", DEMO_TITLES[index % DEMO_TITLES.len()], index + 1);
                // Roles other than owner come from documents someone else created.
                let role = Role::ALL[index % Role::ALL.len()];
                let owner = if role == Role::Owner { viewer } else { collaborator };
                let document_id = storage
                    .insert_document(owner, &title, created_at, updated_at)
                    .await
                    .with_context(|| format!("failed to seed '{title}'"))?;
                if owner != viewer {
                    storage.grant_access(document_id, viewer, role).await?;
                }
            }
            println!("seeded {count} documents for user_id={user_id}");
        }
    }

    Ok(())
}
