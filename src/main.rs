use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use okr_tracker::config::Config;
use okr_tracker::models::Auditable;
use okr_tracker::service::HierarchyService;
use okr_tracker::{api, db, tree_render};

#[derive(Parser)]
#[command(name = "okr")]
#[command(about = "Projects, goals and key results with rolled-up progress")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (defaults to OKR_TRACKER_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Recompute progress for every node of a project
    Recalculate {
        /// Project UUID
        project_id: Uuid,
    },
    /// Print a project tree with progress
    Tree {
        /// Project UUID
        project_id: Uuid,
    },
    /// List soft-deleted nodes
    Archive,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "okr_tracker=debug,tower_http=debug".into()),
    );

    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<db::Database> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting OKR tracker on port {}", port);

    let service = HierarchyService::new(open_database(&config)?);
    let app = api::create_router(service, config.fallback_actor);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("OKR tracker listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            serve(config, port).await?;
        }
        Some(Commands::Recalculate { project_id }) => {
            let service = HierarchyService::new(open_database(&config)?);
            let project = service.recalculate_project(project_id)?;
            println!("{}: {}%", project.title, project.progress);
        }
        Some(Commands::Tree { project_id }) => {
            let service = HierarchyService::new(open_database(&config)?);
            let tree = service.project_tree(project_id)?;
            print!("{}", tree_render::render_tree(&tree));
        }
        Some(Commands::Archive) => {
            let service = HierarchyService::new(open_database(&config)?);
            let archived = service.list_archived()?;
            if archived.is_empty() {
                println!("No archived nodes.");
            }
            for node in archived {
                let closed_by = node.audit().closed_by.as_deref().unwrap_or("-");
                println!(
                    "{:<20} {} {} (closed by {})",
                    node.kind(),
                    node.id(),
                    node.title(),
                    closed_by
                );
            }
        }
        None => {
            let port = config.port;
            serve(config, port).await?;
        }
    }

    Ok(())
}
