// sql-chat: ask questions about a seeded SQLite store in plain language
//
// This is the main entry point for the sql-chat application.

use anyhow::{Context, Result};
use sql_chat::agent;
use sql_chat::cli::{obtain_credential, Repl};
use sql_chat::config::{Credential, Settings};
use sql_chat::database::bootstrap;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    println!("sql-chat v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let settings = Settings::load().context("Failed to load settings")?;
    let credential = obtain_credential(Credential::from_env())?;

    let store_path = settings.store_path.clone();
    let (report, database) = bootstrap(&store_path).await?;
    println!("{}", report.removal_message(&store_path));
    println!(
        "Seeded {} suppliers, {} products and {} inventory rows into {}",
        report.suppliers,
        report.products,
        report.inventory,
        store_path.display()
    );

    let agent = agent::build(database, &credential, &settings).await?;
    let schema_summary = agent.schema_summary().to_string();

    let mut repl = Repl::new(Box::new(agent), schema_summary)?;
    repl.run().await?;

    Ok(())
}
