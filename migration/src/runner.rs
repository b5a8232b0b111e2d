use colored::*;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 72;

/// Applies every registered migration in order, printing one status line
/// per step. Any failure aborts the process: a partially migrated schema
/// must never serve requests.
pub async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");

    let migrations = <migration::Migrator as MigratorTrait>::migrations();
    println!("Running {} migrations...", migrations.len());

    let schema_manager = SchemaManager::new(&db);
    for migration in migrations {
        apply(&schema_manager, migration.as_ref()).await;
    }
}

async fn apply(schema_manager: &SchemaManager<'_>, migration: &dyn MigrationTrait) {
    let label = format!("Applying {}", migration.name().bold());
    print!(
        "{label}{} ",
        ".".repeat(STATUS_COLUMN.saturating_sub(label.len()))
    );
    io::stdout().flush().ok();

    let start = Instant::now();
    match migration.up(schema_manager).await {
        Ok(()) => {
            println!(
                "{} {}",
                "done".green(),
                format!("({:.2?})", start.elapsed()).dimmed()
            );
        }
        Err(e) => {
            println!("{}", "failed".red());
            eprintln!("{}: {e}", migration.name());
            std::process::exit(1);
        }
    }
}
