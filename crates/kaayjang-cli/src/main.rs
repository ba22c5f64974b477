use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use kaayjang_cli::seeder;
use kaayjang_config::DatabaseConfig;
use kaayjang_db::{PgPool, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "kaayjang-cli")]
#[command(about = "Kaayjang CLI - Database tools for the Kaayjang API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Seed the reference levels, tracks, classes and sample students
    Seed,
    /// Seed fake students spread over the existing classes
    SeedStudents {
        /// Number of students to create
        #[arg(short = 'c', long, default_value = "100")]
        count: usize,
    },
    /// Delete every student, class, track and level
    Clear,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::Seed => handle_seed(&pool).await,
        Commands::SeedStudents { count } => handle_seed_students(&pool, count).await,
        Commands::Clear => handle_clear(&pool).await,
    }

    pool.close().await;
}

async fn handle_migrate(pool: &PgPool) {
    match run_migrations(pool).await {
        Ok(_) => println!("✅ Migrations applied"),
        Err(e) => {
            eprintln!("\n❌ Error running migrations: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(pool: &PgPool) {
    if let Err(e) = seeder::seed_reference_data(pool).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_seed_students(pool: &PgPool, count: usize) {
    match seeder::seed_students(pool, count).await {
        Ok(inserted) => println!("✅ Created {} students", inserted),
        Err(e) => {
            eprintln!("\n❌ Error seeding students: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_clear(pool: &PgPool) {
    if let Err(e) = seeder::clear_all(pool).await {
        eprintln!("\n❌ Error clearing data: {}", e);
        std::process::exit(1);
    }
}
