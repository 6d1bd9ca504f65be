use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rks")]
#[command(about = "RocketShoes cart client", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> env -> local ...)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cart commands
    Cart {
        #[command(subcommand)]
        cmd: CartCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CartCmd {
    /// Print cart entries, subtotals and total.
    Show,

    /// Add one unit of a product (checks stock first).
    Add {
        /// Product id
        product_id: u64,
    },

    /// Remove a product from the cart.
    Remove {
        /// Product id
        product_id: u64,
    },

    /// Set the quantity of a product already in the cart (checks stock first).
    SetAmount {
        /// Product id
        product_id: u64,

        /// New quantity (must be >= 1)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config::config_hash(&paths),
        Commands::Cart { cmd } => {
            let store = commands::open_store(&cli.config_paths)?;
            match cmd {
                CartCmd::Show => commands::cart::show(&store).await,
                CartCmd::Add { product_id } => commands::cart::add(&store, product_id).await,
                CartCmd::Remove { product_id } => commands::cart::remove(&store, product_id).await,
                CartCmd::SetAmount { product_id, amount } => {
                    commands::cart::set_amount(&store, product_id, amount).await
                }
            }
        }
    }
}

fn init_tracing() {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
