// Book Inventory - Inventory of Books for Mobile
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use inventory_core::contract::{self, Supplier};
use inventory_core::provider::BookProvider;
use inventory_core::storage::{Book, Database, DatabaseStats, NewBook};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "inventory-cli")]
#[command(about = "Book inventory CLI - Desktop testing tool", long_about = None)]
struct Cli {
    /// Path to the SQLite database (defaults to the platform data directory)
    #[arg(short, long, env = "INVENTORY_DB", global = true)]
    database: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the table, columns, suppliers and content URIs
    Schema,
    /// Check whether a supplier code is valid
    ValidateSupplier {
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },
    /// Add a book
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        price: i64,
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        quantity: i64,
        /// Supplier code (0 = Pearson, 1 = AK, 2 = Howarth Press)
        #[arg(short, long, allow_negative_numbers = true)]
        supplier: i32,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List books
    List {
        /// Only books whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single book
    Show { id: i64 },
    /// Sell one copy of a book
    Sell { id: i64 },
    /// Delete a book, or every book with --all
    Delete {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<i64>,
        #[arg(long)]
        all: bool,
    },
    /// Show database statistics; with --run, check integrity, checkpoint and vacuum
    Maintenance {
        #[arg(long)]
        run: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_writer(std::io::stderr).with_target(false).with_env_filter(filter).init();
}

fn print_book(book: &Book) {
    let supplier = book
        .supplier()
        .map(|s| s.display_name())
        .unwrap_or("[Unknown]");
    println!(
        "#{:<4} {:<32} price {:>6}  qty {:>4}  {} {}",
        book.id,
        book.name,
        book.price,
        book.quantity,
        supplier,
        book.supplier_phone.as_deref().unwrap_or("")
    );
}

fn print_stats(label: &str, stats: &DatabaseStats) {
    println!(
        "{:<8} {} pages x {} bytes = {} bytes, {} free ({:.1}%)",
        label,
        stats.page_count,
        stats.page_size,
        stats.total_size,
        stats.freelist_count,
        stats.unused_percentage()
    );
}

fn print_schema() {
    println!("Authority:      {}", contract::CONTENT_AUTHORITY);
    println!("Base URI:       {}", contract::base_content_uri());
    println!("Content URI:    {}", contract::content_uri());
    println!("List type:      {}", contract::CONTENT_LIST_TYPE);
    println!("Item type:      {}", contract::CONTENT_ITEM_TYPE);
    println!("Table:          {}", contract::TABLE_NAME);
    println!("Columns:        {}", contract::COLUMNS.join(", "));
    println!("Suppliers:");
    for supplier in Supplier::all() {
        println!("  {} = {}", supplier.code(), supplier.display_name());
    }
}

async fn open_provider(path: Option<PathBuf>) -> anyhow::Result<BookProvider> {
    let path = path.unwrap_or_else(Database::get_default_path);
    debug!(path = %path.display(), "Opening database");
    let db = Database::new(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    Ok(BookProvider::new(db))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Schema => print_schema(),
        Commands::ValidateSupplier { code } => {
            if contract::is_valid_supplier(code) {
                println!("{} is a valid supplier code", code);
            } else {
                bail!("{} is not a valid supplier code", code);
            }
        }
        Commands::Add { name, price, quantity, supplier, phone } => {
            let provider = open_provider(cli.database).await?;
            let book = NewBook {
                name,
                price,
                quantity,
                supplier_name: supplier,
                supplier_phone: phone,
            };
            let uri = provider
                .insert(&contract::content_uri(), &book)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Added {}", uri);
        }
        Commands::List { search } => {
            let provider = open_provider(cli.database).await?;
            let books = match search {
                Some(query) => {
                    inventory_core::storage::queries::search_books_by_name(
                        provider.database().pool(),
                        &query,
                        -1,
                    )
                    .await?
                }
                None => provider.query(&contract::content_uri()).await?,
            };
            if books.is_empty() {
                println!("No books in inventory");
            }
            books.iter().for_each(print_book);
        }
        Commands::Show { id } => {
            let provider = open_provider(cli.database).await?;
            match provider.query(&contract::book_uri(id)).await?.first() {
                Some(book) => print_book(book),
                None => bail!("Book {} not found", id),
            }
        }
        Commands::Sell { id } => {
            let provider = open_provider(cli.database).await?;
            let remaining = provider.record_sale(&contract::book_uri(id)).await?;
            println!("Sold one copy of #{}, {} left", id, remaining);
        }
        Commands::Delete { id, all } => {
            let provider = open_provider(cli.database).await?;
            let uri = match (id, all) {
                (_, true) => contract::content_uri(),
                (Some(id), false) => contract::book_uri(id),
                (None, false) => bail!("Give a book id or --all"),
            };
            let rows = provider.delete(&uri).await?;
            println!("Deleted {} book(s)", rows);
        }
        Commands::Maintenance { run } => {
            let provider = open_provider(cli.database).await?;
            let db = provider.database();
            if run {
                let report = db.maintain().await?;
                print_stats("Before", &report.before);
                print_stats("After", &report.after);
                println!("Vacuumed: {}", if report.vacuumed { "yes" } else { "no" });
            } else {
                let stats = db.get_stats().await?;
                print_stats("Current", &stats);
                if stats.should_vacuum() {
                    println!("Vacuum recommended, rerun with --run");
                }
            }
        }
    }

    Ok(())
}
