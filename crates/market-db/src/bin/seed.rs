//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./market_dev.db with the full catalog
//! cargo run -p market-db --bin seed
//!
//! # Limit the number of items
//! cargo run -p market-db --bin seed -- --count 10
//!
//! # Specify database path
//! cargo run -p market-db --bin seed -- --db ./data/market.db
//! ```
//!
//! Every seeded item starts unowned, so it shows up in the market right away.
//! Accounts are not seeded; register through the server, and bootstrap the
//! administrator with `ADMIN_PASSWORD`.

use std::env;

use market_db::repository::items;
use market_db::{Database, DbConfig, NewItem};

/// (name, base price, description)
const CATALOG: &[(&str, i64, &str)] = &[
    ("Desk Lamp", 40, "Adjustable LED desk lamp"),
    ("Office Chair", 120, "Ergonomic chair with lumbar support"),
    ("Notebook", 5, "A5 dotted notebook, 120 pages"),
    ("Headphones", 85, "Over-ear wireless headphones"),
    ("Keyboard", 70, "Mechanical keyboard, brown switches"),
    ("Mouse", 25, "Wireless optical mouse"),
    ("Monitor", 210, "27 inch IPS monitor"),
    ("Backpack", 55, "Water-resistant laptop backpack"),
    ("Water Bottle", 15, "Insulated steel bottle, 750 ml"),
    ("Phone Stand", 12, "Aluminium phone stand"),
    ("USB Hub", 30, "7-port powered USB hub"),
    ("Webcam", 65, "1080p webcam with microphone"),
];

/// Colour variants; each multiplies the catalog.
const VARIANTS: &[(&str, i64)] = &[("Black", 0), ("White", 5), ("Red", 10)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = CATALOG.len() * VARIANTS.len();
    let mut db_path = String::from("./market_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Market Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./market_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bazaar Market Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let mut conn = db.acquire().await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = items::count(&mut conn).await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicate barcodes.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating items...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (catalog_idx, (name, price, description)) in CATALOG.iter().enumerate() {
        for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let item = generate_item(
                name,
                *price,
                description,
                variant,
                *price_addon,
                catalog_idx * 10 + variant_idx,
            );

            if let Err(e) = items::insert(&mut conn, &item).await {
                eprintln!("Failed to insert {}: {}", item.barcode, e);
                continue;
            }

            generated += 1;
        }
    }

    println!();
    println!("✓ Generated {} items in {:?}", generated, start.elapsed());

    let available = items::list_available(&mut conn).await?;
    println!("  Available in market: {}", available.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one catalog item with a unique alphanumeric barcode.
fn generate_item(
    name: &str,
    price: i64,
    description: &str,
    variant: &str,
    price_addon: i64,
    seed: usize,
) -> NewItem {
    // Barcode: up to 12 alphanumerics, e.g. "DES000000001"
    let prefix: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let barcode = format!("{}{:09}", prefix, seed);

    NewItem {
        name: format!("{} {}", name, variant),
        price: price + price_addon,
        barcode,
        description: description.to_string(),
    }
}
