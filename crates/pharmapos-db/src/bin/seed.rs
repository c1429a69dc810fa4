//! # Seed Data Loader
//!
//! Loads the demo pharmacy catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./pharmapos_dev.db
//! cargo run -p pharmapos-db --bin seed
//!
//! # Specify database path
//! cargo run -p pharmapos-db --bin seed -- --db ./data/pharmapos.db
//! ```
//!
//! ## Generated Data
//! Seven common over-the-counter products. Each gets two or three batches
//! received through the inventory ledger:
//! - cost price: 70% of the sale price
//! - quantity: 20 - 70 units
//! - expiry: spread across 2027
//! - barcode: `885NNNNN`

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use std::env;

use pharmapos_core::{NewProduct, StockReceipt};
use pharmapos_db::{Database, DbConfig};

/// (Myanmar name, English name, sale price in kyats)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("ဘိုင်အိုဂျစ်စစ်", "Biogesic", 10_000),
    ("တစ်ဖီး", "Tiffy Big", 5_500),
    ("အမီပရိုလော", "Ameprolol Xl 25", 30_000),
    ("အင်နာဗွန်စီ", "Enervon C", 9_500),
    ("ဆိုင်လို ၁၀၀၀", "Silo 1000", 1_000),
    ("ပါရာဆိတ် ၂၅၀", "Parasafe 250", 5_300),
    ("ဆော်မတ်", "Solmux", 1_000),
];

const DEFAULT_DB_PATH: &str = "./pharmapos_dev.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from(DEFAULT_DB_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PharmaPOS Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PharmaPOS Seed Data Loader");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Loading products...");

    let now = Utc::now();
    let mut batches = 0;

    for (index, (name_mm, name_en, sale_price)) in PRODUCTS.iter().enumerate() {
        let product = NewProduct {
            name_mm: name_mm.to_string(),
            name_en: Some(name_en.to_string()),
            barcode: Some(format!("885{:05}", index + 1)),
            sale_price: *sale_price,
            reorder_level: None,
        };

        let product_id = db
            .catalog()
            .create_product_at(&product, now)
            .await
            .with_context(|| format!("creating {name_en}"))?;

        for receipt in demo_batches(product_id, index, *sale_price) {
            db.inventory()
                .receive_stock_at(&receipt, now)
                .await
                .with_context(|| format!("receiving {} for {name_en}", receipt.batch_no))?;
            batches += 1;
        }

        println!("  {} ({})", name_en, name_mm);
    }

    println!();
    println!("✓ Loaded {} products, {} batches", PRODUCTS.len(), batches);

    let valuation = db.reports().compute_stock_valuation().await?;
    println!("  Stock value at cost: {}", valuation.total_value);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Two or three batches per product, deterministic per index.
fn demo_batches(product_id: i64, index: usize, sale_price: i64) -> Vec<StockReceipt> {
    let count = 2 + index % 2;
    let cost_price = sale_price * 7 / 10;
    let year = Utc::now().year() + 1;

    (0..count)
        .filter_map(|n| {
            let month = (1 + index as u32 * 2 + n as u32 * 4) % 12 + 1;
            let expiry_date = NaiveDate::from_ymd_opt(year, month, 28)?;

            Some(StockReceipt {
                product_id,
                batch_no: format!("B{:03}-{}", index + 1, n + 1),
                expiry_date,
                cost_price,
                qty: 20 + ((index * 17 + n * 11) % 51) as i64,
            })
        })
        .collect()
}
