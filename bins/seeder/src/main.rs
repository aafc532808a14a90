//! Database seeder for Atelier development and testing.
//!
//! Seeds operational users, projects, and products, then performs one
//! full warehouse run so the star schema has data immediately.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use atelier_db::entities::{products, projects, users};
use atelier_etl::WarehouseEtl;
use atelier_shared::config::EtlConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = atelier_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding projects...");
    seed_projects(&db).await;

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Running initial warehouse load...");
    let etl = WarehouseEtl::new(db, EtlConfig::default());
    let report = etl.run_daily().await;
    println!(
        "  Warehouse run {:?}: {} calendar rows, {} dimension versions, {} fact rows",
        report.status, report.date_dim_rows, report.dimensions.processed, report.facts.processed
    );

    println!("Seeding complete!");
}

/// Seeds the design-platform users.
async fn seed_users(db: &DatabaseConnection) {
    let seeds = [
        (1, "sarah_chen", "sarah.chen@atelier.dev", "designer"),
        (2, "miguel_torres", "miguel.torres@atelier.dev", "architect"),
        (3, "amara_okafor", "amara.okafor@atelier.dev", "manager"),
    ];

    for (id, username, email, role) in seeds {
        if users::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
            println!("  User {username} already exists, skipping...");
            continue;
        }

        let user = users::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            role: Set(role.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {username}: {e}");
        } else {
            println!("  Created user: {username}");
        }
    }
}

/// Seeds projects across the project types the analytics queries group by.
async fn seed_projects(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let seeds = [
        (1, 1, "Modern House Design", "In Progress", "Residential", dec!(85000.00), 12, 8),
        (2, 2, "Downtown Office Tower", "Planning", "Commercial", dec!(450000.00), 3, 27),
        (3, 1, "Lakeside Cabin Retrofit", "In Progress", "Residential", dec!(42000.00), 9, 3),
        (4, 3, "Retail Flagship Fit-out", "Completed", "Commercial", dec!(120000.00), 30, 0),
    ];

    for (id, user_id, name, status, project_type, budget, done, pending) in seeds {
        if projects::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
            println!("  Project {name} already exists, skipping...");
            continue;
        }

        let project = projects::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            name: Set(name.to_string()),
            status: Set(status.to_string()),
            project_type: Set(project_type.to_string()),
            budget: Set(budget),
            tasks_completed: Set(done),
            tasks_pending: Set(pending),
            start_date: Set(Some(today - Duration::days(90))),
            end_date: Set(end_date_for(status, today)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = project.insert(db).await {
            eprintln!("Failed to insert project {name}: {e}");
        } else {
            println!("  Created project: {name}");
        }
    }
}

fn end_date_for(status: &str, today: NaiveDate) -> Option<NaiveDate> {
    if status == "Completed" {
        Some(today - Duration::days(7))
    } else {
        None
    }
}

/// Seeds products linked to the seeded projects.
async fn seed_products(db: &DatabaseConnection) {
    let seeds = [
        (1, 1, "Solar Panels", "Renewable Energy", "SolarTech", dec!(750.00), 24),
        (2, 1, "Smart Lighting System", "Electrical", "Lumina", dec!(320.50), 40),
        (3, 2, "Structural Steel Beams", "Structural", "IronWorks", dec!(1250.00), 180),
        (4, 2, "Curtain Wall Glazing", "Facade", "ClearSpan", dec!(890.75), 96),
        (5, 3, "Heat Pump", "HVAC", "NordicAir", dec!(2400.00), 2),
        (6, 4, "Ash Flooring", "Finishes", "TimberCo", dec!(45.20), 300),
    ];

    for (id, project_id, name, category, vendor, price, quantity) in seeds {
        if products::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
            println!("  Product {name} already exists, skipping...");
            continue;
        }

        let product = products::ActiveModel {
            id: Set(id),
            project_id: Set(project_id),
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            vendor: Set(vendor.to_string()),
            price: Set(price),
            quantity: Set(quantity),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = product.insert(db).await {
            eprintln!("Failed to insert product {name}: {e}");
        } else {
            println!("  Created product: {name}");
        }
    }
}
