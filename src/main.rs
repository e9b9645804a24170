//! Demo entry point for the real-estate pricing engine
//!
//! This driver stands in for the presentation layer: it trains (or reloads)
//! the model, runs a sample prediction and generates both report kinds.

use anyhow::Result;
use rust_estate::app::{ApplicationController, EngineConfig};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("\n{}", "=".repeat(60));
    println!("  Real Estate Price Prediction Engine");
    println!("{}\n", "=".repeat(60));

    let config = EngineConfig::default();
    let controller = ApplicationController::new(config);

    // 1. Train from ./data.csv, or reload an existing artifact
    println!("🤖 Starting engine...");
    match controller.start_or_reload().await? {
        Some(report) => {
            println!(
                "   Trained on {} rows ({} held out)",
                report.train_rows, report.test_rows
            );
            if let Some(metrics) = report.holdout {
                println!("   Hold-out MAE:  {:.2} €", metrics.mae);
                println!("   Hold-out RMSE: {:.2} €", metrics.rmse);
                println!("   Hold-out R²:   {:.4}", metrics.r2);
            }
        }
        None => println!("   Reloaded existing model artifact"),
    }

    // 2. Single prediction
    let area = 100.0;
    let district = "Lisboa";
    let type_label = "t2";

    println!("\n📊 Sample prediction");
    let price = controller.predict_price(area, district, type_label).await?;
    println!(
        "   {} m² {} in {} → {:.2} €",
        area, type_label, district, price
    );

    // 3. Reports
    println!("\n📄 Generating reports...");
    let price_report = controller.generate_price_report(area, type_label).await?;
    println!("   Price report:  {}", price_report.display());

    let budget_report = controller.generate_budget_report(250_000.0, type_label).await?;
    println!("   Budget report: {}", budget_report.display());

    Ok(())
}
