//! End-of-shift closing walkthrough

use cash_reconciliation::{
    format_currency, CashCount, ClosingBuilder, ClosingManager, ClosingStorage,
    JustificationEntry, MemoryStorage, ReconConfig, ValidationStatus,
};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🧾 Cash Reconciliation - Closing Walkthrough\n");

    let config = ReconConfig::load()?;
    let options = &config.format;
    let mut manager = ClosingManager::from_config(MemoryStorage::new(), &config);
    let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();

    // 1. Count the register
    println!("💵 Counting the register...");
    let mut count = CashCount::from_settings(&config.cash);
    count.set_quantity_input(20000, "2")?;
    count.set_quantity_input(10000, "1")?;
    count.set_quantity_input(2000, "2")?;
    count.set_quantity_input(500, "1")?;
    count.add_deposit("BRK-0042".to_string(), "5.000,00");

    println!("  Bills:      {}", format_currency(count.bills_total(), options));
    println!("  Float:      {}", format_currency(&count.float_amount, options));
    println!("  Deposits:   {}", format_currency(count.deposits_total(), options));
    println!("  Collected:  {}\n", format_currency(count.counted_cash(), options));

    // 2. Build the closing from what the cashier typed
    let mut closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), date)
        .cash("50.000,00", count)
        .payment("Visa".to_string(), "$ 12.345,67", "$ 12.345,67")
        .payment("Transfer".to_string(), "3.000,00", "3.000,00")
        .responsible("Marta".to_string())
        .build()?;

    println!("📊 Payment methods:");
    for entry in &closing.payment_methods {
        println!(
            "  {:<10} billed {:>14}  collected {:>14}  difference {:>12}",
            entry.method,
            format_currency(&entry.billed, options),
            format_currency(&entry.collected, options),
            format_currency(&entry.difference_value, options)
        );
    }
    println!(
        "  Total difference: {} ({})\n",
        format_currency(&closing.grand_difference_total, options),
        closing.severity()
    );

    // 3. Submission is blocked until the discrepancy is explained
    if let Err(err) = manager.submit_closing(closing.clone()).await {
        println!("⚠️  {}", err);
    }

    closing.add_justification(
        JustificationEntry::new(
            date,
            "ana".to_string(),
            "Missing voucher".to_string(),
            "-500,00",
        )
        .with_payment_method("Cash".to_string()),
    );
    println!(
        "  Balance after justification: {}\n",
        format_currency(closing.balance_outstanding(), options)
    );

    let submitted = manager.submit_closing(closing).await?;
    println!("✅ Submitted closing {}", submitted.id);

    // 4. Review
    let validated = manager.validate_closing(&submitted.id, "marta").await?;
    println!(
        "✅ Status: {} by {}",
        validated.validated,
        validated.validated_by.as_deref().unwrap_or("-")
    );

    let flagged = manager.flag_for_review(&submitted.id, "marta").await?;
    assert_eq!(flagged.validated, ValidationStatus::FlaggedForReview);
    println!("🔁 Status: {}\n", flagged.validated);

    // 5. Reporting
    let stats = manager.statistics(None, None).await?;
    println!(
        "📈 Closings: {} total, {} correct, {} minor, {} severe",
        stats.total, stats.correct, stats.minor_differences, stats.severe_differences
    );

    let stores = vec!["Centro".to_string(), "Norte".to_string()];
    for summary in manager.monthly_summary(&stores, 2024, 5).await? {
        println!(
            "  {:<8} {} closings, {} with differences, net {}",
            summary.store,
            summary.total_closings,
            summary.closings_with_differences,
            format_currency(&summary.difference_total, options)
        );
    }

    let stored = manager.storage().list_closings(None, None).await?;
    println!("\n{}", serde_json::to_string_pretty(&stored)?);

    Ok(())
}
