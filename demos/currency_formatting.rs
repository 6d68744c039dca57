//! Amount parsing and currency formatting examples

use cash_reconciliation::{
    format_currency, parse_locale_number, parse_sum_expression, FormatOptions, NumberLocale,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Cash Reconciliation - Amount Formatting Examples\n");

    // 1. Parsing what cashiers type
    println!("⌨️  Parsing typed amounts:");
    for input in ["$ 1.234,56", "1234,56", "1234.56", "-987,10", "12.5.3", "abc", ""] {
        println!("  {:<14} -> {}", format!("{:?}", input), parse_locale_number(input));
    }
    println!();

    // 2. Adding up a calculator expression
    println!("➕ Sum expressions:");
    for expr in ["1.000,50 + 250 + 49,50", "100 + 2a"] {
        println!("  {:<24} = {}", expr, parse_sum_expression(expr));
    }
    println!();

    // 3. Formatting
    println!("💱 Formatting:");
    let ars = FormatOptions::default();
    let detailed = FormatOptions::default().with_fraction_digits(2, 4);
    let clp = FormatOptions::for_currency("CLP")
        .with_locale(NumberLocale::EsCl)
        .with_fraction_digits(0, 0);

    for value in ["1234567,891", "-500", "0,005"] {
        println!(
            "  {:<12} ARS {:<18} detail {:<20} CLP {}",
            value,
            format_currency(value, &ars),
            format_currency(value, &detailed),
            format_currency(value, &clp)
        );
    }

    let locale: NumberLocale = "es-AR".parse()?;
    println!("\n  Default locale: {}", locale);

    Ok(())
}
