use dotenv::dotenv;
use financial_health_advisor::llm::{AdvisorAssistant, FinancialAnalyzer, GeminiClient};
use financial_health_advisor::{AdvisorConfig, Language, Session};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

const DEMO_FINANCIAL_TEXT: &str = r#"
Financial Summary for Q1-Q4 2024
Industry: Retail
Total Revenue: $1,200,000
COGS: $700,000
Operating Expenses: $350,000
Net Profit: $150,000
Current Assets: $200,000
Current Liabilities: $150,000
Long term debt: $100,000 at 8% interest.
Monthly Revenue trends: Jan: 90k, Feb: 85k, Mar: 95k, Apr: 100k, May: 98k, Jun: 105k, Jul: 110k, Aug: 108k, Sep: 115k, Oct: 120k, Nov: 125k, Dec: 130k.
Inventory turnover is slowing down. Supplier payments are delayed by 15 days on average.
"#;

fn load_text() -> Result<String, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(DEMO_FINANCIAL_TEXT.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = AdvisorConfig::from_env();
    let backend = Arc::new(GeminiClient::from_config(&config)?);

    let industry = std::env::var("ADVISOR_INDUSTRY").unwrap_or_else(|_| "Retail".to_string());
    let language: Language = std::env::var("ADVISOR_LANGUAGE")
        .ok()
        .map(|l| l.parse())
        .transpose()?
        .unwrap_or_default();

    println!("📊 Analyzing financial data ({}, {})...\n", industry, language);

    let analyzer = FinancialAnalyzer::new(backend.clone(), config.clone());
    let report = match analyzer.analyze(&load_text()?, &industry, language).await {
        Ok(report) => Some(report),
        Err(e) => {
            eprintln!("❌ Analysis failed: {}", e);
            eprintln!("Continuing without a report; the advisor will answer general questions.\n");
            None
        }
    };

    if let Some(report) = &report {
        println!("Health score: {}/100", report.health_score);
        println!("{}\n", report.summary);
        println!(
            "Gross margin {} | Net margin {} | Current ratio {} | Debt/Equity {}",
            report.metrics.gross_margin,
            report.metrics.net_profit_margin,
            report.metrics.current_ratio,
            report.metrics.debt_to_equity
        );
        for risk in &report.risks {
            println!("  ⚠️  [{}] {}: {}", risk.severity, risk.title, risk.description);
        }
        for rec in &report.recommendations {
            println!("  ✅ [{}] {}: {}", rec.category, rec.title, rec.action);
        }
        for point in &report.forecast_data {
            println!(
                "  📈 {}: revenue {:.0}, expenses {:.0}, profit {:.0}",
                point.period, point.revenue, point.expenses, point.profit
            );
        }
        println!();
    }

    let assistant = AdvisorAssistant::new(backend, config);
    let mut session = Session::new();

    println!("🤖 Ready! Ask the advisor about your finances (type 'quit' to exit).");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        if prompt.is_empty() {
            continue;
        }

        println!("\nThinking...");

        let turn = assistant
            .converse(&mut session, prompt, report.as_ref())
            .await;
        if turn.is_fallback() {
            eprintln!("\n⚠️  {}\n", turn.text);
        } else {
            println!("\n{}\n", turn.text);
        }
        println!("------------------------------------------------------------------");
    }

    Ok(())
}
