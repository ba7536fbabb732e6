use clap::{Args, Parser, Subcommand};
use riskcore::config::AppConfig;
use riskcore::error::AppError;
use riskcore::telemetry;
use riskcore::underwriting::{
    Address, AssessorId, CustomerId, DrivingHistory, InMemoryAssessmentRepository,
    InMemoryEventPublisher, InMemoryProfileRepository, NewProfile, PolicyType, QuoteOutcome,
    UnderwritingError, UnderwritingService,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "riskcore",
    about = "Score customer risk and price insurance premiums from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full underwriting pipeline for one applicant (default command)
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
struct QuoteArgs {
    /// Customer identifier for the profile
    #[arg(long)]
    customer: Option<String>,
    /// Policy line to quote: auto, home, life, health, or business
    #[arg(long, value_parser = parse_policy_type)]
    policy: Option<PolicyType>,
    /// Applicant age in years
    #[arg(long)]
    age: Option<u8>,
    /// Applicant occupation
    #[arg(long)]
    occupation: Option<String>,
    /// Annual income in dollars
    #[arg(long, value_parser = parse_decimal)]
    income: Option<Decimal>,
    /// At-fault accidents on record
    #[arg(long)]
    accidents: Option<u32>,
    /// Moving violations on record
    #[arg(long)]
    violations: Option<u32>,
    /// Years of driving experience
    #[arg(long)]
    experience: Option<u32>,
    /// Street line of the applicant address
    #[arg(long)]
    street: Option<String>,
    /// City of the applicant address
    #[arg(long)]
    city: Option<String>,
    /// State code of the applicant address
    #[arg(long)]
    state: Option<String>,
    /// Zip code (NNNNN or NNNNN-NNNN)
    #[arg(long)]
    zip: Option<String>,
    /// Country of the applicant address
    #[arg(long)]
    country: Option<String>,
    /// Identifier recorded as the assessing underwriter
    #[arg(long)]
    assessor: Option<String>,
    /// Free-form notes attached to the assessment
    #[arg(long)]
    notes: Option<String>,
    /// Emit the quote as pretty-printed JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Quote(QuoteArgs::default()));

    match command {
        Command::Quote(args) => run_quote(args),
    }
}

fn parse_policy_type(raw: &str) -> Result<PolicyType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(PolicyType::Auto),
        "home" => Ok(PolicyType::Home),
        "life" => Ok(PolicyType::Life),
        "health" => Ok(PolicyType::Health),
        "business" => Ok(PolicyType::Business),
        _ => Err(format!(
            "'{raw}' is not a policy line (expected auto, home, life, health, or business)"
        )),
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))
}

fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let QuoteArgs {
        customer,
        policy,
        age,
        occupation,
        income,
        accidents,
        violations,
        experience,
        street,
        city,
        state,
        zip,
        country,
        assessor,
        notes,
        json,
    } = args;

    let customer_id = CustomerId(customer.unwrap_or_else(|| "CUST-1001".to_string()));
    let policy_type = policy.unwrap_or(PolicyType::Auto);
    let address = Address::new(
        street.unwrap_or_else(|| "742 Prairie Lane".to_string()),
        city.unwrap_or_else(|| "Fargo".to_string()),
        state.unwrap_or_else(|| "ND".to_string()),
        zip.unwrap_or_else(|| "58102".to_string()),
        country.unwrap_or_else(|| "USA".to_string()),
    )
    .map_err(UnderwritingError::from)?;
    let driving_history = DrivingHistory::new(
        accidents.unwrap_or(0),
        violations.unwrap_or(0),
        Some(experience.unwrap_or(10)),
        None,
    );

    info!(
        ?config.environment,
        policy = policy_type.label(),
        "underwriting engine ready"
    );

    let profiles = Arc::new(InMemoryProfileRepository::default());
    let assessments = Arc::new(InMemoryAssessmentRepository::default());
    let publisher = Arc::new(InMemoryEventPublisher::default());
    let service = UnderwritingService::new(profiles, assessments, publisher.clone());

    let profile = service.create_profile(NewProfile {
        customer_id,
        policy_type,
        driving_history,
        address,
        age: Some(age.unwrap_or(30)),
        occupation: Some(occupation.unwrap_or_else(|| "Software Engineer".to_string())),
        annual_income: Some(income.unwrap_or_else(|| dec!(75000))),
    })?;
    let profile = service.rescore_profile(&profile.id())?;
    let quote = service.quote(
        &profile.id(),
        AssessorId(assessor.unwrap_or_else(|| "cli-demo".to_string())),
        notes,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    println!("Underwriting quote demo");
    println!(
        "Customer {} | {} policy | profile {}",
        profile.customer_id(),
        profile.policy_type().label(),
        profile.id()
    );

    println!(
        "\nRisk score: {} ({} risk)",
        profile.current_score(),
        profile.current_score().category().label()
    );
    if profile.risk_factors().is_empty() {
        println!("Risk factors: none identified");
    } else {
        println!("Risk factors:");
        for factor in profile.risk_factors() {
            println!(
                "- [{}] {} (impact {})",
                factor.kind().label(),
                factor.description(),
                factor.impact()
            );
        }
    }

    render_quote(&quote);

    let events = publisher.events();
    if events.is_empty() {
        println!("\nPublished events: none");
    } else {
        println!("\nPublished events");
        for event in &events {
            println!("- {} at {}", event.event_type(), event.occurred_at());
        }
    }

    Ok(())
}

fn render_quote(quote: &QuoteOutcome) {
    println!(
        "\nAssessment {} -> status {}",
        quote.assessment_id, quote.status
    );
    println!("Base premium: {} / month", quote.base_premium);
    match quote.risk_multiplier {
        Some(multiplier) => println!("Risk multiplier: {multiplier}"),
        None => println!("Risk multiplier: not applied"),
    }
    match quote.final_premium {
        Some(premium) => println!("Final premium: {} / month", premium),
        None => println!("Final premium: not priced"),
    }

    if quote.insurable {
        println!("Available discount: {}%", quote.discount_percentage);
        if let Some(annual) = quote.annual_premium {
            println!("Annual prepay option: {annual} (includes 2% prepay discount)");
        }
    } else {
        println!("Profile is not insurable for this line");
    }

    if let Some(notes) = &quote.notes {
        println!("Notes: {notes}");
    }
}
