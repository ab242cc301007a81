// farmgenie - farming advice from the terminal
//
// This is the main entry point. Parses CLI args and dispatches to handlers.

use chrono::Datelike;
use farmgenie_lib::{
    core::{
        ChatAssistant, ChatOptions, CropReference, DiseaseAdvisor, FertilizerAdvisor, PlantLabel,
        ReplyStatus,
    },
    db::{Prediction, PredictionKind},
    intelligence::{
        CostTier, DiseaseTable, KeywordIntentMatcher, KnowledgeBase, NutrientRuleResolver,
        RuleTable, SoilReading,
    },
    llm::{ChatMessage, CohereClient},
    AdvisorError, Database, Result, Settings,
};
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Logs go to stderr so answers on stdout stay clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "farmgenie=warn,farmgenie_lib=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    if let Err(e) = run(&args).await {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let command = &args[1];
    tracing::info!(command = %command, version = env!("CARGO_PKG_VERSION"), "farmgenie starting");

    match command.as_str() {
        "chat" => handle_chat(&args[2..]).await,
        "classify" => handle_classify(&args[2..]),
        "fertilizer" => handle_fertilizer(&args[2..]).await,
        "disease" => handle_disease(&args[2..]).await,
        "crops" => handle_crops(),
        "history" => handle_history(&args[2..]).await,
        "status" => handle_status().await,
        "version" | "-v" | "--version" => {
            println!("farmgenie v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            Ok(())
        }
    }
}

async fn handle_chat(args: &[String]) -> Result<()> {
    let offline = args.iter().any(|arg| arg == "--offline");
    let message = args
        .iter()
        .filter(|arg| arg.as_str() != "--offline")
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    if message.trim().is_empty() {
        return Err(AdvisorError::InvalidInput("no message provided".to_string()));
    }

    let settings = Settings::load()?;
    let db = Arc::new(Database::new(&settings.database_path).await?);
    let mut assistant = ChatAssistant::new(build_matcher()?).with_database(db);

    if !offline {
        if let Some(key) = settings.api_key() {
            let client = CohereClient::new(&settings.model, key)?;
            assistant = assistant.with_model(Arc::new(client), ChatOptions::from(&settings.model));
        }
    }

    let reply = assistant.reply(&[ChatMessage::user(message)]).await?;

    println!("\n{}\n", reply.response);
    if reply.status == ReplyStatus::ComprehensiveFallback && assistant.has_model() {
        eprintln!("(answered from the offline knowledge base)");
    }

    Ok(())
}

fn handle_classify(args: &[String]) -> Result<()> {
    if args.is_empty() {
        eprintln!("Error: No text provided");
        return Ok(());
    }

    let text = args.join(" ");
    let matcher = build_matcher()?;
    let result = matcher.classify(&text);

    match result.topic {
        Some(topic) if result.is_match() => println!("{} (score {})", topic, result.score),
        _ => println!("no topic matched"),
    }

    println!("stems: {}", matcher.stemmed_tokens(&text).join(" "));

    Ok(())
}

async fn handle_fertilizer(args: &[String]) -> Result<()> {
    let mut crop: Option<String> = None;
    let mut n: Option<i32> = None;
    let mut p: Option<i32> = None;
    let mut k: Option<i32> = None;
    let mut ph: Option<f64> = None;
    let mut moisture: Option<f64> = None;

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--crop" => crop = value.cloned(),
            "--n" => n = parse_flag("--n", value)?,
            "--p" => p = parse_flag("--p", value)?,
            "--k" => k = parse_flag("--k", value)?,
            "--ph" => ph = parse_flag("--ph", value)?,
            "--moisture" => moisture = parse_flag("--moisture", value)?,
            other => {
                return Err(AdvisorError::InvalidInput(format!("unexpected argument '{}'", other)));
            }
        }
        i += 2;
    }

    let crop = crop.ok_or_else(|| missing_flag("--crop"))?;
    let reading = SoilReading {
        n: n.ok_or_else(|| missing_flag("--n"))?,
        p: p.ok_or_else(|| missing_flag("--p"))?,
        k: k.ok_or_else(|| missing_flag("--k"))?,
        ph: ph.ok_or_else(|| missing_flag("--ph"))?,
        moisture: moisture.ok_or_else(|| missing_flag("--moisture"))?,
    };

    let settings = Settings::load()?;
    let db = Arc::new(Database::new(&settings.database_path).await?);
    let reference = Arc::new(CropReference::builtin()?);
    let resolver = NutrientRuleResolver::new(Arc::new(RuleTable::builtin()?));
    let advisor = FertilizerAdvisor::new(reference, resolver).with_database(db);

    let advice = advisor.advise(&crop, reading).await?;

    println!("\nFertilizer plan for {}", advice.crop);
    println!("{}", "=".repeat(60));
    println!(
        "Measured:    N {:>4}  P {:>4}  K {:>4}  pH {:.1}  moisture {:.0}%",
        reading.n, reading.p, reading.k, reading.ph, reading.moisture
    );
    println!(
        "Recommended: N {:>4}  P {:>4}  K {:>4}",
        advice.recommended.n, advice.recommended.p, advice.recommended.k
    );
    println!("{}", "=".repeat(60));
    println!("\n{}\n", advice.render());

    Ok(())
}

async fn handle_disease(args: &[String]) -> Result<()> {
    let mut label: Option<PlantLabel> = None;
    let mut crop: Option<String> = None;
    let mut condition: Option<String> = None;
    let mut confidence: Option<f64> = None;
    let mut month: Option<u32> = None;
    let mut tier = CostTier::default();

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--label" => {
                let raw = value.ok_or_else(|| missing_flag("--label"))?;
                label = Some(PlantLabel::parse(raw)?);
            }
            "--crop" => crop = value.cloned(),
            "--condition" => condition = value.cloned(),
            "--confidence" => confidence = parse_flag("--confidence", value)?,
            "--month" => month = parse_flag("--month", value)?,
            "--cost-tier" => {
                let raw = value.ok_or_else(|| missing_flag("--cost-tier"))?;
                tier = raw.parse()?;
            }
            other => {
                return Err(AdvisorError::InvalidInput(format!(
                    "unexpected argument '{}'",
                    other
                )));
            }
        }
        i += 2;
    }

    let (crop, condition) = match label {
        Some(label) => (label.crop, label.condition),
        None => (
            crop.ok_or_else(|| missing_flag("--crop"))?,
            condition.ok_or_else(|| missing_flag("--condition"))?,
        ),
    };
    let confidence = confidence.ok_or_else(|| missing_flag("--confidence"))?;
    let month = month.unwrap_or_else(|| chrono::Local::now().month());
    if !(1..=12).contains(&month) {
        return Err(AdvisorError::InvalidInput(format!(
            "--month must be 1-12, got {}",
            month
        )));
    }

    let settings = Settings::load()?;
    let db = Arc::new(Database::new(&settings.database_path).await?);
    let advisor = DiseaseAdvisor::new(Arc::new(DiseaseTable::builtin()?)).with_database(db);

    let report = advisor.assess(&crop, &condition, confidence).await?;

    println!("\nPlant disease report");
    println!("{}", "=".repeat(60));
    println!("{}", report.render());
    println!("{}", "=".repeat(60));

    if !report.is_healthy() {
        let (season, tips) = advisor.seasonal_recommendations(month);
        println!("\nSeasonal tips ({}):", season);
        for tip in tips {
            println!("  - {}", tip);
        }

        println!("\n{}", advisor.estimate_cost(&report.condition, tier));
    }
    println!();

    Ok(())
}

fn handle_crops() -> Result<()> {
    let reference = CropReference::builtin()?;

    println!("\nSupported crops (recommended N / P / K):");
    println!("{}", "=".repeat(40));
    for entry in reference.crops() {
        println!("  {:<14} {:>4} {:>4} {:>4}", entry.crop, entry.n, entry.p, entry.k);
    }
    println!("{}", "=".repeat(40));

    Ok(())
}

async fn handle_history(args: &[String]) -> Result<()> {
    let mut limit: i64 = 10;
    let mut kind: Option<PredictionKind> = None;
    let mut show: Option<i64> = None;
    let mut delete: Option<i64> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--fertilizer" => kind = Some(PredictionKind::Fertilizer),
            "--disease" => kind = Some(PredictionKind::Disease),
            "--chat" => kind = Some(PredictionKind::Chat),
            "--show" => {
                show = parse_flag("--show", args.get(i + 1))?;
                i += 1;
            }
            "--delete" => {
                delete = parse_flag("--delete", args.get(i + 1))?;
                i += 1;
            }
            raw => limit = parse_limit(raw)?,
        }
        i += 1;
    }

    let settings = Settings::load()?;
    let db = Database::new(&settings.database_path).await?;

    if let Some(id) = delete {
        if db.delete_prediction(id).await? {
            println!("Deleted prediction #{}", id);
        } else {
            println!("No prediction #{}", id);
        }
        return Ok(());
    }

    if let Some(id) = show {
        match db.get_prediction_by_id(id).await? {
            Some(pred) => print_prediction(&pred),
            None => println!("No prediction #{}", id),
        }
        return Ok(());
    }

    let predictions = db.get_recent_predictions(kind, limit).await?;

    if predictions.is_empty() {
        println!("No predictions recorded yet.");
        return Ok(());
    }

    println!("\nRecent predictions:");
    println!("{}", "=".repeat(60));
    for pred in &predictions {
        let first_line = pred.output.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        println!(
            "#{:<4} [{}] {:<10} {}",
            pred.id,
            pred.display_time(),
            pred.kind,
            first_line
        );
    }
    println!("{}", "=".repeat(60));
    println!("Use 'farmgenie history --show <id>' for the full text.");

    Ok(())
}

fn print_prediction(pred: &Prediction) {
    println!("\nPrediction #{} ({})", pred.id, pred.kind);
    println!("Recorded: {}", pred.display_time());
    println!("Inputs:   {}", pred.get_inputs());
    println!("{}", "=".repeat(60));
    println!("{}", pred.output);
    println!("{}", "=".repeat(60));
}

async fn handle_status() -> Result<()> {
    let settings = Settings::load()?;
    let db = Database::new(&settings.database_path).await?;
    let stats = db.stats().await?;
    let knowledge = KnowledgeBase::builtin()?;
    let rules = RuleTable::builtin()?;
    let diseases = DiseaseTable::builtin()?;

    println!("\nfarmgenie Status");
    println!("{}", "=".repeat(60));

    println!("\nLanguage model:");
    match settings.api_key() {
        Some(_) => println!("  {} (Cohere)", settings.model.model),
        None => println!("  not configured, chat uses the offline knowledge base"),
    }

    println!("\nKnowledge:");
    println!("  Topics:           {}", knowledge.len());
    println!("  Fertilizer rules: {}", rules.len());
    println!("  Diseases:         {}", diseases.len());

    println!("\nDatabase ({}):", db.path().display());
    println!("  Predictions: {}", stats.total_predictions);
    println!("  Fertilizer:  {}", stats.fertilizer_predictions);
    println!("  Disease:     {}", stats.disease_predictions);
    println!("  Chat:        {}", stats.chat_predictions);
    println!(
        "  Pool:        {} open, {} idle",
        stats.pool_size, stats.idle_connections
    );

    println!("{}", "=".repeat(60));

    Ok(())
}

fn build_matcher() -> Result<Arc<KeywordIntentMatcher>> {
    let knowledge = Arc::new(KnowledgeBase::builtin()?);
    Ok(Arc::new(KeywordIntentMatcher::new(knowledge)?))
}

fn parse_flag<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<Option<T>> {
    let raw = value.ok_or_else(|| AdvisorError::InvalidInput(format!("{} needs a value", flag)))?;

    raw.parse::<T>().map(Some).map_err(|_| {
        AdvisorError::InvalidInput(format!("{} expects a number, got '{}'", flag, raw))
    })
}

// SQLite reads a negative LIMIT as "no limit", so only accept 1 and up
fn parse_limit(raw: &str) -> Result<i64> {
    match raw.parse::<u32>() {
        Ok(limit) if limit > 0 => Ok(i64::from(limit)),
        _ => Err(AdvisorError::InvalidInput(format!(
            "history limit must be a positive number, got '{}'",
            raw
        ))),
    }
}

fn missing_flag(flag: &str) -> AdvisorError {
    AdvisorError::InvalidInput(format!("{} is required", flag))
}

fn print_usage() {
    println!(
        r#"farmgenie v{} - Farming advice from your terminal

USAGE:
    farmgenie <COMMAND> [OPTIONS]

COMMANDS:
    chat [--offline] <message>     Ask a farming question
    classify <message>             Show which knowledge topic a message hits
    fertilizer --crop <name> --n <N> --p <P> --k <K> --ph <pH> --moisture <%>
                                   Fertilizer plan from a soil test
    disease (--label <Crop___Condition> | --crop <name> --condition <name>)
            --confidence <0-1> [--month <1-12>] [--cost-tier low|moderate|high]
                                   Report for a classifier's disease verdict
    crops                          List crops with reference N/P/K values
    history [limit] [--fertilizer|--disease|--chat]
                                   Show recent advice (default: 10)
    history --show <id>            Show one stored result in full
    history --delete <id>          Delete one stored result
    status                         Show configuration and stats
    version                        Show version
    help                           Show this help

EXAMPLES:
    farmgenie chat how do I apply for PM-KISAN
    farmgenie fertilizer --crop rice --n 20 --p 40 --k 40 --ph 6.5 --moisture 50
    farmgenie disease --label Tomato___Late_blight --confidence 0.91
    farmgenie history 20 --fertilizer

CONFIGURATION:
    Set COHERE_API_KEY (or model.api_key in config/farmgenie.toml) to answer
    chat questions with a language model. Without it the offline knowledge
    base answers. Override any setting with FARMGENIE__<SECTION>__<KEY>.
"#,
        env!("CARGO_PKG_VERSION")
    );
}
