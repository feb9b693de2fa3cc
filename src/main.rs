use clap::Parser;
use namecheck::core::request::build_request;
use namecheck::utils::error::{ErrorSeverity, NamecheckError};
use namecheck::utils::{logger, validation::Validate};
use namecheck::{
    load_candidates, CandidateBatch, CliConfig, FileResultSink, HttpExecutor, Scheduler,
    ServicesConfig, TracingReporter,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting namecheck");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ namecheck failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> namecheck::Result<()> {
    config.validate()?;

    tracing::info!("📁 Loading services from: {}", config.services);
    let services = ServicesConfig::from_file(&config.services)?;
    services.validate()?;

    let Some(service_name) = config.service.as_deref() else {
        println!("Available services:");
        for (i, name) in services.names().iter().enumerate() {
            println!("  {} {}", i + 1, name);
        }
        return Err(NamecheckError::MissingConfigError {
            field: "--service".to_string(),
        });
    };
    let wordlist = config
        .wordlist
        .as_deref()
        .ok_or_else(|| NamecheckError::MissingConfigError {
            field: "--wordlist".to_string(),
        })?;

    let descriptor = services.descriptor(service_name)?;
    let sink = Arc::new(FileResultSink::new(&config.output));

    let batch = load_candidates(
        sink.as_ref(),
        &descriptor,
        Path::new(wordlist),
        config.max_length,
        config.interval(),
    )
    .await?;
    println!("found {} unchecked words", batch.len());

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        print_dry_run(&descriptor, &batch);
        return Ok(());
    }

    let executor = HttpExecutor::new(config.timeout())?;
    let scheduler = Scheduler::new(
        Arc::new(descriptor),
        Arc::new(executor),
        sink,
        TracingReporter,
    )
    .with_failure_policy(config.failure_policy());

    let report = scheduler.run(batch).await;

    println!(
        "done. {} checked, {} available, {} failed ({:.1?})",
        report.total_checked, report.total_available, report.total_failed, report.elapsed
    );
    for word in &report.available_words {
        println!("  {}", word);
    }

    Ok(())
}

fn print_dry_run(descriptor: &namecheck::core::ServiceDescriptor, batch: &CandidateBatch) {
    println!("🔍 Dry Run Analysis:");
    println!("  Service: {}", descriptor.name);
    println!(
        "  Length bounds: {:?}..={:?}",
        descriptor.min_length, descriptor.max_length
    );
    println!("  Candidates: {}", batch.len());
    println!("  Interval: {:?}", batch.interval);
    println!(
        "  Estimated dispatch time: {:?}",
        batch.interval * batch.len().saturating_sub(1) as u32
    );

    if let Some(first) = batch.words.first() {
        match build_request(descriptor, first) {
            Ok(request) => {
                println!("  First request ({}):", first);
                match serde_json::to_string_pretty(&request) {
                    Ok(rendered) => println!("{}", rendered),
                    Err(e) => println!("    <unprintable: {}>", e),
                }
            }
            Err(e) => println!("  First request ({}) cannot be built: {}", first, e),
        }
    }
}
