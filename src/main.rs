use std::{net::TcpListener, sync::Arc};

use actix_web::web;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use recon::{
    configuration::{get_configuration, Settings},
    domain::EnrichmentStats,
    services::{
        read_company_names_from_path, write_records_to_path, write_sample_companies,
        HttpFetcher, LeadEnricher,
    },
    startup::run,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Cli,
    Web,
}

/// Turn a list of company names into enriched leads.
#[derive(Parser, Debug)]
#[command(name = "recon", version)]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Cli)]
    mode: Mode,
    /// Input csv (cli mode), defaults to `files.input`
    #[arg(long)]
    input: Option<String>,
    /// Output csv (cli mode), defaults to `files.output`
    #[arg(long)]
    output: Option<String>,
    /// Only create the sample input file
    #[arg(long)]
    setup_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let configuration = get_configuration().context("Failed to read configuration.")?;

    write_sample_companies(&configuration.files.sample)
        .with_context(|| format!("Failed to create {}", configuration.files.sample))?;
    if args.setup_only {
        println!("Setup complete, sample file: {}", configuration.files.sample);
        return Ok(());
    }

    if configuration.api_keys.groq().is_none() && configuration.api_keys.gemini().is_none() {
        log::warn!("No Groq or Gemini api key configured, analysis will fall back to defaults");
    }

    let fetcher = HttpFetcher::new(&configuration.scraping.user_agent)?;
    let configuration = Arc::new(configuration);
    let enricher = LeadEnricher::new(Arc::new(fetcher), configuration.clone());

    match args.mode {
        Mode::Cli => {
            let input = args.input.unwrap_or_else(|| configuration.files.input.clone());
            let output = args.output.unwrap_or_else(|| configuration.files.output.clone());
            run_cli(&enricher, &configuration, &input, &output).await
        }
        Mode::Web => {
            let address = format!(
                "{}:{}",
                configuration.application.host, configuration.application.port
            );
            let listener = TcpListener::bind(&address)?;
            log::info!("Serving lead enrichment on http://{}", address);

            run(listener, web::Data::new(enricher))?.await?;
            Ok(())
        }
    }
}

async fn run_cli(
    enricher: &LeadEnricher,
    configuration: &Settings,
    input: &str,
    output: &str,
) -> anyhow::Result<()> {
    println!("Input file: {}", input);
    println!("Output file: {}", output);

    let names = read_company_names_from_path(input, &configuration.files.name_column)
        .with_context(|| format!("Cannot process {}", input))?;

    let records = enricher.enrich_batch(&names).await;
    write_records_to_path(output, &records)
        .with_context(|| format!("Failed to write {}", output))?;

    let stats = EnrichmentStats::from_records(&records);
    println!("Processed {} companies", stats.total);
    println!("Results saved to: {}", output);
    println!(
        "Success rate: {:.1}% ({}/{})",
        stats.success_rate(),
        stats.websites_found,
        stats.total
    );

    Ok(())
}
