use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tei_placenames::apis::{CachedResolver, GettyTgnResolver};
use tei_placenames::extractor::{document_date, place_references};
use tei_placenames::pipeline::discover_inputs;
use tei_placenames::{
    document, logging, metrics, FailurePolicy, GeoResolver, Pipeline, PipelineConfig,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tei-placenames")]
#[command(about = "Geolocate place names in TEI letters and export a DARIAH Geobrowser CSV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML file with pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Glob selecting the letters to read, e.g. "corpus/*TGN.xml"
    #[arg(long)]
    input: Option<String>,
    /// Getty TGN base URL
    #[arg(long)]
    vocab_base_url: Option<String>,
    /// HTTP timeout in seconds (client default when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, geolocate and write the CSV
    Run {
        #[command(flatten)]
        common: ConfigArgs,
        /// Destination CSV file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Look up each identifier once per run (default: every occurrence is fetched)
        #[arg(long)]
        cache: bool,
        /// Skip letters that fail instead of aborting the run
        #[arg(long)]
        continue_on_error: bool,
        /// Print the run summary as JSON on stdout
        #[arg(long)]
        summary_json: bool,
    },
    /// List each letter's date and place references without any lookups
    Extract {
        #[command(flatten)]
        common: ConfigArgs,
    },
    /// Look up a single Getty TGN identifier
    Resolve {
        /// Bare identifier, e.g. 7000874
        identifier: String,
        #[command(flatten)]
        common: ConfigArgs,
    },
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())?;
        if let Some(input) = &self.input {
            config.input_glob = input.clone();
        }
        if let Some(url) = &self.vocab_base_url {
            config.vocab_base_url = url.clone();
        }
        if self.timeout_secs.is_some() {
            config.request_timeout_secs = self.timeout_secs;
        }
        Ok(config)
    }
}

fn build_resolver(config: &PipelineConfig) -> anyhow::Result<Box<dyn GeoResolver>> {
    let getty = GettyTgnResolver::new(config.vocab_base_url.clone(), config.request_timeout())?;
    let resolver: Box<dyn GeoResolver> = if config.cache_lookups {
        Box::new(CachedResolver::new(getty))
    } else {
        Box::new(getty)
    };
    Ok(resolver)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let _log_guard = logging::init_logging();
    metrics::init_metrics();

    match cli.command {
        Commands::Run {
            common,
            output,
            cache,
            continue_on_error,
            summary_json,
        } => {
            let mut config = common.load()?;
            if let Some(output) = output {
                config.output_path = output;
            }
            if cache {
                config.cache_lookups = true;
            }
            if continue_on_error {
                config.failure_policy = FailurePolicy::SkipFailedFiles;
            }
            config.validate()?;

            let resolver = build_resolver(&config)?;
            let pipeline = Pipeline::new(config, resolver);
            let result = match pipeline.run() {
                Ok(result) => result,
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e).context("no output written");
                }
            };
            info!("Pipeline finished");

            if summary_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("\n📊 Pipeline Results:");
                println!("   Files matched: {}", result.files_matched);
                println!("   Files processed: {}", result.files_processed);
                println!("   Rows written: {}", result.records_written);
                println!("   Cache hits: {}", result.cache_hits);
                println!("   Output file: {}", result.output_path.display());
                if !result.errors.is_empty() {
                    println!("\n⚠️  Skipped files:");
                    for failure in &result.errors {
                        println!("   - {}: {}", failure.path.display(), failure.message);
                    }
                }
            }
        }
        Commands::Extract { common } => {
            let config = common.load()?;
            config.validate()?;
            for path in discover_inputs(&config.input_glob)? {
                let doc = document::read_document(&path)?;
                let date = document_date(&doc)?;
                let references = place_references(&doc)?;
                println!("\n{} ({}, {} places)", path.display(), date, references.len());
                for reference in references {
                    println!("   {}\t{}", reference.identifier, reference.name);
                }
            }
        }
        Commands::Resolve { identifier, common } => {
            let config = common.load()?;
            config.validate()?;
            let resolver =
                GettyTgnResolver::new(config.vocab_base_url.clone(), config.request_timeout())?;
            let geo = resolver
                .resolve(&identifier)
                .with_context(|| format!("looking up {}", resolver.rdf_url(&identifier)))?;
            println!("{}\t{}\t{}", identifier, geo.latitude, geo.longitude);
        }
    }

    Ok(())
}
