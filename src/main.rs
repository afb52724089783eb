use anyhow::Result;
use clap::Parser;
use filepress::app::{App, Request};
use filepress::models::{validate_quality, Action, Config, OutputFormat, ProcessingOptions};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "filepress")]
#[command(about = "Compress, resize or convert an image or PDF file")]
struct CliArgs {
    /// Files to offer; the first supported one is processed.
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    #[arg(short, long, value_enum)]
    action: Action,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jpeg)]
    format: OutputFormat,

    /// Encode quality between 0.0 and 1.0; only used by `compress`.
    #[arg(short, long, value_parser = parse_quality_arg)]
    quality: Option<f32>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Overrides FILEPRESS_OUTPUT_DIR.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print a JSON report of the result to stdout.
    #[arg(long)]
    json: bool,
}

fn parse_quality_arg(input: &str) -> std::result::Result<f32, String> {
    let quality: f32 = input
        .parse()
        .map_err(|_| format!("Invalid quality '{}'. Expected a number", input))?;
    validate_quality(quality).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filepress=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let options = ProcessingOptions {
        format: args.format,
        quality: args.quality.unwrap_or(config.default_quality),
        width: args.width,
        height: args.height,
    };

    let app = App::new(&config);
    let request = Request {
        inputs: args.inputs,
        action: args.action,
        options,
    };

    match app.run(request).await {
        Ok(outcome) => {
            info!("{}", outcome.result.summary(outcome.action));
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome.report())?);
            } else {
                println!("{}", outcome.path.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("Processing failed: {}", e);
            std::process::exit(1);
        }
    }
}
