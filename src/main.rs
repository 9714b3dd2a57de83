//! Zentinel SOAP binding tool.
//!
//! Run with: `zentinel-soap-binding --config binding.yaml`
//!
//! Synthesizes the binding element sequence for a binding description,
//! recognizes it again and prints both.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_soap_binding::envelope::render_fault;
use zentinel_soap_binding::fault::{must_understand_fault, NotUnderstoodHeader};
use zentinel_soap_binding::mode::UnifiedSecurityMode;
use zentinel_soap_binding::{
    BindingConfiguration, BindingDescriptionConfig, BindingElementSequence, BindingFamily,
};

/// Security binding pipeline tool.
///
/// Builds the security, encoding and transport elements for a binding
/// description and checks that they are recognized again.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to binding description (YAML)
    #[arg(short, long, default_value = "binding.yaml")]
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Print a fault envelope instead of the binding report
    #[arg(long, value_enum)]
    fault: Option<FaultKind>,

    /// Header the receiver did not understand, as `namespace:name`
    #[arg(long = "header")]
    headers: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FaultKind {
    MustUnderstand,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    family: BindingFamily,
    unified_mode: UnifiedSecurityMode,
    elements: &'a BindingElementSequence,
    recognized: Option<BindingConfiguration>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Zentinel SOAP binding tool v{}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", args.config.display());

    // Load configuration
    let config = if args.config.exists() {
        let content = tokio::fs::read_to_string(&args.config)
            .await
            .context("Failed to read config file")?;
        BindingDescriptionConfig::from_yaml(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        BindingDescriptionConfig::default()
    };

    let binding = config
        .into_binding()
        .context("Invalid binding description")?;

    info!(
        family = %binding.family(),
        unified_mode = ?binding.unified_mode(),
        culture = %config.settings.culture,
        "Configuration loaded"
    );

    if let Some(FaultKind::MustUnderstand) = args.fault {
        let headers = args
            .headers
            .iter()
            .map(|h| parse_header(h))
            .collect::<Result<Vec<_>>>()?;
        let message = must_understand_fault(
            &headers,
            binding.family().message_version(),
            &config.settings.culture,
        )
        .context("Failed to build MustUnderstand fault")?;
        info!(
            content_type = message.version.envelope.content_type(),
            "Rendered MustUnderstand fault"
        );
        println!("{}", render_fault(&message, &config.settings.culture)?);
        return Ok(());
    }

    let elements = binding
        .create_elements()
        .context("Failed to synthesize binding elements")?;
    let recognized = BindingConfiguration::probe(&elements);
    if recognized.is_none() {
        info!("Synthesized elements were not recognized by any binding family");
    }

    let report = Report {
        family: binding.family(),
        unified_mode: binding.unified_mode(),
        elements: &elements,
        recognized,
    };
    let output = match args.format {
        OutputFormat::Yaml => serde_yaml::to_string(&report).context("Failed to write YAML")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).context("Failed to write JSON")?
        }
    };
    println!("{output}");
    Ok(())
}

/// Split `namespace:name` at the last colon so URI namespaces stay intact.
fn parse_header(value: &str) -> Result<NotUnderstoodHeader> {
    let (namespace, name) = value
        .rsplit_once(':')
        .with_context(|| format!("Header '{value}' is not of the form namespace:name"))?;
    NotUnderstoodHeader::new(name, namespace)
        .with_context(|| format!("Invalid header '{value}'"))
}
