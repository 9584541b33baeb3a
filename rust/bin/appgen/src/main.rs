//! `appgen` — generate a full-stack web application.
//!
//! Usage:
//!   appgen "a subscription tracker with name, amount and cycle" --output ./tracker
//!   appgen --from-dsl ./tracker/dsl.json --output ./tracker
//!
//! A free-text request is drafted into a schema document by the OpenAI
//! drafter; `--from-dsl` skips drafting and reads the document from disk.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use appgen_pipeline::{
    ConsoleSink, GenerateOptions, GenerationReport, JsonLinesSink, OpenAiDrafter, Orchestrator,
    ProgressSink, Source,
};
use clap::{Parser, ValueEnum};
use tracing::info;

use config::AppgenConfig;

/// Generate a backend, frontend, database migration and deployment files
/// from one application schema.
#[derive(Parser, Debug)]
#[command(name = "appgen", version, about = "Full-stack application generator")]
struct Cli {
    /// Free-text description of the application.
    #[arg(required_unless_present = "from_dsl", conflicts_with = "from_dsl")]
    prompt: Option<String>,

    /// Generate from an existing schema file instead of a description.
    #[arg(long = "from-dsl", value_name = "FILE")]
    from_dsl: Option<PathBuf>,

    /// Output directory (default: ./generated-app).
    #[arg(long, short = 'o', value_name = "DIR")]
    output: Option<PathBuf>,

    /// PostgreSQL schema name (default: public).
    #[arg(long = "schema", value_name = "NAME")]
    schema: Option<String>,

    /// OpenAI API key (default: $OPENAI_API_KEY).
    #[arg(long = "api-key", value_name = "KEY")]
    api_key: Option<String>,

    /// Drafting model.
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Path to config file (default: ./appgen.toml).
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Progress output format.
    #[arg(long, value_enum, default_value_t = ProgressFormat::Console)]
    progress: ProgressFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProgressFormat {
    /// `[SQL] Generating database migration (40%)`
    Console,
    /// One JSON object per line on stdout.
    Json,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON progress on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppgenConfig::default_path);
    let config = AppgenConfig::load(&config_path)?;

    let output = config.output_dir(cli.output);
    let mut options = GenerateOptions::default();
    if let Some(namespace) = config.namespace(cli.schema) {
        options.namespace = namespace;
    }

    let source = match (cli.prompt, cli.from_dsl) {
        (_, Some(path)) => Source::DslFile(path),
        (Some(prompt), None) => Source::Prompt(prompt),
        (None, None) => anyhow::bail!("Provide an application description or --from-dsl <FILE>."),
    };

    let sink: Box<dyn ProgressSink> = match cli.progress {
        ProgressFormat::Console => Box::new(ConsoleSink),
        ProgressFormat::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
    };
    let mut orchestrator = Orchestrator::new(sink);

    if let Source::Prompt(prompt) = &source {
        info!("Request: {}", prompt);
        let drafter = OpenAiDrafter::new(config.drafter.resolve(cli.api_key, cli.model))
            .context("cannot draft a schema without an API key")?;
        orchestrator = orchestrator.with_drafter(drafter);
    }

    let report = orchestrator.generate(source, &output, &options)?;

    if cli.progress == ProgressFormat::Console {
        print_summary(&report, &output);
    }
    Ok(())
}

fn print_summary(report: &GenerationReport, output: &Path) {
    let schema = &report.schema;
    println!();
    println!("Generated \"{}\" into {}", schema.name, output.display());
    println!("  entities: {}", schema.entities.len());
    println!("  pages:    {}", schema.pages.len());
    println!("  files:    {}", report.written.len());
    println!();
    println!("Next steps:");
    println!("  1. cd {}/backend && cargo run", output.display());
    println!("  2. cd {}/frontend && npm install && npm run dev", output.display());
    println!("  3. psql -f {}/migration.sql", output.display());
    println!("  or: cd {} && docker compose up -d", output.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_prompt_or_dsl_required() {
        assert!(Cli::try_parse_from(["appgen"]).is_err());
        assert!(Cli::try_parse_from(["appgen", "todo app", "--from-dsl", "dsl.json"]).is_err());

        let cli = Cli::try_parse_from(["appgen", "--from-dsl", "dsl.json", "-o", "out"]).unwrap();
        assert_eq!(cli.from_dsl, Some(PathBuf::from("dsl.json")));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.progress, ProgressFormat::Console);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "appgen",
            "a crm",
            "--schema",
            "crm",
            "--api-key",
            "sk-x",
            "--model",
            "gpt-4o",
            "--config",
            "ci.toml",
            "--progress",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.prompt.as_deref(), Some("a crm"));
        assert_eq!(cli.schema.as_deref(), Some("crm"));
        assert_eq!(cli.api_key.as_deref(), Some("sk-x"));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        assert_eq!(cli.progress, ProgressFormat::Json);
    }
}
