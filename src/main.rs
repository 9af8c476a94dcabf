use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use storybook::{
    serve, GeminiClient, GeminiConfig, HumanStory, PipelineConfig, StoryFile, StoryMetadata,
    StoryPipeline, StoryRequest,
};

#[derive(Parser)]
#[command(name = "storybook")]
#[command(author, version, about = "Children's storybook generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the storybook HTTP endpoint
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate one storybook and write it to disk
    Generate {
        /// Story idea
        #[arg(short, long)]
        prompt: String,

        /// Number of pages
        #[arg(long, default_value = "3")]
        pages: u32,

        /// Output file for the story (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable rendering (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, verbose } => {
            setup_logging(verbose);
            let pipeline = build_pipeline()?;
            serve(&bind, Arc::new(pipeline)).await
        }
        Commands::Generate {
            prompt,
            pages,
            output,
            human_readable,
            verbose,
        } => {
            setup_logging(verbose);
            generate_story(prompt, pages, output, human_readable).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn build_pipeline() -> Result<StoryPipeline> {
    let config = GeminiConfig::from_env()?;
    info!(
        "Using models: text={}, image={}, tts={} (voice {})",
        config.text_model, config.image_model, config.tts_model, config.voice
    );
    Ok(StoryPipeline::with_gemini(
        GeminiClient::new(config),
        PipelineConfig::default(),
    ))
}

async fn generate_story(
    prompt: String,
    pages: u32,
    output: PathBuf,
    human_readable: Option<PathBuf>,
) -> Result<()> {
    let pipeline = build_pipeline()?;
    let request = StoryRequest::new(&prompt, pages, &pipeline.config().limits)
        .context("Invalid story request")?;

    let request_id = Uuid::new_v4();
    let story = pipeline
        .generate(&request, request_id)
        .await
        .context("Story generation failed")?;

    let metadata = StoryMetadata::new(&request_id.to_string(), &request, &story);
    StoryFile::new(&story, metadata).write_json(&output)?;
    info!("Story written to {:?}", output);

    if let Some(path) = human_readable {
        HumanStory::new(&story).write_file(&path)?;
        info!("Human-readable story written to {:?}", path);
    }

    info!(
        "Complete: \"{}\", {} pages ({} illustrations failed, {} narrations failed)",
        story.title,
        story.pages.len(),
        story.illustrations_failed(),
        story.narrations_failed()
    );

    Ok(())
}
