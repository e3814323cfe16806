//! crosspub-post - Compose and publish posts from the command line
//!
//! Unix-style tool for creating and publishing posts across connected
//! social platforms through the Crosspub backend.

use std::io::Read;

use clap::Parser;
use libcrosspub::error::ValidationError;
use libcrosspub::logging::{LogFormat, LoggingConfig};
use libcrosspub::schedule::parse_schedule;
use libcrosspub::{
    Config, CrosspubService, NewPost, Platform, Post, PostStatus, PublishResponse, Result,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "crosspub-post")]
#[command(version)]
#[command(about = "Compose and publish posts across social platforms")]
#[command(long_about = "\
crosspub-post - Compose and publish posts across social platforms

DESCRIPTION:
    crosspub-post creates a post through the Crosspub backend and publishes
    it to the selected platforms in one step. Use --draft to save without
    publishing, or --schedule to queue the post for later.

    Content is read from the argument, or from stdin when omitted:
        echo \"Hello world\" | crosspub-post --platforms facebook

USAGE EXAMPLES:
    # Publish to two platforms
    crosspub-post \"Product launch is live!\" --platforms facebook,linkedin

    # Save a draft without publishing
    crosspub-post \"Rough idea for later\" --draft

    # Schedule for tomorrow morning
    crosspub-post \"Weekly roundup\" --platforms twitter --schedule \"tomorrow 9am\"

    # Pipe content in, machine-readable output
    cat announcement.txt | crosspub-post --platforms facebook --format json

CONFIGURATION:
    Configuration file: ~/.config/crosspub/config.toml

    Override with environment variables:
        CROSSPUB_CONFIG - Path to config file
        CROSSPUB_LOG    - Log filter (overrides --verbose)

EXIT CODES:
    0 - Post published (fully or partially), or draft saved
    1 - Publish failed on every platform, or backend error
    2 - Configuration error
    3 - Invalid input (empty content, unknown platform, bad schedule)

For more information, visit: https://github.com/crosspub/crosspub
")]
struct Cli {
    /// Post content; read from stdin when omitted
    content: Option<String>,

    /// Optional post title
    #[arg(short, long)]
    title: Option<String>,

    /// Comma-separated target platforms (e.g. "facebook,linkedin")
    #[arg(short, long)]
    #[arg(help = "Comma-separated platforms; falls back to defaults in config")]
    platforms: Option<String>,

    /// Save as a draft instead of publishing
    #[arg(short, long)]
    draft: bool,

    /// Schedule for later (RFC3339, "+2h", or "tomorrow 9am")
    #[arg(short, long, value_name = "WHEN")]
    schedule: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Log output format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    #[arg(help = "Enable verbose logging to stderr (useful for debugging)")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Initialize logging
    let log_format = cli
        .log_format
        .parse::<LogFormat>()
        .map_err(ValidationError::InvalidInput)?;
    LoggingConfig::new(log_format, "warn".to_string(), cli.verbose).init();

    // Validate flags before touching the network
    if cli.format != "text" && cli.format != "json" {
        return Err(ValidationError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            cli.format
        ))
        .into());
    }
    if cli.draft && cli.schedule.is_some() {
        return Err(ValidationError::InvalidInput(
            "Cannot use --draft and --schedule together. Choose one.".to_string(),
        )
        .into());
    }

    let content = read_content(cli.content)?;

    // Load configuration and connect to the backend
    let config = Config::load()?;
    let platforms = resolve_platforms(cli.platforms.as_deref(), &config)?;
    debug!(base_url = %config.api.base_url, ?platforms, "Configuration loaded");
    let service = CrosspubService::from_config(&config)?;

    let mut input = NewPost::new(content).with_platforms(platforms);
    if let Some(title) = cli.title {
        input = input.with_title(title);
    }
    if let Some(expr) = &cli.schedule {
        input = input.scheduled(parse_schedule(expr)?);
    }

    if cli.draft || cli.schedule.is_some() {
        let post = service.publisher().save_draft(&input).await?;
        if cli.format == "json" {
            output_post_json(&post);
        } else {
            output_post_text(&post);
        }
        return Ok(());
    }

    let response = service.publisher().publish_now(&input).await?;
    if cli.format == "json" {
        output_publish_json(&response);
    } else {
        output_publish_text(&response);
    }

    // A publish that failed on every platform is an error for scripting
    // purposes even though the post record was created
    if response.post.status == PostStatus::Failed {
        std::process::exit(1);
    }

    Ok(())
}

/// Post content comes from the argument, or stdin when piped
fn read_content(arg: Option<String>) -> Result<String> {
    match arg {
        Some(content) => Ok(content),
        None => {
            if atty::is(atty::Stream::Stdin) {
                return Err(ValidationError::InvalidInput(
                    "No content provided. Pass it as an argument or pipe it on stdin."
                        .to_string(),
                )
                .into());
            }
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).map_err(|e| {
                ValidationError::InvalidInput(format!("Failed to read stdin: {}", e))
            })?;
            Ok(buffer.trim_end().to_string())
        }
    }
}

/// Platforms come from --platforms, falling back to the config defaults
fn resolve_platforms(flag: Option<&str>, config: &Config) -> Result<Vec<Platform>> {
    if let Some(list) = flag {
        return Ok(Platform::parse_list(list)?);
    }
    let mut platforms = Vec::new();
    for entry in &config.defaults.platforms {
        let platform = entry.parse::<Platform>()?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

/// Human-readable summary of a saved draft or scheduled post
fn output_post_text(post: &Post) {
    match post.status {
        PostStatus::Scheduled => {
            let when = post
                .scheduled_at
                .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("Scheduled for {} (post {})", when, post.id);
        }
        _ => println!("Draft saved (post {})", post.id),
    }
}

fn output_post_json(post: &Post) {
    println!("{}", serde_json::to_string_pretty(post).unwrap());
}

/// Human-readable publish report with one line per platform
fn output_publish_text(response: &PublishResponse) {
    match response.post.status {
        PostStatus::Published => println!("Published (post {})", response.post.id),
        PostStatus::Partial => println!("Partially published (post {})", response.post.id),
        PostStatus::Failed => println!("Publish failed (post {})", response.post.id),
        other => println!("{} (post {})", other, response.post.id),
    }

    for result in &response.results {
        if result.success {
            println!("  ✓ {}", result.platform.display_name());
        } else {
            println!(
                "  ✗ {}: {}",
                result.platform.display_name(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn output_publish_json(response: &PublishResponse) {
    let json = serde_json::json!({
        "post": response.post,
        "results": response.results,
    });
    println!("{}", serde_json::to_string_pretty(&json).unwrap());
}
