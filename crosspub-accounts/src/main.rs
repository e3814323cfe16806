//! crosspub-accounts - Account linking and credential management for Crosspub
//!
//! This tool links social platform accounts through the backend's browser
//! authorization flow and manages the API credentials each platform needs.

use std::collections::HashMap;

use anyhow::Result;
use clap::{Parser, Subcommand};
use libcrosspub::credentials::{self, CredentialFields};
use libcrosspub::logging::{LogFormat, LoggingConfig};
use libcrosspub::{Config, ConnectOutcome, CrosspubService, Platform};
use tracing::error;

#[derive(Parser)]
#[command(name = "crosspub-accounts")]
#[command(version)]
#[command(about = "Manage linked social accounts and platform credentials", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List linked accounts and configured credentials
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Link a platform account via browser authorization
    Connect {
        /// Platform name (facebook, instagram, linkedin, twitter, tiktok)
        platform: String,
    },

    /// Disconnect a linked account
    Disconnect {
        /// Account ID to disconnect (see 'list')
        account_id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Store API credentials for a platform
    Credentials {
        /// Platform name (facebook, instagram, linkedin, twitter, tiktok)
        platform: String,

        /// Read credentials as a JSON object from stdin (for automation)
        #[arg(long)]
        stdin: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    LoggingConfig::new(LogFormat::Text, "info".to_string(), cli.verbose).init();

    // Execute command
    if let Err(e) = run_command(cli.command).await {
        error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_command(command: Commands) -> Result<()> {
    let config = Config::load()?;
    let service = CrosspubService::from_config(&config)?;

    match command {
        Commands::List { format } => cmd_list(&service, &format).await,
        Commands::Connect { platform } => cmd_connect(&service, &platform).await,
        Commands::Disconnect { account_id, force } => {
            cmd_disconnect(&service, &account_id, force).await
        }
        Commands::Credentials { platform, stdin } => {
            cmd_credentials(&service, &platform, stdin).await
        }
    }
}

/// Parse a platform name, listing the valid ones on failure
fn parse_platform(name: &str) -> Result<Platform> {
    name.parse().map_err(|_| {
        anyhow::anyhow!(
            "Unknown platform: {}. Supported platforms: facebook, instagram, linkedin, twitter, tiktok",
            name
        )
    })
}

/// List linked accounts and which platforms have credentials configured
async fn cmd_list(service: &CrosspubService, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        anyhow::bail!("Invalid format '{}'. Must be 'text' or 'json'", format);
    }

    let accounts = service.linker().accounts().await?;
    let status = service.linker().credential_status().await?;

    if format == "json" {
        let json = serde_json::json!({
            "accounts": accounts,
            "credentials": status,
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No accounts linked.");
        println!();
        println!("Use 'crosspub-accounts connect <platform>' to link one.");
    } else {
        println!("Linked accounts:");
        for account in &accounts {
            println!(
                "  {} | {} | {}",
                account.platform, account.account_name, account.id
            );
        }
    }
    println!();

    let configured: Vec<&str> = Platform::ALL
        .iter()
        .copied()
        .filter(|p| status.get(p).copied().unwrap_or(false))
        .map(|p| p.as_str())
        .collect();
    if configured.is_empty() {
        println!("Configured credentials: none");
    } else {
        println!("Configured credentials: {}", configured.join(", "));
    }

    Ok(())
}

/// Link a platform account, opening the authorization page and waiting for
/// the backend to report the new account
async fn cmd_connect(service: &CrosspubService, platform: &str) -> Result<()> {
    let platform = parse_platform(platform)?;

    let known = service.linker().accounts().await?;
    let handle = service.linker().connect(platform, &known).await?;

    println!("Authorization URL: {}", handle.auth_url());
    println!();
    println!(
        "Complete the authorization in your browser. Waiting for {} (Ctrl-C to cancel)...",
        platform.display_name()
    );

    // Ctrl-C resolves the attempt as Cancelled instead of killing the process
    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match handle.wait().await {
        ConnectOutcome::Linked { account, accounts } => {
            println!(
                "✓ Linked {} account '{}'",
                account.platform.display_name(),
                account.account_name
            );
            println!("{} account(s) now linked", accounts.len());
            Ok(())
        }
        ConnectOutcome::TimedOut => {
            println!("✗ Timed out waiting for authorization (120 seconds)");
            println!("Run the command again to retry.");
            std::process::exit(1);
        }
        ConnectOutcome::Cancelled => {
            println!("Cancelled");
            Ok(())
        }
    }
}

/// Disconnect a linked account after confirmation
async fn cmd_disconnect(service: &CrosspubService, account_id: &str, force: bool) -> Result<()> {
    let known = service.linker().accounts().await?;

    let account = match known.iter().find(|a| a.id == account_id) {
        Some(account) => account,
        None => anyhow::bail!(
            "No linked account with id '{}'. Run 'crosspub-accounts list' to see linked accounts.",
            account_id
        ),
    };

    // Confirm unless --force is used
    if !force && atty::is(atty::Stream::Stdin) {
        use std::io::{self, Write};
        print!(
            "Disconnect {} account '{}'? [y/N]: ",
            account.platform.display_name(),
            account.account_name
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    let remaining = service.linker().disconnect(account_id, &known).await?;

    println!("✓ Disconnected account '{}'", account.account_name);
    println!("{} account(s) still linked", remaining.len());

    Ok(())
}

/// Prompt for and submit a platform's API credentials
async fn cmd_credentials(service: &CrosspubService, platform: &str, use_stdin: bool) -> Result<()> {
    let platform = parse_platform(platform)?;

    let fields = if use_stdin {
        read_fields_from_stdin()?
    } else {
        prompt_fields(platform)?
    };

    credentials::validate_required(platform, &fields)?;

    let known = service.linker().credential_status().await?;
    service.linker().save_credentials(platform, &fields, &known).await?;

    println!("✓ {} credentials saved", platform.display_name());

    Ok(())
}

/// Read a flat JSON object of credential fields from stdin (automation mode)
fn read_fields_from_stdin() -> Result<CredentialFields> {
    use std::io::Read;

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;

    let map: HashMap<String, String> = serde_json::from_str(buffer.trim())
        .map_err(|e| anyhow::anyhow!("Failed to parse credential JSON: {}", e))?;

    let mut fields = CredentialFields::new();
    for (key, value) in map {
        fields.insert(key, value);
    }
    Ok(fields)
}

/// Prompt for each of the platform's credential fields; secret fields are
/// read without echo
fn prompt_fields(platform: Platform) -> Result<CredentialFields> {
    use std::io::Write;

    if !atty::is(atty::Stream::Stdin) {
        anyhow::bail!("Not a TTY. Use --stdin to pipe credentials as a JSON object for automation.");
    }

    println!("{} credentials", platform.display_name());

    let mut fields = CredentialFields::new();
    for field in credentials::schema(platform) {
        let label = if field.required {
            field.label.to_string()
        } else {
            format!("{} (optional, leave blank to skip)", field.label)
        };

        let value = if field.secret {
            rpassword::prompt_password(format!("  {}: ", label))?
        } else {
            print!("  {}: ", label);
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        };

        if !value.trim().is_empty() {
            fields.insert(field.key, value);
        }
    }

    Ok(fields)
}
