mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use brainbox::api::ApiError;
use brainbox::embed::{resolve_item, EmbedDescriptor};
use brainbox::mapping::{display_tag, parse_tags};
use brainbox::registry;
use brainbox::types::ContentItem;
use brainbox::{config::Config, Brainbox};
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("brainbox=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::NotAuthenticated | ApiError::Unauthorized { .. })) {
                eprintln!("hint: run `brainbox login <email>` first");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let bb = Brainbox::connect(config).await?;
    if bb.first_visit().await? && !matches!(cli.command, Commands::Login { .. } | Commands::Signup { .. }) {
        eprintln!("Welcome to brainbox. Create an account with `brainbox signup` or sign in with `brainbox login`.");
    }

    match cli.command {
        Commands::Login { email, password } => {
            let auth = bb.login(&email, &password).await?;
            println!("{}", if auth.message.is_empty() { "Signed in" } else { auth.message.as_str() });
        }
        Commands::Signup { name, email, password } => {
            println!("{}", bb.signup(&name, &email, &password).await?);
        }
        Commands::Logout => {
            bb.logout().await?;
            println!("Signed out");
        }
        Commands::List { kind, tag } => {
            let items = bb.list(kind, tag.as_deref()).await?;
            print_items(&items, cli.json)?;
        }
        Commands::Add { kind, link, title, tags } => {
            let msg = bb.add(kind, &title, &link, parse_tags(&tags)).await?;
            println!("{}", msg.unwrap_or_else(|| "Content added".into()));
        }
        Commands::Note { title, body, tags } => {
            let msg = bb.note(&title, &body, parse_tags(&tags)).await?;
            println!("{}", msg.unwrap_or_else(|| "Note added".into()));
        }
        Commands::Edit { id, body } => {
            bb.edit_note(&id, &body).await?;
            println!("Note updated");
        }
        Commands::Delete { id } => {
            bb.delete(&id).await?;
            println!("Deleted {id}");
        }
        Commands::Share { off } => match bb.share(!off).await? {
            Some(url) => println!("{url}"),
            None => println!("Sharing disabled"),
        },
        Commands::Shared { hash } => {
            let snap = bb.shared(&hash).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snap)?);
            } else {
                println!("{}'s Brain", if snap.username.is_empty() { "Someone" } else { snap.username.as_str() });
                print_items(&snap.content, false)?;
            }
        }
        Commands::Resolve { kind, link, title } => {
            let descriptor = bb.resolve(kind, &link, &title);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            } else {
                println!("{}", describe(&descriptor));
            }
        }
        Commands::Export { hash, out, layout } => {
            let html = bb.export(hash.as_deref(), layout).await?;
            tokio::fs::write(&out, html).await.with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }
    Ok(())
}

fn print_items(items: &[ContentItem], json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = items
            .iter()
            .map(|i| serde_json::json!({ "item": i, "embed": resolve_item(i) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("Nothing saved yet.");
    }
    for item in items {
        let name = item.platform().map(registry::display_name).unwrap_or(item.kind.as_str());
        let tags: Vec<String> = item.tags.iter().map(|t| display_tag(t)).collect();
        println!("{}  [{}] {}", item.id, name, item.title);
        println!("    {}", describe(&resolve_item(item)));
        if !tags.is_empty() {
            println!("    {}", tags.join(" "));
        }
    }
    Ok(())
}

fn describe(d: &EmbedDescriptor) -> String {
    match d {
        EmbedDescriptor::Iframe { src, .. } => format!("iframe {src}"),
        EmbedDescriptor::ScriptWidget { script_url, .. } => format!("widget via {script_url}"),
        EmbedDescriptor::StaticCard { body: Some(body), cta_url: None, .. } => body.clone(),
        EmbedDescriptor::StaticCard { headline, cta_url, .. } => match cta_url {
            Some(url) => format!("{headline}: {url}"),
            None => headline.clone(),
        },
        EmbedDescriptor::InvalidLink { reason } => format!("invalid link ({reason})"),
    }
}
