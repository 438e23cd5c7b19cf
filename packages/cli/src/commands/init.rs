use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Owner username for the sample page
    #[arg(short, long, default_value = "me")]
    pub username: String,

    /// Backend base URL written to the config
    #[arg(long)]
    pub api_url: Option<String>,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = Config::path(cwd);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing landing page project...".bright_blue().bold());

    let config = Config {
        api_base_url: args.api_url.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let page_path = cwd.join("page.json");
    if !page_path.exists() || args.force {
        fs::write(&page_path, serde_json::to_string_pretty(&sample_page(&args.username))?)?;
        println!("  {} Created page.json", "✓".green());
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit page.json (or run: pagecraft apply page.json edits.json)");
    println!("  2. Run: pagecraft render");
    println!("  3. Check output in dist/");

    Ok(())
}

/// Starter page; every block id is fixed so the file diffs cleanly
fn sample_page(username: &str) -> Value {
    json!({
        "id": "local",
        "username": username,
        "backgroundTheme": "light",
        "content_blocks": [
            {
                "id": "welcome-heading",
                "type": "heading",
                "text": format!("Hi, I'm {}", username),
                "level": "h1",
                "alignment": "center"
            },
            {
                "id": "welcome-text",
                "type": "paragraph",
                "text": "Tell visitors what you offer.",
                "alignment": "center"
            },
            {
                "id": "welcome-links",
                "type": "social_links",
                "links": [],
                "alignment": "center",
                "iconColor": "#111827"
            }
        ]
    })
}
