use crate::commands::load_page;
use crate::config::Config;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use pagecraft_blocks::UuidIds;
use pagecraft_client::{Builder, PageApi};
use std::path::Path;

#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// Page owner (username)
    #[arg(long)]
    pub owner: String,

    #[command(subcommand)]
    pub action: VersionAction,
}

#[derive(Debug, Subcommand)]
pub enum VersionAction {
    /// List saved versions, most recently updated first
    List,

    /// Snapshot the live page under a name
    Save {
        name: String,

        /// Overwrite this snapshot instead of matching by name
        #[arg(long)]
        id: Option<String>,
    },

    /// Overwrite the live page with a snapshot
    Apply { id: String },

    Delete { id: String },

    /// Replace the live page's content with a local page file
    Push { page: String },
}

pub fn versions(args: VersionsArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut builder = Builder::new(config.http_api()?, config.registry()?, config.entitlement(), config.tier);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(&mut builder, &args.owner, args.action, cwd))
}

/// Run one action against any backend
pub async fn run<A: PageApi>(builder: &mut Builder<A>, owner: &str, action: VersionAction, cwd: &Path) -> Result<()> {
    // Read local input before touching the network
    let pushed = match &action {
        VersionAction::Push { page } => Some(load_page(&cwd.join(page), &mut UuidIds)?),
        _ => None,
    };

    builder.load(owner).await?;

    match action {
        VersionAction::List => {
            let versions = builder.versions().await?;
            if versions.is_empty() {
                println!("{}", "No saved versions".dimmed());
            }
            for version in versions {
                println!(
                    "  {}  {}  {}",
                    version.id.bright_white(),
                    version.name,
                    version.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                );
            }
        }
        VersionAction::Save { name, id } => {
            let saved = builder.save_version(&name, id.as_deref()).await?;
            println!("  {} Saved \"{}\" ({})", "✓".green(), saved.name, saved.id);
        }
        VersionAction::Apply { id } => {
            builder.apply_version(&id).await?;
            let blocks = builder.session()?.document.tree().len();
            println!("  {} Applied {} ({} blocks)", "✓".green(), id, blocks);
        }
        VersionAction::Delete { id } => {
            builder.delete_version(&id).await?;
            println!("  {} Deleted {}", "✓".green(), id);
        }
        VersionAction::Push { .. } => {
            if let Some(page) = pushed {
                builder.session_mut()?.document.replace_content(page.content);
                builder.save_changes().await?;
                println!("  {} Pushed page for {}", "✓".green(), owner);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_blocks::{BlockRegistry, LandingPage};
    use pagecraft_client::{MemoryPageApi, Tier};
    use pagecraft_editor::Entitlement;

    fn builder(api: &MemoryPageApi) -> Builder<MemoryPageApi> {
        Builder::new(api.clone(), BlockRegistry::new(), Entitlement::Free, Tier::Base)
    }

    #[tokio::test]
    async fn test_push_then_snapshot_and_apply() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("page.json"),
            r#"{ "id": "ignored", "username": "ada", "content_blocks": [{ "id": "h", "type": "heading", "text": "Hi" }] }"#,
        )
        .unwrap();

        let api = MemoryPageApi::new().with_page(LandingPage::new("p1", "ada"));

        let push = VersionAction::Push { page: "page.json".into() };
        run(&mut builder(&api), "ada", push, dir.path()).await.unwrap();
        let live = api.page("ada").unwrap();
        assert_eq!(live.id, "p1");
        assert_eq!(live.blocks().len(), 1);

        let save = VersionAction::Save { name: "Launch".into(), id: None };
        run(&mut builder(&api), "ada", save, dir.path()).await.unwrap();
        let snapshot = api.snapshots("p1").remove(0);
        assert_eq!(snapshot.name, "Launch");

        // empty the live page, then restore it from the snapshot
        api.insert_page(LandingPage::new("p1", "ada"));
        let apply = VersionAction::Apply { id: snapshot.id.clone() };
        run(&mut builder(&api), "ada", apply, dir.path()).await.unwrap();
        assert_eq!(api.page("ada").unwrap().blocks().len(), 1);

        let delete = VersionAction::Delete { id: snapshot.id };
        run(&mut builder(&api), "ada", delete, dir.path()).await.unwrap();
        assert!(api.snapshots("p1").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_owner_fails() {
        let dir = tempfile::tempdir().unwrap();
        let api = MemoryPageApi::new();
        assert!(run(&mut builder(&api), "nobody", VersionAction::List, dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_push_file_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let api = MemoryPageApi::new().with_page(LandingPage::new("p1", "ada"));
        let push = VersionAction::Push { page: "missing.json".into() };
        assert!(run(&mut builder(&api), "ada", push, dir.path()).await.is_err());
        assert_eq!(api.put_count(), 0);
    }
}
