use crate::commands::load_page;
use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_blocks::UuidIds;
use pagecraft_renderer::{page_to_html, HtmlOptions, MediaArbiter};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page JSON file or directory of page files
    #[arg(default_value = ".")]
    pub path: String,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    pub out_dir: String,

    /// Compact HTML (overrides config)
    #[arg(long)]
    pub compact: bool,
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let input: PathBuf = cwd.join(&args.path).components().collect();
    let out_dir: PathBuf = cwd.join(&args.out_dir).components().collect();

    let options = if args.compact {
        HtmlOptions::compact()
    } else {
        config.html_options()
    };

    let pages = find_page_files(&input, &out_dir)?;
    if pages.is_empty() {
        println!("{}", "⚠️  No page files found".yellow());
        return Ok(());
    }

    println!("{}", "🔨 Rendering landing pages...".bright_blue().bold());

    let mut success_count = 0;
    let mut error_count = 0;

    for page_file in &pages {
        let relative_path = page_file.strip_prefix(cwd).unwrap_or(page_file);
        match render_file(page_file, &args, &out_dir, options.clone()) {
            Ok(output_path) => {
                success_count += 1;
                println!("  {} {} → {}", "✓".green(), relative_path.display(), output_path);
            }
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), relative_path.display(), format!("{:#}", e).red());
            }
        }
    }

    println!();
    if error_count == 0 {
        println!("{} Rendered {} pages successfully", "✅".green(), success_count);
    } else {
        println!(
            "{} Rendered {} pages, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
    }

    Ok(())
}

/// `*.json` files under `input`, skipping the config file and the output directory
fn find_page_files(input: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.exists() {
        return Err(anyhow!("Path does not exist: {}", input.display()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.path() != out_dir)
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension().and_then(|s| s.to_str()) == Some("json")
                && path.file_name().and_then(|s| s.to_str()) != Some(DEFAULT_CONFIG_NAME)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn render_file(page_file: &Path, args: &RenderArgs, out_dir: &Path, options: HtmlOptions) -> Result<String> {
    let page = load_page(page_file, &mut UuidIds)?;
    let html = page_to_html(&page, MediaArbiter::new(), options);

    if args.stdout {
        println!("{}", html);
        return Ok("stdout".to_string());
    }

    let stem = page_file
        .file_stem()
        .ok_or_else(|| anyhow!("Not a file: {}", page_file.display()))?;
    let output_file = out_dir.join(stem).with_extension("html");

    fs::create_dir_all(out_dir)?;
    fs::write(&output_file, html)?;

    Ok(output_file.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "id": "p1",
        "username": "ada",
        "content_blocks": [{ "id": "h", "type": "heading", "text": "Hello there" }]
    }"#;

    #[test]
    fn test_renders_every_page_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/ada.json"), PAGE).unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "render": { "pretty": false } }"#).unwrap();

        let args = RenderArgs {
            path: ".".into(),
            stdout: false,
            out_dir: "dist".into(),
            compact: false,
        };
        render(args, dir.path()).unwrap();

        let html = fs::read_to_string(dir.path().join("dist/ada.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\">"));
        assert!(html.contains(">Hello there</h2>"));
    }

    #[test]
    fn test_skips_config_and_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.json"), PAGE).unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/old.json"), "{}").unwrap();

        let files = find_page_files(dir.path(), &dir.path().join("dist")).unwrap();
        assert_eq!(files, vec![dir.path().join("page.json")]);
    }
}
