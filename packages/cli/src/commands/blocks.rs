use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_blocks::{schema, BlockKind, BlockRegistry, FieldKind};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug, Args)]
pub struct BlocksArgs {
    /// Show the field schema of one kind (wire name, e.g. `stripe_checkout`)
    pub kind: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KindSummary {
    kind: BlockKind,
    label: &'static str,
    limit: Option<usize>,
    pro_only: bool,
    fields: Vec<&'static str>,
}

pub fn blocks(args: BlocksArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry()?;

    match args.kind {
        Some(name) => {
            let kind: BlockKind = name.parse()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&kind_fields(kind))?);
            } else {
                print_fields(kind);
            }
        }
        None if args.json => println!("{}", serde_json::to_string_pretty(&summaries(&registry))?),
        None => print_summaries(&registry),
    }
    Ok(())
}

fn summaries(registry: &BlockRegistry) -> Vec<KindSummary> {
    BlockKind::ALL
        .into_iter()
        .map(|kind| KindSummary {
            kind,
            label: kind.label(),
            limit: registry.limit(kind),
            pro_only: registry.is_pro_only(kind),
            fields: schema(kind).iter().map(|f| f.key).collect(),
        })
        .collect()
}

fn kind_fields(kind: BlockKind) -> Value {
    let fields: Vec<Value> = schema(kind)
        .iter()
        .map(|f| json!({ "key": f.key, "label": f.label, "input": f.kind }))
        .collect();
    json!({ "kind": kind, "fields": fields })
}

fn print_summaries(registry: &BlockRegistry) {
    println!("{}", "📦 Block kinds".bright_blue().bold());
    for summary in summaries(registry) {
        let limit = summary
            .limit
            .map(|n| format!("max {}", n))
            .unwrap_or_else(|| "unlimited".to_string());
        let pro = if summary.pro_only { " PRO".yellow().to_string() } else { String::new() };
        println!(
            "  {:<16} {:<20} {}{}",
            summary.kind.as_str().bright_white(),
            summary.label,
            limit.dimmed(),
            pro
        );
    }
}

fn print_fields(kind: BlockKind) {
    println!("{} {}", "📦".bright_blue(), kind.label().bright_white().bold());
    for field in schema(kind) {
        println!("  {:<16} {:<20} {}", field.key, field.label, describe(field.kind).dimmed());
    }
}

fn describe(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => "text".into(),
        FieldKind::LongText => "long text".into(),
        FieldKind::Url => "url".into(),
        FieldKind::Color => "color".into(),
        FieldKind::Number => "number".into(),
        FieldKind::Toggle => "toggle".into(),
        FieldKind::DateTime => "date-time".into(),
        FieldKind::Select(options) => format!("one of {}", options.join(" | ")),
        FieldKind::FaqItems => "questions [{q, a, open}]".into(),
        FieldKind::LinkList => "links [{platform, url}]".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries_follow_registry() {
        let registry = BlockRegistry::builder()
            .limit(BlockKind::Heading, Some(2))
            .build()
            .unwrap();
        let rows = summaries(&registry);
        assert_eq!(rows.len(), BlockKind::ALL.len());

        let heading = rows.iter().find(|r| r.kind == BlockKind::Heading).unwrap();
        assert_eq!(heading.limit, Some(2));
        assert_eq!(heading.fields, vec!["text", "level", "alignment"]);

        let audio = rows.iter().find(|r| r.kind == BlockKind::AudioPlayer).unwrap();
        assert_eq!(audio.limit, Some(1));
        assert!(audio.pro_only);
    }

    #[test]
    fn test_select_description_lists_options() {
        let level = schema(BlockKind::Heading).iter().find(|f| f.key == "level").unwrap();
        assert_eq!(describe(level.kind), "one of h1 | h2 | h3");
    }

    #[test]
    fn test_kind_fields_json() {
        let value = kind_fields(BlockKind::Divider);
        assert_eq!(value["kind"], json!("divider"));
        assert_eq!(value["fields"][2]["input"], json!({ "kind": "number" }));
    }
}
