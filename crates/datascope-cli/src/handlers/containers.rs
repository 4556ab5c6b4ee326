use crate::args::OutputFormat;
use anyhow::Result;
use datascope_client::DataService;
use datascope_types::{ContainerPath, EntityCountHint};
use owo_colors::OwoColorize;
use std::sync::Arc;

pub async fn handle(
    service: &Arc<dyn DataService>,
    path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let path = match path {
        Some(path) => ContainerPath::parse_strict(path)?,
        None => ContainerPath::root(),
    };
    let containers = service.list_containers(&path).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&containers)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["name", "type", "containers", "entities", "count"])?;
            for c in &containers {
                writer.write_record([
                    c.name.as_str(),
                    c.container_type.as_str(),
                    flag(c.can_list_containers),
                    flag(c.can_list_entities),
                    hint_label(c.entity_count_hint),
                ])?;
            }
            writer.flush()?;
        }
        OutputFormat::Plain => {
            if containers.is_empty() {
                println!("(no containers at /{})", path.join());
                return Ok(());
            }
            for c in &containers {
                let mut notes = Vec::new();
                if c.can_list_containers == Some(false) && c.can_list_entities == Some(true) {
                    notes.push("entities only");
                }
                if c.entity_count_hint == EntityCountHint::Large {
                    notes.push("large");
                }
                let suffix = if notes.is_empty() {
                    String::new()
                } else {
                    format!("  ({})", notes.join(", "))
                };
                println!(
                    "{:<30} {}{}",
                    c.name,
                    c.container_type.dimmed(),
                    suffix.dimmed()
                );
            }
        }
    }

    Ok(())
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "inherit",
    }
}

fn hint_label(hint: EntityCountHint) -> &'static str {
    match hint {
        EntityCountHint::Small => "small",
        EntityCountHint::Large => "large",
        EntityCountHint::Unknown => "unknown",
    }
}
