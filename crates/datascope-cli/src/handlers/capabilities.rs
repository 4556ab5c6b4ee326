use crate::args::OutputFormat;
use anyhow::Result;
use datascope_client::DataService;
use datascope_types::FilterMode;
use owo_colors::OwoColorize;
use std::sync::Arc;

pub async fn handle(service: &Arc<dyn DataService>, format: OutputFormat) -> Result<()> {
    let caps = service.capabilities().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&caps)?);
        return Ok(());
    }

    println!("{}: {}", "Service type".bold(), caps.service_type);
    println!("{}: {}", "Capabilities".bold(), caps.capabilities.join(", "));
    let filter = match caps.filter_mode() {
        FilterMode::Text => "free text",
        FilterMode::Structured => "structured (schema-driven)",
        FilterMode::None => "not supported",
    };
    println!("{}: {}", "Filtering".bold(), filter);

    println!("\n{}", "Hierarchy".bold());
    for level in &caps.hierarchy {
        let lists = match (level.can_list_containers, level.can_list_entities) {
            (true, true) => "containers + entities",
            (true, false) => "containers",
            (false, true) => "entities",
            (false, false) => "nothing",
        };
        println!(
            "  level {}  {:<12} holds {:<10} lists {}",
            level.level, level.name, level.container_type, lists
        );
    }

    Ok(())
}
