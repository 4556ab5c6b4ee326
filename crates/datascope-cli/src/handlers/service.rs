use crate::args::OutputFormat;
use crate::context::Context;
use anyhow::Result;
use datascope_runtime::ServiceEntry;
use owo_colors::OwoColorize;

pub fn list(context: &Context, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&context.config.services)?);
        return Ok(());
    }

    if context.config.services.is_empty() {
        println!("No services configured.");
        println!("  datascope service set <name> --endpoint <URL> --service-id <ID>");
        return Ok(());
    }

    let mut names: Vec<&String> = context.config.services.keys().collect();
    names.sort();
    for name in names {
        let entry = &context.config.services[name];
        println!(
            "{:<20} {}  (service {})",
            name.bold(),
            entry.endpoint,
            entry.service_id
        );
    }
    Ok(())
}

pub fn set(context: &Context, name: &str, endpoint: &str, service_id: i64) -> Result<()> {
    let mut config = context.config.clone();
    config.set_service(
        name.to_string(),
        ServiceEntry {
            endpoint: endpoint.to_string(),
            service_id,
        },
    );
    config.save_to(&context.config_path)?;
    println!("Saved service '{}' -> {}", name, endpoint);
    Ok(())
}
