use crate::args::OutputFormat;
use anyhow::Result;
use datascope_client::DataService;
use datascope_types::ContainerPath;
use owo_colors::OwoColorize;
use std::sync::Arc;

pub async fn handle(
    service: &Arc<dyn DataService>,
    path: &str,
    format: OutputFormat,
) -> Result<()> {
    let path = ContainerPath::parse_strict(path)?;
    let entities = service.list_entities(&path).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entities)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["name", "type"])?;
            for e in &entities {
                writer.write_record([e.name.as_str(), e.entity_type.as_str()])?;
            }
            writer.flush()?;
        }
        OutputFormat::Plain => {
            if entities.is_empty() {
                println!("(no entities at /{})", path.join());
                return Ok(());
            }
            for e in &entities {
                println!("{:<40} {}", e.name, e.entity_type.dimmed());
            }
        }
    }

    Ok(())
}
