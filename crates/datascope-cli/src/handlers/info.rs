use crate::args::OutputFormat;
use anyhow::Result;
use datascope_client::DataService;
use datascope_types::ContainerPath;
use owo_colors::OwoColorize;
use std::sync::Arc;

pub async fn handle(
    service: &Arc<dyn DataService>,
    path: &str,
    entity: &str,
    format: OutputFormat,
) -> Result<()> {
    let path = ContainerPath::parse_strict(path)?;
    let info = service.entity_info(&path, entity).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}: {}", "Name".bold(), info.name);
    println!("{}: {}", "Type".bold(), info.entity_type);
    if let Some(rows) = info.row_count {
        println!("{}: {}", "Rows".bold(), rows);
    }
    if let Some(size) = info.size_bytes {
        println!("{}: {}", "Size".bold(), format_size(size));
    }
    if info.is_downloadable() {
        println!("{}: yes", "Downloadable".bold());
    }
    if let Some(metadata) = &info.metadata {
        println!("{}: {}", "Metadata".bold(), metadata);
    }

    if !info.fields.is_empty() {
        println!("\n{}", "Fields".bold());
        for field in &info.fields {
            let nullable = if field.nullable { "" } else { "  not null" };
            println!("  {:<30} {}{}", field.name, field.field_type, nullable);
        }
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;
    match bytes {
        b if b >= GIB => format!("{:.1} GiB", b as f64 / GIB as f64),
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{} B", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }
}
