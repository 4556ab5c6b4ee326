use anyhow::Result;
use datascope_client::DataService;
use datascope_types::ContainerPath;
use std::io::Write;
use std::sync::Arc;

pub async fn handle(
    service: &Arc<dyn DataService>,
    path: &str,
    entity: &str,
    output: Option<&str>,
) -> Result<()> {
    let path = ContainerPath::parse_strict(path)?;
    let (bytes, content_type) = service.download(&path, entity).await?;

    match output {
        Some(file) => {
            std::fs::write(file, &bytes)?;
            let kind = content_type.as_deref().unwrap_or("unknown type");
            eprintln!("Wrote {} bytes ({}) to {}", bytes.len(), kind, file);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
