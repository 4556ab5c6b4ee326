use anyhow::Result;
use datascope_client::DataService;
use datascope_types::ContainerPath;
use std::io::{BufRead, Write};
use std::sync::Arc;

pub async fn handle(
    service: &Arc<dyn DataService>,
    path: &str,
    entity: &str,
    yes: bool,
) -> Result<()> {
    let path = ContainerPath::parse_strict(path)?;

    if !yes && !confirm(&path, entity)? {
        println!("Aborted.");
        return Ok(());
    }

    service.delete_entity(&path, entity).await?;
    println!("Deleted '{}' from /{}", entity, path.join());
    Ok(())
}

fn confirm(path: &ContainerPath, entity: &str) -> Result<bool> {
    print!("Delete '{}' from /{}? [y/N] ", entity, path.join());
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
