use crate::args::Cli;
use anyhow::{Context as _, Result, bail};
use datascope_client::{DataService, HttpDataService};
use datascope_runtime::Config;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolved execution context for one invocation: the config and the
/// service connection the command targets.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config_path = match &cli.config {
            Some(path) => PathBuf::from(path),
            None => Config::default_path()?,
        };
        let config = Config::load_from(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?;

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Build the service connection from flags and config. Explicit
    /// `--endpoint`/`--service-id` win; otherwise `--service <name>`
    /// looks up a config entry.
    pub fn connect(&self, cli: &Cli) -> Result<Arc<dyn DataService>> {
        if let (Some(endpoint), Some(service_id)) = (&cli.endpoint, cli.service_id) {
            return Ok(Arc::new(HttpDataService::new(endpoint, service_id)));
        }

        if let Some(name) = &cli.service {
            let Some(entry) = self.config.service(name) else {
                bail!(
                    "unknown service '{}'; add it with 'datascope service set {} --endpoint <URL> --service-id <ID>'",
                    name,
                    name
                );
            };
            return Ok(Arc::new(HttpDataService::new(
                &entry.endpoint,
                entry.service_id,
            )));
        }

        if let Some(endpoint) = cli.endpoint.as_deref().or(self.config.endpoint.as_deref()) {
            let Some(service_id) = cli.service_id else {
                bail!("--service-id is required when connecting by endpoint");
            };
            return Ok(Arc::new(HttpDataService::new(endpoint, service_id)));
        }

        bail!("no service selected; pass --endpoint and --service-id, or --service <name>")
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }
}
