use crate::tui;
use anyhow::Result;
use datascope_client::DataService;
use datascope_engine::Location;
use datascope_runtime::BrowserSession;
use std::sync::Arc;

pub async fn handle(
    service: Arc<dyn DataService>,
    location: Option<&str>,
    page_size: usize,
) -> Result<()> {
    let mut session = BrowserSession::new(service, page_size);
    session.init().await;

    if let Some(query) = location {
        session.navigate_to(Location::parse(query)).await;
    }

    tui::run(session).await
}
