use crate::args::OutputFormat;
use crate::output;
use anyhow::{Result, bail};
use datascope_client::DataService;
use datascope_types::{ContainerPath, FilterValue, QueryOptions, SortOrder};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Request<'a> {
    pub path: &'a str,
    pub entity: &'a str,
    pub filter: Option<&'a str>,
    pub filter_json: Option<&'a str>,
    pub sort: Option<&'a str>,
    pub desc: bool,
    pub page: usize,
    pub page_size: usize,
}

pub async fn handle(
    service: &Arc<dyn DataService>,
    request: Request<'_>,
    format: OutputFormat,
) -> Result<()> {
    if request.page == 0 {
        bail!("--page is 1-based");
    }

    let filter = parse_filter(request.filter, request.filter_json)?;
    let options = QueryOptions {
        limit: request.page_size,
        offset: (request.page - 1) * request.page_size,
        sort_by: request.sort.map(String::from),
        sort_order: if request.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        },
        filter,
    };

    let path = ContainerPath::parse_strict(request.path)?;
    let page = service.query_data(&path, request.entity, &options).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Csv => output::write_rows_csv(&page, std::io::stdout())?,
        OutputFormat::Plain => {
            output::print_rows_plain(&page);
            output::print_page_footer(&page, request.page);
        }
    }

    Ok(())
}

fn parse_filter(
    filter: Option<&str>,
    filter_json: Option<&str>,
) -> Result<Option<FilterValue>> {
    if let Some(text) = filter {
        return Ok(Some(FilterValue::Text(text.to_string())));
    }
    if let Some(json) = filter_json {
        let map: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("--filter-json must be a JSON object: {}", e))?;
        return Ok(Some(FilterValue::Structured(map)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_text() {
        let parsed = parse_filter(Some("id > 10"), None).unwrap();
        assert_eq!(parsed, Some(FilterValue::Text("id > 10".to_string())));
    }

    #[test]
    fn test_parse_filter_json_object() {
        let parsed = parse_filter(None, Some(r#"{"status": "active"}"#)).unwrap();
        match parsed {
            Some(FilterValue::Structured(map)) => {
                assert_eq!(map.get("status"), Some(&serde_json::json!("active")));
            }
            other => panic!("unexpected filter: {:?}", other),
        }
    }

    #[test]
    fn test_parse_filter_json_rejects_non_objects() {
        assert!(parse_filter(None, Some("[1, 2]")).is_err());
    }
}
