use crate::args::{Cli, Commands, ServiceCommand};
use crate::context::Context;
use crate::handlers;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    let context = Context::resolve(&cli)?;

    let Some(command) = &cli.command else {
        show_guidance(&context);
        return Ok(());
    };

    // Config management needs no connection and no runtime.
    if let Commands::Service { command } = command {
        return match command {
            ServiceCommand::List => handlers::service::list(&context, cli.format),
            ServiceCommand::Set {
                name,
                endpoint,
                service_id,
            } => handlers::service::set(&context, name, endpoint, *service_id),
        };
    }

    let service = context.connect(&cli)?;
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        match command {
            Commands::Capabilities => handlers::capabilities::handle(&service, cli.format).await,

            Commands::Containers { path } => {
                handlers::containers::handle(&service, path.as_deref(), cli.format).await
            }

            Commands::Entities { path } => {
                handlers::entities::handle(&service, path, cli.format).await
            }

            Commands::Info { path, entity } => {
                handlers::info::handle(&service, path, entity, cli.format).await
            }

            Commands::Query {
                path,
                entity,
                filter,
                filter_json,
                sort,
                desc,
                page,
                page_size,
            } => {
                let request = handlers::query::Request {
                    path,
                    entity,
                    filter: filter.as_deref(),
                    filter_json: filter_json.as_deref(),
                    sort: sort.as_deref(),
                    desc: *desc,
                    page: *page,
                    page_size: (*page_size).unwrap_or(context.page_size()),
                };
                handlers::query::handle(&service, request, cli.format).await
            }

            Commands::Download {
                path,
                entity,
                output,
            } => handlers::download::handle(&service, path, entity, output.as_deref()).await,

            Commands::Delete { path, entity, yes } => {
                handlers::delete::handle(&service, path, entity, *yes).await
            }

            Commands::Browse { location } => {
                handlers::browse::handle(service.clone(), location.as_deref(), context.page_size())
                    .await
            }

            Commands::Service { .. } => unreachable!("handled above"),
        }
    })
}

fn show_guidance(context: &Context) {
    println!("datascope - Browse and query hierarchical data services\n");

    if context.config.services.is_empty() {
        println!("Get started by registering a service:");
        println!("  datascope service set mydb --endpoint http://localhost:8080 --service-id 1\n");
        println!("Then explore it:");
        println!("  datascope --service mydb capabilities");
        println!("  datascope --service mydb containers");
        println!("  datascope --service mydb browse\n");
    } else {
        println!("Quick commands:");
        println!("  datascope service list                       # Configured services");
        println!("  datascope --service <name> containers        # Top-level containers");
        println!("  datascope --service <name> query <path> <entity>");
        println!("  datascope --service <name> browse            # Interactive TUI\n");
    }

    println!("For more commands:");
    println!("  datascope --help");
}
