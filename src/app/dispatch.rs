use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use synthrun::Config;
use synthrun::runtime::Engine;
use synthrun::sandbox::{HttpMethod, RequestOptions, RunOptions};
use synthrun::workflow::WorkflowDeclaration;
use tracing::info;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Split a `name:value` header argument.
fn parse_header(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("header '{raw}' must look like name:value");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("header '{raw}' has an empty name");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let engine = Engine::from_config(config)?;
    let ctx = engine.context();
    info!(invocation = %ctx.invocation_id(), "synthrun starting");

    match cli.command {
        Commands::CheckUrl { url } => print_json(&ctx.http().validate(&url).await),

        Commands::Fetch {
            url,
            method,
            headers,
            data,
        } => {
            let method = HttpMethod::from_str(&method)
                .map_err(|_| anyhow::anyhow!("unsupported method '{method}'"))?;
            let mut options = RequestOptions::new();
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                options = options.header(name, value);
            }
            if let Some(body) = data {
                options = options.text(body);
            }
            print_json(&ctx.http().request(method, &url, &options).await)
        }

        Commands::Exec {
            timeout,
            command,
            args,
        } => {
            let mut options = RunOptions::new();
            if let Some(secs) = timeout {
                options = options.timeout(Duration::from_secs(secs));
            }
            print_json(&ctx.process().run(&command, args.as_slice(), &options).await)
        }

        Commands::Workflow { file } => {
            let executor = WorkflowDeclaration::load(&file)?
                .into_executor()
                .with_context(|| format!("invalid workflow {}", file.display()))?;
            let results = executor.execute(&ctx).await?;
            print_json(&results)
        }

        Commands::Tools => print_json(&ctx.tools().specs()),
    }
}
