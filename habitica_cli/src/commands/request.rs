use anyhow::{bail, Context, Result};
use clap::Args;
use habitica_api::{Habitica, Method, RequestOptions};
use serde_json::Value;

use crate::output::print_json;

#[derive(Args)]
pub struct RequestArgs {
    /// Route relative to the API root, e.g. /user or /logout
    pub route: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// JSON request body
    #[arg(short = 'd', long = "data", value_name = "JSON")]
    pub data: Option<String>,
}

pub async fn run(api: &Habitica, method: Method, args: &RequestArgs) -> Result<()> {
    let options = build_options(args)?;
    let resp: Value = api.connection().request(method, &args.route, options).await?;
    print_json(&resp);
    Ok(())
}

fn build_options(args: &RequestArgs) -> Result<Option<RequestOptions>> {
    if args.query.is_empty() && args.data.is_none() {
        return Ok(None);
    }

    let mut options = RequestOptions::new();
    for pair in &args.query {
        let (key, value) = parse_query_pair(pair)?;
        options = options.with_query(key, value);
    }
    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        options = options.with_body(body);
    }
    Ok(Some(options))
}

fn parse_query_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("Invalid query parameter '{}', expected KEY=VALUE", pair),
    }
}
