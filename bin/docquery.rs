use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use docquery::{Client, ClientConfig, Document, TableDefinition};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "docquery")]
#[command(
    about = "Query and manage documents in an Elasticsearch-compatible engine",
    long_about = None
)]
struct Args {
    /// Comma-separated list of engine hosts
    #[arg(long, env = "DOCQUERY_HOSTS", value_delimiter = ',', default_value = "127.0.0.1:9200")]
    hosts: Vec<String>,

    /// Basic auth user
    #[arg(long, env = "DOCQUERY_USERNAME")]
    username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "DOCQUERY_PASSWORD")]
    password: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "DOCQUERY_TIMEOUT_MS", default_value = "30000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a table from a JSON object of column mappings
    CreateTable { table: String, columns: String },

    /// Show mappings of the given tables (all tables when none given)
    Describe { tables: Vec<String> },

    /// Insert a JSON document; an "id" key becomes the document id
    Insert { table: String, document: String },

    /// Fetch a document by id
    Get { table: String, id: String },

    /// Delete a document by id
    Delete { table: String, id: String },

    /// Search a table
    Search {
        table: String,

        /// Must-match condition, field=value (repeatable)
        #[arg(long = "where", value_parser = parse_pair)]
        must: Vec<(String, Value)>,

        /// OR-joined condition, field=value (repeatable)
        #[arg(long = "or", value_parser = parse_pair)]
        should: Vec<(String, Value)>,

        /// Exact filter, field=value (repeatable)
        #[arg(long = "filter", value_parser = parse_pair)]
        filter: Vec<(String, Value)>,

        #[arg(long, default_value = "1")]
        page: u64,

        #[arg(long, default_value = "50")]
        size: u64,
    },
}

/// Parse `field=value`; the value is JSON when it parses, a string otherwise
fn parse_pair(raw: &str) -> std::result::Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))?;
    Ok((field.to_string(), parse_value(value)))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::new(args.hosts).with_timeout(args.timeout_ms);
    if let (Some(user), Some(pass)) = (args.username, args.password) {
        config = config.with_basic_auth(user, pass);
    }
    info!("docquery v{} against {:?}", docquery::VERSION, config.hosts);

    let mut client = Client::connect(&config)?;

    match args.command {
        Command::CreateTable { table, columns } => {
            let properties = match serde_json::from_str::<Value>(&columns)
                .context("columns must be JSON")?
            {
                Value::Object(map) => map,
                _ => return Err(anyhow!("columns must be a JSON object")),
            };
            let ack = client
                .create_table(&table, &TableDefinition::from_properties(properties))
                .await?;
            print_json(&ack)?;
        }
        Command::Describe { tables } => {
            print_json(&client.get_table_info(&tables).await?)?;
        }
        Command::Insert { table, document } => {
            let document = Document::try_from(
                serde_json::from_str::<Value>(&document).context("document must be JSON")?,
            )?;
            let result = client.table(table)?.insert(document).await?;
            print_json(&result)?;
        }
        Command::Get { table, id } => {
            print_json(&client.table(table)?.find_by_id(&id).await?)?;
        }
        Command::Delete { table, id } => {
            print_json(&client.table(table)?.delete_by_id(&id).await?)?;
        }
        Command::Search {
            table,
            must,
            should,
            filter,
            page,
            size,
        } => {
            client.table(table)?.page(page, size)?;
            for (field, value) in must {
                client.where_(field, value)?;
            }
            for (field, value) in should {
                client.where_or(field, value)?;
            }
            for (field, value) in filter {
                client.filter(field, value)?;
            }
            print_json(&client.get().await?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("age=30").unwrap(), ("age".to_string(), json!(30)));
        assert_eq!(
            parse_pair("name=alice").unwrap(),
            ("name".to_string(), json!("alice"))
        );
        assert_eq!(
            parse_pair("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".to_string(), json!(["a", "b"]))
        );
        assert_eq!(
            parse_pair("expr=a=b").unwrap(),
            ("expr".to_string(), json!("a=b"))
        );
        assert!(parse_pair("novalue").is_err());
    }
}
