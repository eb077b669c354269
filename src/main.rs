//! rolegate command line
//!
//! Inspects the configured role policy and runs operations through the gate
//! against an in-memory store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rolegate::{
    Permission,
    access_control::{
        Action, PermissionResolver, Possession, RoleSet, filter_object, invalid_attributes,
    },
    config::{AppConfig, LogFormat, load_config},
    error::PermissionDeniedError,
    operations::{Gate, OperationRegistry, definitions},
    store::{MemoryStore, Record},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// rolegate - role and attribute based access control for resource operations
#[derive(Parser, Debug)]
#[command(name = "rolegate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ROLEGATE_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "ROLEGATE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Permission query shared by `permission` and `filter`
#[derive(clap::Args, Debug)]
struct Query {
    /// Caller roles, comma separated
    #[arg(long, default_value = "")]
    roles: String,

    /// Resource type (e.g. Event)
    #[arg(long)]
    resource: String,

    /// Action (create, read, update, delete)
    #[arg(long, value_parser = parse_action)]
    action: Action,

    /// Possession (own, any)
    #[arg(long, value_parser = parse_possession, default_value = "any")]
    possession: Possession,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and print the declared roles
    Check,

    /// Resolve a permission and print it as JSON
    Permission {
        #[command(flatten)]
        query: Query,
    },

    /// Filter a JSON object through a resolved permission; fails if not granted
    Filter {
        #[command(flatten)]
        query: Query,

        /// JSON object to filter
        #[arg(long)]
        object: String,
    },

    /// List every operation and the policy it requires
    Operations,

    /// Run an operation against an in-memory store
    Call {
        /// Operation name (e.g. createEvent)
        operation: String,

        /// Caller roles, comma separated
        #[arg(long, default_value = "")]
        roles: String,

        /// Operation arguments as JSON
        #[arg(long, default_value = "{}")]
        args: String,

        /// JSON fixture file used to seed the store (see demos/fixtures.json)
        #[arg(long)]
        fixtures: Option<String>,
    },
}

fn parse_action(value: &str) -> Result<Action, String> {
    Action::try_parse(value).ok_or_else(|| format!("unknown action: {}", value))
}

fn parse_possession(value: &str) -> Result<Possession, String> {
    Possession::try_parse(value).ok_or_else(|| format!("unknown possession: {}", value))
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Filter report for a granted permission; a denial is returned before filtering
fn filter_report(permission: &Permission, object: &Record) -> Result<Value, PermissionDeniedError> {
    let permission = permission.require()?;
    Ok(json!({
        "granted": true,
        "filtered": filter_object(permission, object),
        "invalid_attributes": invalid_attributes(permission, object),
    }))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config, args.log_level.as_deref());

    info!(version = env!("CARGO_PKG_VERSION"), "Starting rolegate");

    let schema = Arc::new(definitions::schema());
    let resolver = PermissionResolver::new(&config.policy)
        .inspect_err(|e| error!(error = %e, "Failed to compile role policy"))?;

    let findings = resolver.hierarchy().validate_against(&schema);
    if findings > 0 {
        warn!(findings, "Policy references undeclared resources or attributes");
    }

    let mut registry = OperationRegistry::new();
    definitions::register_all_operations(&mut registry);

    match args.command {
        Command::Check => {
            let hierarchy = resolver.hierarchy();
            print_json(&json!({
                "roles": hierarchy.role_names(),
                "any_implies_own": hierarchy.any_implies_own(),
                "resources": schema.resources().map(|r| r.name).collect::<Vec<_>>(),
                "operations": registry.len(),
                "findings": findings,
            }))?;
        }
        Command::Permission { query } => {
            let permission = resolver.resolve(
                &RoleSet::parse(&query.roles),
                &query.resource,
                query.action,
                query.possession,
            );
            print_json(&permission)?;
        }
        Command::Filter { query, object } => {
            let object: Record =
                serde_json::from_str(&object).context("--object must be a JSON object")?;
            let permission = resolver.resolve(
                &RoleSet::parse(&query.roles),
                &query.resource,
                query.action,
                query.possession,
            );
            let report = filter_report(&permission, &object)
                .inspect_err(|e| warn!(error = %e, "Filter rejected"))?;
            print_json(&report)?;
        }
        Command::Operations => {
            print_json(&registry.operations().collect::<Vec<_>>())?;
        }
        Command::Call {
            operation,
            roles,
            args: call_args,
            fixtures,
        } => {
            let call_args: Value =
                serde_json::from_str(&call_args).context("--args must be valid JSON")?;

            let store = match fixtures {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read fixtures: {}", path))?;
                    let fixtures: Value = serde_json::from_str(&content)
                        .with_context(|| format!("Invalid fixture JSON: {}", path))?;
                    MemoryStore::from_fixtures(schema.clone(), &fixtures)?
                }
                None => MemoryStore::new(schema.clone()),
            };

            let gate = Gate::new(resolver, Arc::new(store), schema);
            let result = registry
                .execute(&gate, &operation, &RoleSet::parse(&roles), call_args)
                .await
                .inspect_err(|e| error!(error = %e, operation = %operation, "Operation failed"))?;
            print_json(&result)?;
        }
    }

    Ok(())
}
