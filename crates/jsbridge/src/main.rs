//! JS Bridge CLI
//!
//! Runs the bridge's host functions against a single scope: globals are set
//! first, then scripts are evaluated, then globals are read back. Each result
//! is printed as one JSON line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use jsbridge::{BridgeConfig, CallArgs, FunctionRegistry, Scope, Value};

/// Run JavaScript against a host scope
#[derive(Parser, Debug)]
#[command(name = "jsbridge")]
#[command(about = "Run JavaScript against a host scope", long_about = None)]
struct Args {
    /// Path to a jsbridge.toml configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache key of the VM to run against
    #[arg(short, long)]
    key: Option<String>,

    /// Set a global before any script runs
    #[arg(long = "set", value_name = "NAME=JSON", value_parser = parse_assignment)]
    sets: Vec<(String, Value)>,

    /// Script file to evaluate after the inline scripts
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Read a global after all scripts have run
    #[arg(long = "get", value_name = "NAME")]
    gets: Vec<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// List the available functions and exit
    #[arg(long)]
    list: bool,

    /// Inline script sources
    scripts: Vec<String>,
}

fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, json) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=JSON, got `{}`", raw))?;
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("invalid JSON for `{}`: {}", name, e))?;
    Ok((name.to_string(), value.into()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(args.log_json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!args.log_json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args, config))
}

async fn run(args: Args, config: BridgeConfig) -> Result<()> {
    let functions = FunctionRegistry::with_builtins();

    if args.list {
        for function in functions.list() {
            println!("{} - {}", function.name, function.doc);
            for arg in function.args {
                let optional = if arg.required { "" } else { " (optional)" };
                println!("    {}{}: {}", arg.name, optional, arg.doc);
            }
        }
        return Ok(());
    }

    let scope = Scope::new(config.vm);
    info!(scope = %scope.id(), "starting jsbridge v{}", env!("CARGO_PKG_VERSION"));

    let key = args.key.map(Value::from);

    for (name, value) in args.sets {
        call(&functions, &scope, "js_set", [("var", name.into()), ("value", value)], &key)?;
    }

    let mut sources = args.scripts;
    for path in &args.files {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        sources.push(source);
    }

    for source in sources {
        let result = call(&functions, &scope, "js", [("js", source.into())], &key)?;
        println!("{}", serde_json::Value::from(result));
    }

    for name in args.gets {
        let result = call(&functions, &scope, "js_get", [("var", name.into())], &key)?;
        println!("{}", serde_json::Value::from(result));
    }

    scope.close().await;
    Ok(())
}

fn call<const N: usize>(
    functions: &FunctionRegistry,
    scope: &Scope,
    name: &str,
    pairs: [(&str, Value); N],
    key: &Option<Value>,
) -> Result<Value> {
    let mut call_args: CallArgs = pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect();
    if let Some(key) = key {
        call_args.insert("key".to_string(), key.clone());
    }

    functions
        .call(scope, name, &call_args)
        .with_context(|| format!("function `{}` is not registered", name))
}
