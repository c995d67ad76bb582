//! Slug RPC CLI
//!
//! Entry point for the `slug-rpc` command-line tool.

use clap::{Parser, Subcommand};
use serde_json::Value;
use slug_rpc::{
    CallError, CallResult, ClientConfig, ConfigError, ContractClient, RpcClient, RpcClientBuilder,
    ServiceContract,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit code for usage and configuration problems
const EXIT_USAGE: i32 = 1;

#[derive(Parser)]
#[command(name = "slug-rpc")]
#[command(about = "Blocking JSON-RPC client over HTTP", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a remote method and print its result as JSON
    Call {
        /// Method name
        method: String,

        /// Single parameter as a JSON value (omit for no parameters)
        params: Option<String>,

        /// Service endpoint URL (overrides the config file)
        #[arg(long, short = 'e')]
        endpoint: Option<String>,

        /// Path to client config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Check the call against this contract file before sending
        #[arg(long)]
        contract: Option<PathBuf>,

        #[arg(long)]
        connect_timeout_ms: Option<u64>,

        #[arg(long)]
        read_timeout_ms: Option<u64>,

        /// Treat non-2xx HTTP statuses as transport errors
        #[arg(long)]
        check_status: bool,

        /// Open a new connection for every call
        #[arg(long)]
        no_pool: bool,
    },

    /// List the methods of a contract file
    Methods {
        /// Contract file
        #[arg(long)]
        contract: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Flag overrides applied on top of the config file
struct Overrides {
    endpoint: Option<String>,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
    check_status: bool,
    no_pool: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Call {
            method,
            params,
            endpoint,
            config,
            contract,
            connect_timeout_ms,
            read_timeout_ms,
            check_status,
            no_pool,
        } => {
            let overrides = Overrides {
                endpoint,
                connect_timeout_ms,
                read_timeout_ms,
                check_status,
                no_pool,
            };
            run_call(&method, params.as_deref(), config, contract, overrides);
        }
        Commands::Methods { contract, json } => {
            run_methods(contract, json);
        }
    }
}

fn run_call(
    method: &str,
    params: Option<&str>,
    config_path: Option<PathBuf>,
    contract_path: Option<PathBuf>,
    overrides: Overrides,
) {
    let config = match resolve_config(config_path, overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    let params = match params.map(serde_json::from_str::<Value>).transpose() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid params JSON: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    let client = match RpcClientBuilder::from_config(&config).and_then(RpcClientBuilder::build) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    let result = match contract_path {
        Some(path) => call_with_contract(client, &path, method, params),
        None => client.invoke_value(method, params),
    };

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_USAGE);
            }
        },
        Err(e) => {
            report_error(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Config file (if any) with flags layered on top
fn resolve_config(path: Option<PathBuf>, overrides: Overrides) -> Result<ClientConfig, ConfigError> {
    let mut config = match (path, overrides.endpoint.as_deref()) {
        (Some(path), _) => ClientConfig::load(&path)?,
        (None, Some(endpoint)) => ClientConfig::new(endpoint),
        (None, None) => {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                reason: "pass --endpoint or --config".to_string(),
            })
        }
    };

    if let Some(endpoint) = overrides.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(ms) = overrides.connect_timeout_ms {
        config.connect_timeout_ms = ms;
    }
    if let Some(ms) = overrides.read_timeout_ms {
        config.read_timeout_ms = ms;
    }
    if overrides.check_status {
        config.check_status = true;
    }
    if overrides.no_pool {
        config.pooled = false;
    }

    config.validate()?;
    Ok(config)
}

fn call_with_contract(
    client: RpcClient,
    path: &Path,
    method: &str,
    params: Option<Value>,
) -> CallResult<Value> {
    let contract = ServiceContract::load(path)?;
    let args: Vec<Value> = params.into_iter().collect();
    ContractClient::new(contract, client).call(method, &args)
}

fn report_error(err: &CallError) {
    eprintln!("{}", err);

    if let Some(rpc) = err.as_rpc() {
        eprintln!("  code: {}", rpc.code);
        if let Some(ref data) = rpc.data {
            eprintln!("  data: {}", data);
        }
    }
    if let CallError::Protocol(ref e) = err {
        eprintln!("  raw response: {}", e.raw_text());
    }
}

fn run_methods(contract_path: PathBuf, json_output: bool) {
    let contract = match ServiceContract::load(&contract_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading contract: {}", e);
            process::exit(CallError::from(e).exit_code());
        }
    };

    if json_output {
        match serde_json::to_string_pretty(contract.methods()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_USAGE);
            }
        }
        return;
    }

    if contract.is_empty() {
        println!("No methods declared.");
        return;
    }

    println!("Methods ({} total):\n", contract.len());
    for method in contract.methods() {
        let params = match (&method.param_type, method.params) {
            (Some(ty), _) => ty.clone(),
            (None, 0) => String::new(),
            (None, n) => format!("{} params", n),
        };
        print!("  {}({}) -> {}", method.name, params, method.returns);
        if !method.is_callable() {
            print!("  [not callable: more than one parameter]");
        }
        println!();
    }
}
