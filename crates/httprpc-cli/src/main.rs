//! httprpc command line client
//!
//! Issues one JSON-RPC call, or one batch read from a file, and prints the
//! result as pretty JSON.

use anyhow::{Context, Result};
use clap::Parser;
use httprpc_client::{BatchRequest, Client, ClientBuilder};
use httprpc_core::models::{AuthConfig, ClientConfig};
use httprpc_core::storage::{get_config_dir, ConfigStorage};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "httprpc")]
#[command(about = "Call JSON-RPC 2.0 methods over HTTP", long_about = None)]
struct Args {
    /// Directory holding config.json
    #[arg(short, long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Endpoint URL, overrides the config file
    #[arg(short, long)]
    url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// HTTP basic auth username
    #[arg(long)]
    user: Option<String>,

    /// HTTP basic auth password
    #[arg(long, requires = "user")]
    password: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long)]
    log_level: Option<String>,

    /// JSON file with a list of [method, args...] entries
    #[arg(short, long, conflicts_with_all = ["method", "params"])]
    batch: Option<PathBuf>,

    /// Method to call
    #[arg(required_unless_present = "batch")]
    method: Option<String>,

    /// Positional arguments; parsed as JSON, otherwise sent as strings
    params: Vec<String>,
}

/// Parse a command line argument as JSON, falling back to a plain string.
fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Layer command line flags over the stored configuration.
fn apply_overrides(mut config: ClientConfig, args: &Args) -> Result<ClientConfig> {
    if let Some(ref url) = args.url {
        config.url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(ref user) = args.user {
        config.auth = Some(AuthConfig {
            username: user.clone(),
            password: args.password.clone().unwrap_or_default(),
        });
    }
    if let Some(ref level) = args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Read a JSON list of `[method, args...]` entries.
fn load_batch(path: &Path) -> Result<Vec<BatchRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    let entries: Value = serde_json::from_str(&content)
        .with_context(|| format!("Batch file {} is not valid JSON", path.display()))?;
    Ok(BatchRequest::parse_list(entries)?)
}

async fn run(client: &Client, args: &Args) -> Result<Value> {
    if let Some(ref path) = args.batch {
        let responses = client.batch(load_batch(path)?).await?;
        return Ok(Value::Array(responses));
    }

    let method = args.method.as_deref().unwrap_or_default();
    let params = args.params.iter().map(|raw| parse_param(raw)).collect();
    Ok(client.method(method)?.invoke(params).await?)
}

/// Print the outcome: result on `out`, RPC errors on `err` with a failing exit
/// code. Any other failure is returned to the caller.
fn report(outcome: Result<Value>, out: &mut impl Write, err: &mut impl Write) -> Result<ExitCode> {
    match outcome {
        Ok(value) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e
            .downcast_ref::<httprpc_client::Error>()
            .and_then(httprpc_client::Error::rpc)
        {
            Some(rpc) => {
                writeln!(err, "error {}", rpc)?;
                Ok(ExitCode::FAILURE)
            }
            None => Err(e),
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_dir = args.config_dir.clone().unwrap_or_else(get_config_dir);
    let stored = ConfigStorage::new(config_dir.clone())
        .load()
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
    let config = apply_overrides(stored, &args)?;

    setup_logging(&config.log_level);
    tracing::debug!("Using endpoint {} (timeout {}s)", config.url, config.timeout_secs);

    let client = ClientBuilder::from_config(&config)?.build()?;
    let outcome = run(&client, &args).await;
    client.close().await;

    report(outcome, &mut std::io::stdout(), &mut std::io::stderr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("httprpc").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("42"), json!(42));
        assert_eq!(parse_param("true"), json!(true));
        assert_eq!(parse_param("[1,\"a\"]"), json!([1, "a"]));
        assert_eq!(parse_param("\"quoted\""), json!("quoted"));
        assert_eq!(parse_param("bc1qabc"), json!("bc1qabc"));
    }

    #[test]
    fn test_method_and_params() {
        let args = args(&["getblockhash", "1000"]);
        assert_eq!(args.method.as_deref(), Some("getblockhash"));
        assert_eq!(args.params, vec!["1000".to_string()]);
        assert!(args.batch.is_none());
    }

    #[test]
    fn test_method_required_without_batch() {
        assert!(Args::try_parse_from(["httprpc"]).is_err());
        assert!(Args::try_parse_from(["httprpc", "--batch", "calls.json"]).is_ok());
        assert!(Args::try_parse_from(["httprpc", "--batch", "calls.json", "getinfo"]).is_err());
    }

    #[test]
    fn test_password_requires_user() {
        assert!(Args::try_parse_from(["httprpc", "--password", "pw", "getinfo"]).is_err());
    }

    fn args_for(url: &str, argv: &[&str]) -> Args {
        let mut full = vec!["--url", url];
        full.extend_from_slice(argv);
        args(&full)
    }

    fn client_for(args: &Args) -> Client {
        let config = apply_overrides(ClientConfig::default(), args).unwrap();
        ClientBuilder::from_config(&config).unwrap().build().unwrap()
    }

    fn exit_code_eq(left: ExitCode, right: ExitCode) -> bool {
        format!("{:?}", left) == format!("{:?}", right)
    }

    #[test]
    fn test_config_dir_flag() {
        let long = args(&["--config-dir", "/etc/httprpc", "getinfo"]);
        assert_eq!(long.config_dir, Some(PathBuf::from("/etc/httprpc")));

        let short = args(&["-c", "/tmp/rpc", "getinfo"]);
        assert_eq!(short.config_dir, Some(PathBuf::from("/tmp/rpc")));
    }

    #[tokio::test]
    async fn test_run_single_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::Json(json!({
                "jsonrpc": "2.0",
                "method": "getblockhash",
                "params": [1000, "tip"],
                "id": 1
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": {"hash": "00ab"}, "error": null, "id": 1}"#)
            .create_async()
            .await;

        let args = args_for(&server.url(), &["getblockhash", "1000", "tip"]);
        let client = client_for(&args);
        let outcome = run(&client, &args).await;
        mock.assert_async().await;

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(outcome, &mut out, &mut err).unwrap();
        assert!(exit_code_eq(code, ExitCode::SUCCESS));
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"hash\": \"00ab\"\n}\n");
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_run_batch_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::Json(json!([
                {"jsonrpc": "2.0", "method": "foo", "params": [1, 2], "id": 1},
                {"jsonrpc": "2.0", "method": "bar", "params": [], "id": 2}
            ])))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"result": 3, "id": 1}, {"result": "ok", "id": 2}]"#)
            .create_async()
            .await;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let batch_path = temp_dir.path().join("calls.json");
        std::fs::write(&batch_path, r#"[["foo", 1, 2], ["bar"]]"#).unwrap();

        let args = args_for(&server.url(), &["--batch", batch_path.to_str().unwrap()]);
        let client = client_for(&args);
        let value = run(&client, &args).await.unwrap();
        mock.assert_async().await;

        assert_eq!(value, json!([{"result": 3, "id": 1}, {"result": "ok", "id": 2}]));
    }

    #[tokio::test]
    async fn test_run_batch_file_errors() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let args = args_for("http://127.0.0.1:9/", &["--batch", missing.to_str().unwrap()]);
        let client = client_for(&args);

        let err = run(&client, &args).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to read batch file"));

        let broken = temp_dir.path().join("broken.json");
        std::fs::write(&broken, "[[\"foo\"").unwrap();
        let args = args_for("http://127.0.0.1:9/", &["--batch", broken.to_str().unwrap()]);
        let err = run(&client, &args).await.unwrap_err();
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[tokio::test]
    async fn test_rpc_error_reported_on_stderr() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": null, "error": {"code": -32601, "message": "Method not found"}, "id": 1}"#)
            .create_async()
            .await;

        let args = args_for(&server.url(), &["nosuchmethod"]);
        let client = client_for(&args);
        let outcome = run(&client, &args).await;

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(outcome, &mut out, &mut err).unwrap();
        assert!(exit_code_eq(code, ExitCode::FAILURE));
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "error -32601: Method not found\n");
    }

    #[test]
    fn test_non_rpc_failure_is_propagated() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let outcome = Err(anyhow::Error::from(httprpc_client::Error::SessionClosed));
        assert!(report(outcome, &mut out, &mut err).is_err());
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_overrides() {
        let args = args(&[
            "--url",
            "https://node.example.com/rpc",
            "--timeout",
            "7",
            "--user",
            "alice",
            "--log-level",
            "debug",
            "getinfo",
        ]);
        let config = apply_overrides(ClientConfig::default(), &args).unwrap();
        assert_eq!(config.url, "https://node.example.com/rpc");
        assert_eq!(config.timeout_secs, 7);
        assert_eq!(config.log_level, "debug");
        let auth = config.auth.unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.password, "");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = args(&["--timeout", "0", "getinfo"]);
        assert!(apply_overrides(ClientConfig::default(), &args).is_err());
    }

    #[test]
    fn test_overrides_keep_stored_values() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().to_path_buf());
        let stored = ClientConfig {
            url: "http://10.0.0.2:8332/".to_string(),
            ..ClientConfig::default()
        };
        storage.save(&stored).unwrap();

        let config = apply_overrides(storage.load().unwrap(), &args(&["getinfo"])).unwrap();
        assert_eq!(config, stored);
    }
}
