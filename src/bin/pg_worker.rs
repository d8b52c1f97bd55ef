//! Runs embedded `PostgreSQL` lifecycle operations for a root test process.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! The launcher in `pg_embedded_setup_unpriv` demotes the child to `nobody`
//! before exec and writes a [`WorkerPayload`] with the cluster settings and
//! environment overrides to `config-path`. `start` leaves the server
//! running after the worker exits.

#[cfg(unix)]
use cap_std::{ambient_authority, fs::Dir};
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::{
    env,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};
#[cfg(unix)]
use thiserror::Error;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read worker config: {0}")]
    ConfigRead(#[source] std::io::Error),
    #[error("failed to parse worker config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("settings conversion failed: {0}")]
    SettingsConversion(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("postgres operation failed: {0}")]
    PostgresOperation(String),
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    fn parse(arg: &OsStr) -> Result<Self, WorkerError> {
        match arg.to_str() {
            Some("setup") => Ok(Self::Setup),
            Some("start") => Ok(Self::Start),
            Some("stop") => Ok(Self::Stop),
            _ => Err(WorkerError::InvalidArgs(format!(
                "unknown operation {arg:?}; expected setup, start or stop"
            ))),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    run_worker(env::args_os()).map_err(Into::into)
}

#[cfg(unix)]
fn run_worker(args: impl Iterator<Item = OsString>) -> Result<(), WorkerError> {
    let (operation, config_path) = parse_args(args)?;
    let payload = load_payload(&config_path)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::SettingsConversion(err.to_string()))?;
    apply_worker_environment(&payload.environment);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::RuntimeInit)?;
    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async {
        match operation {
            Operation::Setup => {
                postgres.setup().await.map_err(postgres_error)?;
                ensure_started(&mut postgres).await
            }
            Operation::Start => ensure_started(&mut postgres).await,
            Operation::Stop => postgres.stop().await.map_err(postgres_error),
        }
    })?;

    if operation == Operation::Start {
        // Dropping the handle would stop the server.
        let _running = std::mem::ManuallyDrop::new(postgres);
    }
    Ok(())
}

#[cfg(unix)]
fn parse_args(
    mut args: impl Iterator<Item = OsString>,
) -> Result<(Operation, PathBuf), WorkerError> {
    let _program = args.next();
    let operation = args
        .next()
        .ok_or_else(|| WorkerError::InvalidArgs("missing operation argument".to_owned()))
        .and_then(|arg| Operation::parse(&arg))?;
    let config_path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| WorkerError::InvalidArgs("missing config path argument".to_owned()))?;
    if let Some(extra) = args.next() {
        return Err(WorkerError::InvalidArgs(format!(
            "unexpected extra argument: {extra:?}"
        )));
    }
    Ok((operation, config_path))
}

#[cfg(unix)]
fn load_payload(config_path: &Path) -> Result<WorkerPayload, WorkerError> {
    let file_name = config_path.file_name().ok_or_else(|| {
        WorkerError::InvalidArgs(format!(
            "config path {} has no file name",
            config_path.display()
        ))
    })?;
    let parent = config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let bytes = Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read(file_name))
        .map_err(WorkerError::ConfigRead)?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
}

#[cfg(unix)]
fn apply_worker_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the worker is single-threaded here; the runtime is built
        // after the environment is applied.
        unsafe {
            match value {
                Some(plain) => env::set_var(key, plain.expose()),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres.start().await.map_err(postgres_error)
}

#[cfg(unix)]
fn postgres_error(err: postgresql_embedded::Error) -> WorkerError {
    WorkerError::PostgresOperation(err.to_string())
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is not supported on non-Unix platforms".into())
}
