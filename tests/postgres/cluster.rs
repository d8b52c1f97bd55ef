//! Embedded `PostgreSQL` cluster lifecycle for durable-store tests.
//!
//! One cluster is started per test binary. Unprivileged runs drive the
//! server in process; root runs delegate setup and start to the `pg_worker`
//! binary, which the launcher demotes to `nobody`. A cluster that cannot
//! start fails the test with a `SKIP-TEST-CLUSTER` panic.

use crate::test_helpers::EnvVarGuard;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use diesel::prelude::*;
use pg_embedded_setup_unpriv::test_support::worker_binary_for_tests;
use pg_embedded_setup_unpriv::worker_process_test_api::{
    WorkerOperation, WorkerRequest, WorkerRequestArgs, run as run_worker,
};
use pg_embedded_setup_unpriv::{
    ExecutionPrivileges, TestBootstrapSettings, bootstrap_for_tests, detect_execution_privileges,
};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tokio::runtime::Runtime;

/// Boxed error used throughout the harness.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type EnvVars = Vec<(String, Option<String>)>;

static SHARED_CLUSTER: OnceLock<ManagedCluster> = OnceLock::new();
static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Running embedded cluster.
pub struct ManagedCluster {
    settings: Settings,
    _runtime: Option<Runtime>,
    _postgres: Option<PostgreSQL>,
}

impl ManagedCluster {
    fn start() -> Result<Self, BoxError> {
        let mut bootstrap = {
            let changes = bootstrap_env_changes()?;
            let _guard = EnvVarGuard::set_many(changes.as_slice());
            bootstrap_for_tests().map_err(|err| Box::new(err) as BoxError)?
        };
        sync_password_from_file(&mut bootstrap.settings)?;
        let env_vars = bootstrap.environment.to_env();

        match bootstrap.privileges {
            ExecutionPrivileges::Root => Self::start_via_worker(bootstrap, &env_vars),
            ExecutionPrivileges::Unprivileged => Self::start_in_process(bootstrap, &env_vars),
        }
    }

    fn start_in_process(
        bootstrap: TestBootstrapSettings,
        env_vars: &EnvVars,
    ) -> Result<Self, BoxError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut postgres = PostgreSQL::new(bootstrap.settings);
        {
            let _guard = EnvVarGuard::set_many(env_vars.as_slice());
            runtime.block_on(async {
                postgres
                    .setup()
                    .await
                    .map_err(|err| Box::new(err) as BoxError)?;
                if !matches!(postgres.status(), Status::Started) {
                    postgres
                        .start()
                        .await
                        .map_err(|err| Box::new(err) as BoxError)?;
                }
                Ok::<(), BoxError>(())
            })?;
        }

        let mut settings = postgres.settings().clone();
        sync_port_from_pid(&mut settings)?;
        Ok(Self {
            settings,
            _runtime: Some(runtime),
            _postgres: Some(postgres),
        })
    }

    fn start_via_worker(
        mut bootstrap: TestBootstrapSettings,
        env_vars: &EnvVars,
    ) -> Result<Self, BoxError> {
        let worker = bootstrap
            .worker_binary
            .clone()
            .ok_or("PG_EMBEDDED_WORKER is not set for worker operation")?;
        for (operation, timeout) in [
            (WorkerOperation::Setup, bootstrap.setup_timeout),
            (WorkerOperation::Start, bootstrap.start_timeout),
        ] {
            let args = WorkerRequestArgs {
                worker: worker.as_path(),
                settings: &bootstrap.settings,
                env_vars: env_vars.as_slice(),
                operation,
                timeout,
            };
            run_worker(&WorkerRequest::new(args)).map_err(|err| Box::new(err) as BoxError)?;
        }

        sync_port_from_pid(&mut bootstrap.settings)?;
        Ok(Self {
            settings: bootstrap.settings,
            _runtime: None,
            _postgres: None,
        })
    }

    /// Returns the connection URL for a database on this cluster.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.settings.url(database)
    }

    /// Creates `template` and runs `migrate` against it unless it exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be created or migrated.
    pub fn ensure_template<F>(&self, template: &str, migrate: F) -> Result<(), BoxError>
    where
        F: FnOnce(&str) -> Result<(), BoxError>,
    {
        let _guard = template_lock();
        if self.database_exists(template)? {
            return Ok(());
        }

        self.execute_admin_sql(&format!("CREATE DATABASE {}", quote_identifier(template)))?;
        if let Err(err) = migrate(&self.database_url(template)) {
            self.execute_admin_sql(&format!("DROP DATABASE {}", quote_identifier(template)))?;
            return Err(err);
        }
        Ok(())
    }

    /// Clones `template` into a database that is dropped with the handle.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be created.
    pub fn temporary_database_from_template(
        &self,
        name: &str,
        template: &str,
    ) -> Result<TemporaryDatabase, BoxError> {
        let _guard = template_lock();
        self.execute_admin_sql(&format!(
            "CREATE DATABASE {} TEMPLATE {}",
            quote_identifier(name),
            quote_identifier(template),
        ))?;
        Ok(TemporaryDatabase {
            admin_url: self.database_url("postgres"),
            url: self.database_url(name),
            name: name.to_owned(),
        })
    }

    fn execute_admin_sql(&self, sql: &str) -> Result<(), BoxError> {
        let mut conn = PgConnection::establish(&self.database_url("postgres"))?;
        diesel::sql_query(sql).execute(&mut conn)?;
        Ok(())
    }

    fn database_exists(&self, name: &str) -> Result<bool, BoxError> {
        #[derive(diesel::QueryableByName)]
        struct ExistsRow {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            exists: bool,
        }

        let mut conn = PgConnection::establish(&self.database_url("postgres"))?;
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1) AS exists",
        )
        .bind::<diesel::sql_types::Text, _>(name)
        .get_result::<ExistsRow>(&mut conn)?;
        Ok(row.exists)
    }
}

/// Database cloned from the template, dropped when the handle goes away.
pub struct TemporaryDatabase {
    admin_url: String,
    url: String,
    name: String,
}

impl TemporaryDatabase {
    /// Connection URL of the temporary database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        let sql = format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            quote_identifier(&self.name)
        );
        if let Ok(mut conn) = PgConnection::establish(&self.admin_url) {
            drop(diesel::sql_query(sql).execute(&mut conn));
        }
    }
}

/// Returns the shared cluster, starting it on first use.
///
/// Start-up runs on a dedicated thread because the embedded server drives
/// its own runtime, which cannot be entered from inside a test runtime.
///
/// # Panics
///
/// Panics with `SKIP-TEST-CLUSTER` when the cluster cannot be started.
pub fn shared_cluster() -> &'static ManagedCluster {
    SHARED_CLUSTER.get_or_init(|| match std::thread::spawn(ManagedCluster::start).join() {
        Ok(Ok(cluster)) => cluster,
        Ok(Err(err)) => panic!("SKIP-TEST-CLUSTER: failed to start PostgreSQL: {err}"),
        Err(_) => panic!("SKIP-TEST-CLUSTER: PostgreSQL start-up panicked"),
    })
}

/// Picks a free `PG_PORT` and, for root runs, points `PG_EMBEDDED_WORKER`
/// at a staged copy of this crate's `pg_worker` binary.
fn bootstrap_env_changes() -> Result<EnvVars, BoxError> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        changes.push(("PG_PORT".to_owned(), Some(free_port()?)));
    }

    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let staged = {
            let _guard = EnvVarGuard::set_many(&[(
                "CARGO_BIN_EXE_pg_worker",
                Some(env!("CARGO_BIN_EXE_pg_worker")),
            )]);
            worker_binary_for_tests()
        };
        let worker = staged
            .ok_or("running as root needs the pg_worker binary, which was not found")?
            .into_string()
            .map_err(|_| "staged pg_worker path is not valid UTF-8")?;
        changes.push(("PG_EMBEDDED_WORKER".to_owned(), Some(worker)));
    }
    Ok(changes)
}

fn template_lock() -> std::sync::MutexGuard<'static, ()> {
    TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn free_port() -> Result<String, BoxError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port.to_string())
}

fn open_ambient_dir(path: &Path) -> Result<Dir, BoxError> {
    Ok(Dir::open_ambient_dir(path, ambient_authority())?)
}

fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let Some(file_name) = settings.password_file.file_name() else {
        return Ok(());
    };
    let parent = settings
        .password_file
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let contents = match Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name))
    {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    let password = contents.trim_end();
    if !password.is_empty() {
        password.clone_into(&mut settings.password);
    }
    Ok(())
}

fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let contents = match open_ambient_dir(&settings.data_dir)?.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    // The fourth line of postmaster.pid holds the listening port.
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
