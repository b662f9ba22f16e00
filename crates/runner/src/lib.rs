//! A concurrent application runner that manages long-running processes with graceful shutdown.
//!
//! The runner starts every registered process, waits until one of them fails or a shutdown
//! signal (SIGINT/SIGTERM) arrives, gives the remaining processes time to wind down and
//! finally executes the registered closers.
//!
//! # Example
//!
//! ```no_run
//! use fds_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Runner::new()
//!         .with_app_process(|ctx| async move {
//!             ctx.cancelled().await;
//!             Ok(())
//!         })
//!         .with_closer(|| async move {
//!             tracing::info!("Cleaning up resources");
//!             Ok(())
//!         })
//!         .with_closer_timeout(Duration::from_secs(5))
//!         .run()
//!         .await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// An app process: takes a cancellation token, resolves when the process has stopped.
pub type AppProcess = Box<
    dyn FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>
        + Send,
>;

/// A cleanup function run after every process has stopped.
pub type Closer =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>> + Send>;

struct NamedProcess {
    name: String,
    process: AppProcess,
}

/// Runs app processes concurrently until one fails or shutdown is requested.
pub struct Runner {
    app_processes: Vec<NamedProcess>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    shutdown_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a runner with a 10 second closer timeout and a 30 second shutdown timeout.
    pub fn new() -> Self {
        Self {
            app_processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(30),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds an anonymous app process.
    pub fn with_app_process<F, Fut>(self, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        let name = format!("process_{}", self.app_processes.len());
        self.with_named_process(name, Box::new(|token| Box::pin(process(token))))
    }

    /// Adds an app process whose name is used in lifecycle logs.
    pub fn with_named_process(mut self, name: impl Into<String>, process: AppProcess) -> Self {
        self.app_processes.push(NamedProcess {
            name: name.into(),
            process,
        });
        self
    }

    /// Adds a closer. Closers run concurrently once every process has stopped,
    /// whatever the reason, and a failing closer does not prevent the others.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Time the processes get to stop after cancellation before they are aborted.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs to completion and exits the process with code 0, or 1 if a process failed.
    pub async fn run(self) {
        match self.run_until_stopped().await {
            Ok(()) => {
                tracing::info!("Application exiting normally");
                std::process::exit(0);
            }
            Err(err) => {
                tracing::error!("Application exiting with error: {:#}", err);
                std::process::exit(1);
            }
        }
    }

    /// Runs all processes and closers, returning the first process error.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for NamedProcess { name, process } in self.app_processes {
            let process_token = token.clone();
            tracing::debug!(process = %name, "starting app process");
            join_set.spawn(async move { (name, process(process_token).await) });
        }

        let signal_task = tokio::spawn(wait_for_signal(token.clone()));

        let mut first_error = None;
        loop {
            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = join_set.join_next() => match result {
                    Some(result) => result,
                    None => break,
                },
            };

            match result {
                Ok((name, Ok(()))) => {
                    tracing::debug!(process = %name, "app process completed");
                }
                Ok((name, Err(err))) => {
                    tracing::error!(process = %name, "app process error: {:#}", err);
                    first_error = Some(err.context(format!("process {} failed", name)));
                    break;
                }
                Err(err) => {
                    tracing::error!("app process panicked: {}", err);
                    break;
                }
            }
        }
        // the remaining processes observe the cancelled token
        token.cancel();

        Self::drain_processes(&mut join_set, self.shutdown_timeout).await;
        signal_task.abort();

        if !self.closers.is_empty() {
            tracing::info!("Running closers with timeout of {:?}", self.closer_timeout);
            match tokio::time::timeout(self.closer_timeout, Self::run_closers(self.closers)).await {
                Ok(()) => tracing::info!("All closers completed"),
                Err(_) => tracing::error!("Closers timed out after {:?}", self.closer_timeout),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Wait for cancelled processes, aborting whatever is still running at the deadline.
    async fn drain_processes(
        join_set: &mut JoinSet<(String, anyhow::Result<()>)>,
        shutdown_timeout: Duration,
    ) {
        let drained = tokio::time::timeout(shutdown_timeout, async {
            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok((name, Ok(()))) => tracing::debug!(process = %name, "app process stopped"),
                    Ok((name, Err(err))) => {
                        tracing::warn!(process = %name, "app process stopped with error: {:#}", err)
                    }
                    Err(err) => tracing::error!("app process panicked: {}", err),
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::error!(
                remaining = join_set.len(),
                "processes did not stop within {:?}, aborting",
                shutdown_timeout
            );
            join_set.shutdown().await;
        }
    }

    async fn run_closers(closers: Vec<Closer>) {
        let mut closer_set = JoinSet::new();

        for closer in closers {
            closer_set.spawn(async move { closer().await });
        }

        while let Some(result) = closer_set.join_next().await {
            match result {
                Ok(Ok(())) => tracing::debug!("Closer completed successfully"),
                Ok(Err(err)) => tracing::error!("Closer error: {:#}", err),
                Err(err) => tracing::error!("Closer panicked: {}", err),
            }
        }
    }
}

/// Cancels `token` on SIGINT or SIGTERM.
async fn wait_for_signal(token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => return,
        _ = ctrl_c() => tracing::info!("Received shutdown signal"),
        _ = terminate() => tracing::info!("Received SIGTERM signal"),
    }
    token.cancel();
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Error setting up signal handler: {}", err);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(err) => {
            tracing::error!("Error setting up SIGTERM handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
