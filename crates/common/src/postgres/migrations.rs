use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Applies the SQL migrations by running the goose binary as a subprocess.
pub struct MigrationRunner {
    goose_binary_path: String,
    migrations_dir: String,
    dsn: String,
}

impl MigrationRunner {
    pub fn new(goose_binary_path: String, migrations_dir: String, dsn: String) -> Self {
        Self {
            goose_binary_path,
            migrations_dir,
            dsn,
        }
    }

    /// Runs all pending migrations (`goose -dir {dir} postgres {dsn} up`)
    pub async fn run_migrations(&self) -> Result<()> {
        debug!(dir = %self.migrations_dir, "running migrations");

        let output = Command::new(&self.goose_binary_path)
            .arg("-dir")
            .arg(&self.migrations_dir)
            .arg("postgres")
            .arg(&self.dsn)
            .arg("up")
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.goose_binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            bail!("Migration failed.\nstdout: {}\nstderr: {}", stdout, stderr);
        }

        info!("database migrations applied");
        debug!("{}", String::from_utf8_lossy(&output.stdout));

        Ok(())
    }
}
