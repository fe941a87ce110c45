use std::fs;
use std::path::Path;

use serde_json::json;

use crate::commands::CommandResult;
use custsync_core::config::{AppConfig, LoadOptions};
use custsync_core::ExternalCustomer;
use custsync_db::{connect_with_settings, migrations, SqlCustomerStore};
use custsync_engine::{ReconciliationEngine, SyncError};

pub fn run(file: &Path) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "sync",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    crate::init_logging(&config);

    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "sync",
                "input_file",
                format!("could not read `{}`: {error}", file.display()),
                6,
            );
        }
    };
    let external: ExternalCustomer = match serde_json::from_str(&raw) {
        Ok(external) => external,
        Err(error) => {
            return CommandResult::failure(
                "sync",
                "input_parse",
                format!("`{}` is not a valid external customer record: {error}", file.display()),
                6,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "sync",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        // Safe to apply on every run; pending migrations are a no-op once
        // the schema is current.
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let engine = ReconciliationEngine::new(SqlCustomerStore::new(pool.clone()));
        let created = engine.sync(&external).await.map_err(|error| match error {
            SyncError::Conflict(conflict) => ("conflict", conflict.to_string(), 7u8),
            SyncError::Store(store) => ("db_query", store.to_string(), 8u8),
        })?;
        pool.close().await;
        Ok::<bool, (&'static str, String, u8)>(created)
    });

    match result {
        Ok(created) => {
            let message = if created {
                "created a new customer record"
            } else {
                "updated the existing customer record"
            };
            CommandResult::success_with_details(
                "sync",
                message,
                Some(json!({ "external_id": external.external_id, "created": created })),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("sync", error_class, message, exit_code)
        }
    }
}
