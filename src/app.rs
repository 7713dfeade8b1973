//! Process bootstrap: open the stores, wire the modules, serve until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use bookstore_db::{JsonFileStore, MemoryStore, Record, Repository};
use bookstore_kernel::{
    schedule::run_periodic,
    settings::{Settings, StorageSettings},
    Context, InitCtx, ModuleRegistry,
};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::modules::{
    self, authors::models::Author, books::models::Book, customers::models::Customer,
    orders::models::Order, reports::models::Report, Services, Stores,
};

impl Stores {
    /// Open every store file under `settings.data_dir`.
    ///
    /// An unreadable or malformed file is fatal: the process must not run on
    /// top of a store it could not load.
    pub fn open(settings: &StorageSettings) -> anyhow::Result<Self> {
        Ok(Self {
            authors: open_store(settings)?,
            books: open_store(settings)?,
            customers: open_store(settings)?,
            orders: open_store(settings)?,
        })
    }

    /// Empty stores that never touch the disk.
    pub fn in_memory() -> Self {
        Self {
            authors: Arc::new(MemoryStore::<Author>::new()),
            books: Arc::new(MemoryStore::<Book>::new()),
            customers: Arc::new(MemoryStore::<Customer>::new()),
            orders: Arc::new(MemoryStore::<Order>::new()),
        }
    }

    /// Flush every store, attempting the rest when one fails.
    pub fn flush_all(&self) -> anyhow::Result<()> {
        let results = [
            ("authors", self.authors.flush()),
            ("books", self.books.flush()),
            ("customers", self.customers.flush()),
            ("orders", self.orders.flush()),
        ];

        let mut failed = Vec::new();
        for (store, result) in results {
            if let Err(err) = result {
                tracing::error!(store, error = ?err, "failed to flush store");
                failed.push(store);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("failed to flush stores: {}", failed.join(", ")))
        }
    }
}

fn open_store<T: Record>(settings: &StorageSettings) -> anyhow::Result<Arc<dyn Repository<T>>> {
    let store = JsonFileStore::<T>::open_in(&settings.data_dir).with_context(|| {
        format!(
            "failed to open {} store in {}",
            T::COLLECTION,
            settings.data_dir.display()
        )
    })?;
    Ok(Arc::new(store))
}

/// Build the module registry over `services`.
pub fn build_registry(services: &Services, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, services, settings);
    registry
}

/// Run the HTTP service until SIGINT or SIGTERM.
///
/// On the way out the server drains, then every module stops in reverse
/// registration order; entity modules flush their stores as they stop.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let stores = Stores::open(&settings.storage)?;
    let services = Services::new(&stores, &settings);
    let registry = build_registry(&services, &settings);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let ctx = InitCtx {
        settings: &settings,
        shutdown: &shutdown,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let flusher = spawn_flusher(&stores, &settings.storage, shutdown.clone());

    let served = bookstore_http::start_server(&registry, &settings, shutdown.clone()).await;
    shutdown.cancel();

    if let Some(flusher) = flusher {
        match flusher.await {
            Ok(runs) => tracing::debug!(runs, "store flusher stopped"),
            Err(err) => tracing::error!(error = ?err, "store flusher panicked"),
        }
    }

    let stopped = registry.stop_modules().await;
    served?;
    stopped?;

    tracing::info!("bookstore service stopped");
    Ok(())
}

/// Generate one report from the stores on disk and archive it.
pub fn generate_report(settings: &Settings) -> anyhow::Result<(Report, PathBuf)> {
    let stores = Stores::open(&settings.storage)?;
    let services = Services::new(&stores, settings);

    services
        .reports
        .generate(&Context::background(), Utc::now())
        .context("failed to generate report")
}

fn spawn_flusher(
    stores: &Stores,
    settings: &StorageSettings,
    shutdown: CancellationToken,
) -> Option<tokio::task::JoinHandle<u64>> {
    let period = settings.flush_interval();
    if period.is_zero() {
        return None;
    }

    let stores = stores.clone();
    Some(tokio::spawn(run_periodic(
        "store-flusher",
        period,
        shutdown,
        move || {
            let stores = stores.clone();
            async move {
                match tokio::task::spawn_blocking(move || stores.flush_all()).await {
                    Ok(flushed) => flushed,
                    Err(err) => Err(err.into()),
                }
            }
        },
    )))
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        _ = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_round_trip_through_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StorageSettings {
            data_dir: dir.path().to_path_buf(),
            ..StorageSettings::default()
        };
        let ctx = Context::background();

        let stores = Stores::open(&settings).unwrap();
        stores
            .authors
            .create(
                &ctx,
                Author {
                    id: 0,
                    first_name: "Jane".to_string(),
                    last_name: "Doe".to_string(),
                    bio: String::new(),
                },
            )
            .unwrap();
        stores.flush_all().unwrap();

        let reopened = Stores::open(&settings).unwrap();
        assert_eq!(reopened.authors.get(&ctx, 1).unwrap().first_name, "Jane");
        assert!(dir.path().join("orders.json").exists());
    }

    #[test]
    fn malformed_store_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("books.json"), "not json").unwrap();
        let settings = StorageSettings {
            data_dir: dir.path().to_path_buf(),
            ..StorageSettings::default()
        };

        let err = Stores::open(&settings).err().unwrap();

        assert!(err.to_string().contains("failed to open books store"));
    }

    #[test]
    fn registry_holds_every_module_in_stop_safe_order() {
        let settings = Settings::default();
        let services = Services::new(&Stores::in_memory(), &settings);

        let registry = build_registry(&services, &settings);
        let names: Vec<_> = registry.modules().iter().map(|module| module.name()).collect();

        assert_eq!(names, ["authors", "customers", "books", "orders", "reports"]);
    }
}
