//! The published asset catalog and its refresh cycle.
//!
//! The catalog is an immutable snapshot behind an `Arc`. Readers clone the
//! `Arc` and iterate without holding any lock; a refresh builds a complete new
//! list off to the side and swaps it in only when every repository resolved.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Duration,
};

use hubindex_dl::traits::Platform;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    asset::AssetRecord, error::CatalogError, repo::RepoSpec, resolver::Resolver, CatalogResult,
};

pub type Snapshot = Arc<Vec<AssetRecord>>;

pub struct Catalog<P: Platform> {
    resolver: Resolver<P>,
    repositories: Vec<RepoSpec>,
    snapshot: RwLock<Snapshot>,
    // Serializes writers; never taken by readers.
    refresh_lock: Mutex<()>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Platform + 'static> Catalog<P> {
    pub fn new(platform: Arc<P>, repositories: Vec<RepoSpec>) -> Self {
        Self {
            resolver: Resolver::new(platform),
            repositories,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            refresh_lock: Mutex::new(()),
            refresh_task: Mutex::new(None),
        }
    }

    pub fn repositories(&self) -> &[RepoSpec] {
        &self.repositories
    }

    pub fn platform(&self) -> &Arc<P> {
        self.resolver.platform()
    }

    /// The currently published snapshot.
    pub fn assets(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-resolves every repository in configured order and publishes the
    /// result. On the first failing repository the refresh is abandoned and
    /// the previous snapshot stays published.
    pub fn refresh_all(&self) -> CatalogResult<usize> {
        let _writer = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        info!(
            "refetching assets for {} repositories",
            self.repositories.len()
        );

        let mut assets = Vec::new();
        for spec in &self.repositories {
            let records = self.resolver.resolve(spec)?;
            debug!("{}: {} assets", spec, records.len());
            assets.extend(records);
        }

        let count = assets.len();
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(assets);

        info!(
            "found {} assets for {} repositories",
            count,
            self.repositories.len()
        );
        Ok(count)
    }

    /// Runs [`Catalog::refresh_all`], logging instead of returning the error.
    pub fn refresh_and_log(&self) -> bool {
        match self.refresh_all() {
            Ok(_) => true,
            Err(err) => {
                error!("refresh failed, keeping previous catalog: {}", err);
                false
            }
        }
    }

    /// Runs a refresh on the blocking pool and waits for it.
    pub async fn refresh(self: &Arc<Self>) -> CatalogResult<usize> {
        let catalog = Arc::clone(self);
        tokio::task::spawn_blocking(move || catalog.refresh_all()).await?
    }

    /// Arms the periodic refresh. Must be called from within a tokio runtime.
    ///
    /// Every `interval` a refresh runs on the blocking pool and the next one
    /// is scheduled whether it succeeded or not. Arming again replaces and
    /// aborts the previous schedule.
    pub fn start_refresh_cycle(self: &Arc<Self>, interval: Duration) {
        let catalog = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let worker = Arc::clone(&catalog);
                if let Err(err) = tokio::task::spawn_blocking(move || worker.refresh_and_log()).await
                {
                    error!("refresh task failed: {}", err);
                }
            }
        });

        let previous = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            debug!("replacing previous refresh schedule");
            previous.abort();
        }
    }

    /// Aborts the periodic refresh. A refresh already running on the blocking
    /// pool still completes.
    pub fn stop_refresh_cycle(&self) {
        if let Some(handle) = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            debug!("stopping refresh schedule");
            handle.abort();
        }
    }

    /// Looks up the download address `(owner, repo, name)`.
    pub fn find(&self, owner: &str, repo: &str, name: &str) -> CatalogResult<AssetRecord> {
        self.assets()
            .iter()
            .find(|asset| asset.matches(owner, repo, name))
            .cloned()
            .ok_or_else(|| {
                CatalogError::AssetNotFound {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    name: name.to_string(),
                }
            })
    }

    /// Distinct lowercase repository names, sorted.
    pub fn projects(&self) -> Vec<String> {
        self.assets()
            .iter()
            .map(|asset| asset.repo().to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn by_owner(&self, owner: &str) -> Vec<AssetRecord> {
        self.filtered(|asset| asset.owner().eq_ignore_ascii_case(owner))
    }

    pub fn by_repo(&self, owner: &str, repo: &str) -> Vec<AssetRecord> {
        self.filtered(|asset| {
            asset.owner().eq_ignore_ascii_case(owner) && asset.repo().eq_ignore_ascii_case(repo)
        })
    }

    /// Assets of every tracked repository named `repo`, whatever the owner.
    pub fn by_project(&self, repo: &str) -> Vec<AssetRecord> {
        self.filtered(|asset| asset.repo().eq_ignore_ascii_case(repo))
    }

    fn filtered<F>(&self, predicate: F) -> Vec<AssetRecord>
    where
        F: Fn(&AssetRecord) -> bool,
    {
        self.assets()
            .iter()
            .filter(|asset| predicate(asset))
            .cloned()
            .collect()
    }
}
