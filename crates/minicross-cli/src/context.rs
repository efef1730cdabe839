//! Wiring shared by every command: local store, backend, identity and config.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDate, Utc};
use minicross::{
    Backend, Config, FileStore, IdentityProvider, LocalStore, ManualClock, PlaySession,
    ProgressStore, SessionDeps, SyncQueue,
};
use tracing::debug;

use crate::cli::Args;
use crate::http::{HttpBackend, NoEndpoint};

const CONFIG_FILE: &str = "config.toml";

pub struct Context {
    pub store: Rc<FileStore>,
    pub backend: Rc<dyn Backend>,
    pub identity: Rc<Option<String>>,
    pub queue: Rc<SyncQueue>,
    /// Starts at the current time; scripted play advances it explicitly.
    pub clock: Rc<ManualClock>,
    pub config: Config,
    pub date: NaiveDate,
    pub today: NaiveDate,
}

impl Context {
    pub fn from_args(args: &Args) -> Result<Self> {
        let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
        let config = load_config(args.config.as_deref(), &data_dir)?;
        debug!("Using data directory {}", data_dir.display());

        let store = Rc::new(FileStore::new(&data_dir));
        let clock = Rc::new(ManualClock::new(Utc::now()));
        let backend: Rc<dyn Backend> = match &args.api_endpoint {
            Some(endpoint) => Rc::new(HttpBackend::new(endpoint, args.api_token.clone())),
            None => Rc::new(NoEndpoint),
        };
        let queue = Rc::new(SyncQueue::new(store.clone(), clock.clone()));
        let today = Local::now().date_naive();

        Ok(Self {
            store,
            backend,
            identity: Rc::new(args.user.clone()),
            queue,
            clock,
            config,
            date: args.date.unwrap_or(today),
            today,
        })
    }

    pub fn local_store(&self) -> Rc<dyn LocalStore> {
        self.store.clone()
    }

    pub fn session_deps(&self) -> SessionDeps {
        let identity: Rc<dyn IdentityProvider> = self.identity.clone();
        SessionDeps {
            store: self.local_store(),
            backend: self.backend.clone(),
            identity,
            queue: self.queue.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(
            self.local_store(),
            self.backend.clone(),
            self.identity.clone(),
            self.queue.clone(),
            self.clock.clone(),
        )
    }

    pub fn open_session(&self) -> Result<PlaySession> {
        let session = PlaySession::open(self.date, self.config.clone(), self.session_deps())
            .with_context(|| format!("Failed to open puzzle for {}", self.date))?;
        Ok(session.with_streak_day(self.today))
    }

    pub fn user(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("minicross"))
        .unwrap_or_else(|| PathBuf::from(".minicross"))
}

/// Explicit file first, then `config.toml` in the data directory, then defaults.
pub fn load_config(explicit: Option<&Path>, data_dir: &Path) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = data_dir.join(CONFIG_FILE);
            if !candidate.exists() {
                return Ok(Config::default());
            }
            candidate
        }
    };
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
