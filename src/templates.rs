//! Compiled HTML templates with optional hot reload.
//!
//! Every `*.html` file directly inside the template directory is compiled
//! into one minijinja [`Environment`]. Readers take a cheap `Arc` snapshot of
//! the live environment and render outside the lock; a reload compiles a new
//! environment first and only swaps the pointer under the write lock.

use crate::utils::render_markdown;
use minijinja::{Environment, Value};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How often the dev-mode reloader looks at the template directory.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(2);

pub struct TemplateStore {
    dir: PathBuf,
    env: RwLock<Arc<Environment<'static>>>,
}

impl TemplateStore {
    /// Compile every template in `dir`, failing on the first broken one.
    pub fn load(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        let env = compile(&dir)?;
        Ok(Self {
            dir,
            env: RwLock::new(Arc::new(env)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        let env = Arc::clone(&self.env.read().unwrap_or_else(PoisonError::into_inner));
        env.get_template(name)?.render(ctx)
    }

    /// Recompile from disk and swap the new set in. On error the current set
    /// stays live.
    pub fn reload(&self) -> anyhow::Result<()> {
        let env = Arc::new(compile(&self.dir)?);
        *self.env.write().unwrap_or_else(PoisonError::into_inner) = env;
        Ok(())
    }

    /// Poll the template directory every `interval` and reload when anything
    /// in it changed. The task ends once `shutdown` turns `true` or its sender
    /// is dropped.
    pub fn spawn_reloader(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last_seen = latest_modification(&self.dir).unwrap_or_else(|_| SystemTime::now());
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let modified = match latest_modification(&self.dir) {
                    Ok(modified) => modified,
                    Err(e) => {
                        tracing::warn!("Cannot stat template directory {:?}: {}", self.dir, e);
                        continue;
                    }
                };
                if modified <= last_seen {
                    continue;
                }
                last_seen = modified;

                match self.reload() {
                    Ok(()) => tracing::info!("Templates reloaded from {:?}", self.dir),
                    Err(e) => tracing::warn!("Cannot reload templates: {:#}", e),
                }
            }

            tracing::debug!("Template reloader stopped");
        })
    }
}

fn compile(dir: &Path) -> anyhow::Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_filter("markdown", markdown);

    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Cannot read template directory {:?}: {}", dir, e))?;

    for entry in entries {
        let path = entry?.path();
        if !is_template(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        let source = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read template {:?}: {}", path, e))?;
        env.add_template_owned(name, source)?;
    }

    Ok(env)
}

fn is_template(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}

/// Newest modification time among the directory itself and its templates.
fn latest_modification(dir: &Path) -> std::io::Result<SystemTime> {
    let mut latest = std::fs::metadata(dir)?.modified()?;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_template(&path) {
            latest = latest.max(std::fs::metadata(&path)?.modified()?);
        }
    }
    Ok(latest)
}

fn markdown(value: String) -> Value {
    Value::from_safe_string(render_markdown(&value))
}
