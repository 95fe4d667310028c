//! App list controller
//!
//! Owns the rendered list. Only `refresh` and the two row actions change it,
//! and every refresh carries a token so results of superseded requests are
//! dropped instead of rendered. Row actions are checked against the last
//! successful render, so a refresh in flight does not revoke them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::ConsoleError;
use crate::http::api::PublishApi;
use crate::listing::view::ListView;

/// Default duration of the invalidate acknowledgement
pub const DEFAULT_ACK_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Default)]
struct Rendered {
    view: ListView,
    updated_at: Option<DateTime<Utc>>,
    actionable: Vec<String>,
}

/// Fetches, renders, and acts on the deployed app list
pub struct AppListController {
    api: Arc<dyn PublishApi>,
    latest_token: AtomicU64,
    rendered: RwLock<Rendered>,
    acks: Mutex<HashMap<String, Instant>>,
    notice: Mutex<Option<String>>,
    ack_delay: Duration,
}

impl AppListController {
    pub fn new(api: Arc<dyn PublishApi>) -> Self {
        Self::with_ack_delay(api, DEFAULT_ACK_DELAY)
    }

    pub fn with_ack_delay(api: Arc<dyn PublishApi>, ack_delay: Duration) -> Self {
        Self {
            api,
            latest_token: AtomicU64::new(0),
            rendered: RwLock::new(Rendered::default()),
            acks: Mutex::new(HashMap::new()),
            notice: Mutex::new(None),
            ack_delay,
        }
    }

    /// Fetch the list and render it, unless a newer refresh was issued meanwhile
    pub async fn refresh(&self) {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.render(token, ListView::Loading);

        let view = match self.api.list_apps().await {
            Ok(apps) => ListView::from_apps(apps),
            Err(e) => {
                warn!("Refresh {} failed: {}", token, e);
                ListView::Unavailable(e.to_string())
            }
        };

        if self.render(token, view) {
            debug!("Refresh {} rendered", token);
        } else {
            debug!("Refresh {} superseded, result discarded", token);
        }
    }

    fn render(&self, token: u64, view: ListView) -> bool {
        let mut rendered = self.rendered.write().unwrap_or_else(|e| e.into_inner());
        if token != self.latest_token.load(Ordering::SeqCst) {
            return false;
        }
        if matches!(view, ListView::Empty | ListView::Rows(_)) {
            rendered.updated_at = Some(Utc::now());
            rendered.actionable = view.rows().iter().map(|row| row.app.name.clone()).collect();
        }
        rendered.view = view;
        true
    }

    /// Snapshot of the current view
    pub fn view(&self) -> ListView {
        self.rendered
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .view
            .clone()
    }

    /// When the list was last rendered from a successful fetch
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.rendered.read().unwrap_or_else(|e| e.into_inner()).updated_at
    }

    /// Last action error, for inline display
    pub fn notice(&self) -> Option<String> {
        self.notice.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_notice(&self, notice: Option<String>) {
        *self.notice.lock().unwrap_or_else(|e| e.into_inner()) = notice;
    }

    /// Refuse actions for apps without a row in the last successful render
    fn ensure_rendered(&self, name: &str) -> Result<(), ConsoleError> {
        let rendered = self.rendered.read().unwrap_or_else(|e| e.into_inner());
        if rendered.actionable.iter().any(|listed| listed == name) {
            Ok(())
        } else {
            Err(ConsoleError::StaleAction(name.to_string()))
        }
    }

    /// Invalidate the cache of one app; the list itself is left as is
    pub async fn invalidate_one(&self, name: &str) -> Result<(), ConsoleError> {
        self.ensure_rendered(name)?;

        match self.api.invalidate(name).await {
            Ok(()) => {
                info!("Cache invalidated for {}", name);
                self.set_notice(None);
                self.acks
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(name.to_string(), Instant::now() + self.ack_delay);
                Ok(())
            }
            Err(e) => {
                warn!("Invalidate of {} failed: {}", name, e);
                self.set_notice(Some(format!("Invalidate failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Whether the invalidate control of `name` shows its acknowledgement
    pub fn is_acknowledged(&self, name: &str) -> bool {
        let now = Instant::now();
        let mut acks = self.acks.lock().unwrap_or_else(|e| e.into_inner());
        acks.retain(|_, until| *until > now);
        acks.contains_key(name)
    }

    /// Delete one app and refresh on success; failures leave the list untouched
    pub async fn delete_one(&self, name: &str) -> Result<(), ConsoleError> {
        self.ensure_rendered(name)?;

        match self.api.delete(name).await {
            Ok(()) => {
                info!("Deleted app {}", name);
                self.set_notice(None);
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!("Delete of {} failed: {}", name, e);
                self.set_notice(Some(format!("Delete failed: {}", e)));
                Err(e)
            }
        }
    }
}
