//! AppState construction and background-task spawning.
//!
//! The engine is created exactly once here and handed to the credential
//! store; everything else reaches it through that store.

use std::sync::Arc;
use std::time::Duration;

use cc_domain::config::{Config, ConfigSeverity};
use cc_domain::trace::TraceEvent;
use cc_sessions::{ClaimExtractor, SessionController};
use cc_store::{CredentialStore, KvEngine, MemoryEngine};

use crate::state::AppState;

/// Validate config, build the engine, store and controller, and return a
/// fully-wired [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Engine + credential store ────────────────────────────────────
    let engine: Arc<dyn KvEngine> = Arc::new(MemoryEngine::new());
    let store = Arc::new(CredentialStore::new(engine, config.store.key_prefix.clone()));
    tracing::info!(prefix = %config.store.key_prefix, "credential store ready");

    // ── Session lifecycle ────────────────────────────────────────────
    let sessions = Arc::new(SessionController::new(store, config.webhook.clone()));
    let claims = Arc::new(ClaimExtractor::new(config.sessions.subject_claim.clone()));
    tracing::info!(
        subject_claim = %config.sessions.subject_claim,
        cookie = %config.sessions.cookie_name,
        "session controller ready"
    );

    // ── Webhook signature secret ─────────────────────────────────────
    let webhook_secret = read_webhook_secret(config.webhook.secret_env.as_deref());

    Ok(AppState {
        config,
        sessions,
        claims,
        webhook_secret,
    })
}

fn read_webhook_secret(env_name: Option<&str>) -> Option<Arc<[u8]>> {
    let Some(name) = env_name else {
        tracing::info!("webhook signatures not checked (no webhook.secret_env)");
        return None;
    };
    match std::env::var(name) {
        Ok(secret) if !secret.is_empty() => {
            tracing::info!(env = %name, "webhook signature verification enabled");
            Some(Arc::from(secret.into_bytes()))
        }
        _ => {
            tracing::warn!(env = %name, "webhook secret env var unset or empty, signatures not checked");
            None
        }
    }
}

/// Spawn the periodic purge loop and, when enabled, the debug console.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Expired entry purge + subject lock pruning ───────────────────
    {
        let sessions = state.sessions.clone();
        let period = Duration::from_secs(state.config.store.purge_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let engine = sessions.store().engine();
                let purged = engine.purge_expired();
                let pruned = sessions.locks().prune_idle();
                if purged > 0 {
                    TraceEvent::ExpiredEntriesPurged {
                        purged,
                        remaining: engine.len(),
                    }
                    .emit();
                }
                tracing::debug!(purged, pruned_locks = pruned, "store maintenance tick");
            }
        });
    }

    // ── Debug console ────────────────────────────────────────────────
    if state.config.admin.console {
        crate::console::spawn(state.sessions.store().clone());
        tracing::info!("debug console listening on stdin");
    }
}
