// System de notifications pour la gestion d'erreurs UI

use crate::messaging::channels::NotificationProducer;
use log::{error, info, warn};
use ringbuf::traits::Producer;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Niveau de sévérité d'une notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Catégorie de notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Midi,
    Audio,
    File,
    Config,
    Generic,
}

/// Notification avec timestamp et métadonnées
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: NotificationCategory,
    pub message: String,
    pub timestamp: u64, // Unix timestamp en millisecondes
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Notification {
    pub fn new(level: NotificationLevel, category: NotificationCategory, message: String) -> Self {
        Self {
            level,
            category,
            message,
            timestamp: now_millis(),
        }
    }

    pub fn info(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Info, category, message)
    }

    pub fn warning(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Warning, category, message)
    }

    pub fn error(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Error, category, message)
    }

    /// Vérifie si la notification est plus récente que N millisecondes
    pub fn is_recent(&self, max_age_ms: u64) -> bool {
        now_millis().saturating_sub(self.timestamp) < max_age_ms
    }
}

/// Shared, non-blocking sender for notifications
///
/// Every notification is also written to the log, so nothing is lost when the
/// ring buffer is full or the UI is not draining it.
#[derive(Clone)]
pub struct Notifier {
    tx: Arc<Mutex<NotificationProducer>>,
}

impl Notifier {
    pub fn new(tx: NotificationProducer) -> Self {
        Self {
            tx: Arc::new(Mutex::new(tx)),
        }
    }

    /// Returns false when the notification could not be queued
    pub fn send(&self, notification: Notification) -> bool {
        match notification.level {
            NotificationLevel::Info => info!("[{:?}] {}", notification.category, notification.message),
            NotificationLevel::Warning => {
                warn!("[{:?}] {}", notification.category, notification.message)
            }
            NotificationLevel::Error => {
                error!("[{:?}] {}", notification.category, notification.message)
            }
        }

        match self.tx.try_lock() {
            Ok(mut tx) => tx.try_push(notification).is_ok(),
            Err(_) => false,
        }
    }

    pub fn info(&self, category: NotificationCategory, message: impl Into<String>) -> bool {
        self.send(Notification::info(category, message.into()))
    }

    pub fn error(&self, category: NotificationCategory, message: impl Into<String>) -> bool {
        self.send(Notification::error(category, message.into()))
    }
}
