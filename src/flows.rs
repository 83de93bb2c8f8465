//! Simulated asynchronous flows.
//!
//! Diagnosis, chat replies, marketplace loading and the sign-in transition
//! all complete after an artificial delay. Each flow captures the navigation
//! epoch it started in; if the user navigates before the delay elapses, the
//! flow resolves as cancelled and its result is never applied.
//!
//! The epoch lives in a `tokio::sync::watch` channel owned by [`Navigator`].
//! A running flow races its sleep against changes on that channel.

use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;

/// Kind of simulated flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Diagnosis,
    Chat,
    MarketplaceSearch,
    Login,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Diagnosis => "diagnosis",
            FlowKind::Chat => "chat",
            FlowKind::MarketplaceSearch => "marketplace_search",
            FlowKind::Login => "login",
        }
    }
}

/// Artificial delay per flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub diagnosis: Duration,
    pub chat: Duration,
    pub marketplace: Duration,
    pub login: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            diagnosis: Duration::from_millis(1500),
            chat: Duration::from_millis(1500),
            marketplace: Duration::from_millis(500),
            login: Duration::from_millis(300),
        }
    }
}

impl Latency {
    /// Same delay for every flow.
    pub fn uniform(delay: Duration) -> Self {
        Self {
            diagnosis: delay,
            chat: delay,
            marketplace: delay,
            login: delay,
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    pub fn for_kind(&self, kind: FlowKind) -> Duration {
        match kind {
            FlowKind::Diagnosis => self.diagnosis,
            FlowKind::Chat => self.chat,
            FlowKind::MarketplaceSearch => self.marketplace,
            FlowKind::Login => self.login,
        }
    }
}

/// Owner of the navigation epoch.
#[derive(Debug)]
pub struct Navigator {
    tx: watch::Sender<u64>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    pub fn epoch(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Move to a new epoch, invalidating every outstanding token.
    pub fn advance(&self) -> u64 {
        self.tx.send_modify(|epoch| *epoch += 1);
        let epoch = self.epoch();
        tracing::trace!("Navigation epoch {}", epoch);
        epoch
    }

    /// Token bound to the current epoch.
    pub fn token(&self) -> NavToken {
        let rx = self.tx.subscribe();
        let epoch = *rx.borrow();
        NavToken { epoch, rx }
    }
}

/// Observes whether the epoch a flow started in is still current.
#[derive(Debug, Clone)]
pub struct NavToken {
    epoch: u64,
    rx: watch::Receiver<u64>,
}

impl NavToken {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_stale(&self) -> bool {
        *self.rx.borrow() != self.epoch
    }

    /// Resolves once the epoch has moved on. Never resolves if the
    /// navigator is gone without having advanced.
    pub async fn cancelled(&mut self) {
        loop {
            if self.is_stale() {
                return;
            }
            if self.rx.changed().await.is_err() {
                if self.is_stale() {
                    return;
                }
                std::future::pending::<()>().await;
            }
        }
    }
}

/// A flow waiting to be run.
#[derive(Debug)]
pub struct PendingFlow<T> {
    kind: FlowKind,
    latency: Duration,
    token: NavToken,
    value: T,
}

impl<T> PendingFlow<T> {
    pub fn new(kind: FlowKind, latency: Duration, token: NavToken, value: T) -> Self {
        Self {
            kind,
            latency,
            token,
            value,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Wait out the latency unless navigation happens first.
    pub async fn run(self) -> FlowResult<T> {
        let PendingFlow {
            kind,
            latency,
            mut token,
            value,
        } = self;

        if token.is_stale() {
            return FlowResult::Cancelled(kind);
        }

        let cancelled = tokio::select! {
            biased;
            _ = token.cancelled() => true,
            _ = tokio::time::sleep(latency) => false,
        };

        if cancelled {
            tracing::debug!("{} flow cancelled by navigation", kind.as_str());
            FlowResult::Cancelled(kind)
        } else {
            FlowResult::Completed(Completion { kind, token, value })
        }
    }
}

/// Outcome of running a flow.
#[derive(Debug)]
pub enum FlowResult<T> {
    Completed(Completion<T>),
    Cancelled(FlowKind),
}

impl<T> FlowResult<T> {
    pub fn kind(&self) -> FlowKind {
        match self {
            FlowResult::Completed(c) => c.kind,
            FlowResult::Cancelled(kind) => *kind,
        }
    }

    /// The value, if the flow completed and its epoch is still current.
    pub fn into_current(self) -> Option<T> {
        match self {
            FlowResult::Completed(c) if !c.is_stale() => Some(c.value),
            FlowResult::Completed(c) => {
                tracing::debug!("Discarding stale {} result", c.kind.as_str());
                None
            }
            FlowResult::Cancelled(_) => None,
        }
    }
}

/// A flow that finished its delay.
#[derive(Debug)]
pub struct Completion<T> {
    kind: FlowKind,
    token: NavToken,
    value: T,
}

impl<T> Completion<T> {
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// True when navigation happened after the delay but before the result
    /// was applied.
    pub fn is_stale(&self) -> bool {
        self.token.is_stale()
    }
}

/// Image formats accepted by the crop doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// Identify an image by its magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
        Some(ImageFormat::Bmp)
    } else {
        None
    }
}

/// An uploaded image that passed the type check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUpload {
    pub name: String,
    pub format: ImageFormat,
    pub size: usize,
}

impl ImageUpload {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let format = sniff_image(bytes)
            .ok_or_else(|| Error::InvalidImage(format!("{} is not a recognised image", name)))?;
        Ok(Self {
            name: name.to_string(),
            format,
            size: bytes.len(),
        })
    }

    /// Read and check an image file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(&name, &bytes)
    }
}
