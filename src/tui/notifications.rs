//! Toast notifications for the terminal dashboard.
//!
//! Toasts stack newest-first, at most [`MAX_VISIBLE_TOASTS`] at a time, and
//! dismiss themselves after a few seconds.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Maximum number of toasts to display at once
pub const MAX_VISIBLE_TOASTS: usize = 3;

const DEFAULT_DISMISS_SECONDS: u64 = 5;

const TOAST_WIDTH: u16 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn color(&self) -> Color {
        match self {
            NotificationLevel::Info => Color::Blue,
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Warning => Color::Yellow,
            NotificationLevel::Error => Color::Red,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✓",
            NotificationLevel::Warning => "⚠",
            NotificationLevel::Error => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: NotificationLevel,
    pub message: String,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
            duration: Duration::from_secs(DEFAULT_DISMISS_SECONDS),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

#[derive(Debug, Default)]
pub struct NotificationManager {
    /// Newest first
    toasts: VecDeque<Toast>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.toasts.push_front(Toast::new(level, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    /// Stock and other farm alerts.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }

    /// Drop expired toasts.
    pub fn tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().take(MAX_VISIBLE_TOASTS)
    }

    /// Toasts that did not fit on screen.
    pub fn overflow_count(&self) -> usize {
        self.toasts.len().saturating_sub(MAX_VISIBLE_TOASTS)
    }

    pub fn dismiss_all(&mut self) {
        self.toasts.clear();
    }

    /// Draw visible toasts in the top-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = TOAST_WIDTH.min(area.width);
        let mut y = area.y + 1;
        for toast in self.visible() {
            let text_width = width.saturating_sub(4).max(1) as usize;
            let lines = toast.message.chars().count().div_ceil(text_width).max(1) as u16;
            let height = lines + 2;
            if y + height > area.bottom() {
                break;
            }
            let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, height);
            let widget = Paragraph::new(format!("{} {}", toast.level.icon(), toast.message))
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(toast.level.color()))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(Clear, rect);
            frame.render_widget(widget, rect);
            y += height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_toast_first() {
        let mut manager = NotificationManager::new();
        manager.info("first");
        manager.success("second");
        let messages: Vec<&str> = manager.visible().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_overflow_is_counted() {
        let mut manager = NotificationManager::new();
        for i in 0..5 {
            manager.info(format!("toast {}", i));
        }
        assert_eq!(manager.visible().count(), MAX_VISIBLE_TOASTS);
        assert_eq!(manager.overflow_count(), 2);
    }

    #[test]
    fn test_fresh_toasts_survive_tick() {
        let mut manager = NotificationManager::new();
        manager.error("boom");
        manager.tick();
        assert_eq!(manager.visible().count(), 1);
        manager.dismiss_all();
        assert_eq!(manager.visible().count(), 0);
    }
}
