//! Crop doctor page and the diagnosis report it shows.

use super::ViewContext;
use crate::commands::Output;
use crate::models::{MarketplaceListing, Priority};
use crate::state::NewTask;
use chrono::NaiveDate;
use serde::Serialize;

/// Listing recommended as the treatment supplier.
pub const SUGGESTED_VENDOR_ID: &str = "list-1";
pub const RECOMMENDED_TASK_TITLE: &str = "Apply Fungicide (Azoxystrobin)";
pub const IDLE_MESSAGE: &str = "Upload a photo of an affected leaf to get an instant diagnosis.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorRef {
    pub listing_id: String,
    pub seller: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisReport {
    pub disease: String,
    pub likelihood: String,
    pub cause: String,
    pub treatment: String,
    /// Absent when the suggested listing has been removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorRef>,
}

impl DiagnosisReport {
    /// The fixed diagnosis returned for every uploaded image.
    pub fn simulated(listings: &[MarketplaceListing]) -> Self {
        Self {
            disease: "Maize Leaf Blight".to_string(),
            likelihood: "90% (High Severity)".to_string(),
            cause: "Caused by the fungus Exserohilum turcicum.".to_string(),
            treatment: "Immediate application of a broad-spectrum fungicide (Active Ingredient: Azoxystrobin) at a recommended rate of 1.0 L/Ha.".to_string(),
            vendor: listings
                .iter()
                .find(|l| l.id == SUGGESTED_VENDOR_ID)
                .map(|l| VendorRef {
                    listing_id: l.id.clone(),
                    seller: l.seller.clone(),
                }),
        }
    }

    /// Follow-up task added to the planner once the diagnosis lands.
    pub fn recommended_task(&self, today: NaiveDate) -> NewTask {
        NewTask {
            title: RECOMMENDED_TASK_TITLE.to_string(),
            date: today.format("%Y-%m-%d").to_string(),
            priority: Priority::High,
        }
    }

    pub fn source_line(&self) -> Option<String> {
        self.vendor.as_ref().map(|v| {
            format!(
                "The recommended medication is supplied by: {}.",
                v.seller
            )
        })
    }
}

/// Where a report can be shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    Email(String),
    WhatsApp(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareReceipt {
    pub channel: String,
    pub recipient: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub message: String,
}

/// Simulate sharing a report. Nothing leaves the machine.
pub fn share(report: &DiagnosisReport, target: &ShareTarget) -> ShareReceipt {
    let title = format!("Share Report: {}", report.disease);
    match target {
        ShareTarget::Email(address) => ShareReceipt {
            channel: "email".to_string(),
            recipient: address.clone(),
            title,
            link: None,
            message: format!("Simulating PDF report sent to: {}", address),
        },
        ShareTarget::WhatsApp(number) => {
            let link = format!(
                "https://wa.me/{}?text=Hello! Here is the AgriPulse Diagnosis Report PDF link: [Simulated Link]",
                number
            );
            ShareReceipt {
                channel: "whatsapp".to_string(),
                recipient: number.clone(),
                title,
                message: format!("Open {} to share the report", link),
                link: Some(link),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiagnosisView {
    Idle { message: String },
    Analyzing,
    Result(DiagnosisReport),
}

pub fn render(ctx: &ViewContext) -> DiagnosisView {
    match (&ctx.diagnosis, ctx.diagnosis_pending) {
        (_, true) => DiagnosisView::Analyzing,
        (Some(report), false) => DiagnosisView::Result(report.clone()),
        (None, false) => DiagnosisView::Idle {
            message: IDLE_MESSAGE.to_string(),
        },
    }
}

impl Output for DiagnosisReport {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            self.disease.clone(),
            format!("Likelihood: {}", self.likelihood),
            self.cause.clone(),
            format!("Treatment: {}", self.treatment),
        ];
        if let Some(source) = self.source_line() {
            lines.push(source);
        }
        lines.join("\n")
    }
}

impl Output for DiagnosisView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match self {
            DiagnosisView::Idle { message } => message.clone(),
            DiagnosisView::Analyzing => "Analyzing image...".to_string(),
            DiagnosisView::Result(report) => report.to_human(),
        }
    }
}

impl Output for ShareReceipt {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("{}\n{}", self.title, self.message)
    }
}
