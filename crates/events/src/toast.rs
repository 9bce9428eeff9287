//! Toast notifications rendered from studio events.

use serde::Serialize;
use vendora_core::cascade::CascadeReason;
use vendora_core::product::ProductStatus;

use crate::bus::StudioEvent;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
}

impl Toast {
    fn new(level: ToastLevel, title: &str, message: String) -> Self {
        Self {
            level,
            title: title.to_string(),
            message,
        }
    }

    /// Render an event, or `None` for events that are not shown to vendors.
    pub fn from_event(event: &StudioEvent) -> Option<Self> {
        match event {
            StudioEvent::ProductTransitioned { change, .. } => {
                let name = &change.product_name;
                let toast = match &change.reason {
                    CascadeReason::AutoPublished => Self::new(
                        ToastLevel::Success,
                        "Product published",
                        format!("\"{name}\" was published automatically after its design was approved."),
                    ),
                    CascadeReason::MovedToDraft => Self::new(
                        ToastLevel::Success,
                        "Design approved",
                        format!("\"{name}\" is ready in your drafts. Publish it whenever you like."),
                    ),
                    CascadeReason::ValidationReflected => Self::new(
                        ToastLevel::Info,
                        "Design approved",
                        format!("The design of \"{name}\" is now approved."),
                    ),
                    CascadeReason::DesignRejected { reason } => Self::new(
                        ToastLevel::Warning,
                        "Design rejected",
                        match reason {
                            Some(reason) => format!("The design of \"{name}\" was rejected: {reason}"),
                            None => format!("The design of \"{name}\" was rejected."),
                        },
                    ),
                    CascadeReason::ServerUpdate => {
                        // Server-side moves without a status change are noise.
                        if change.previous_status == change.status {
                            return None;
                        }
                        Self::new(
                            ToastLevel::Info,
                            "Product updated",
                            format!("\"{name}\" is now {}.", status_label(change.status)),
                        )
                    }
                };
                Some(toast)
            }
            StudioEvent::DraftPublished {
                product_name,
                was_validated,
                ..
            } => Some(if *was_validated {
                Self::new(
                    ToastLevel::Success,
                    "Product published",
                    format!("\"{product_name}\" is now live."),
                )
            } else {
                Self::new(
                    ToastLevel::Warning,
                    "Published without approval",
                    format!("\"{product_name}\" is live, but its design has not been approved yet."),
                )
            }),
            StudioEvent::ActionUpdated { .. } => None,
            StudioEvent::ProductCreated {
                is_design_reused, ..
            } => Some(Self::new(
                ToastLevel::Success,
                "Product created",
                if *is_design_reused {
                    "Your product was created using an existing design.".to_string()
                } else {
                    "Your product was created and its design sent for review.".to_string()
                },
            )),
            StudioEvent::OperationFailed { message, .. } => {
                Some(Self::new(ToastLevel::Error, "Something went wrong", message.clone()))
            }
        }
    }
}

fn status_label(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Pending => "pending review",
        ProductStatus::Draft => "in your drafts",
        ProductStatus::Published => "published",
    }
}
