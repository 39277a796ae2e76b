//! Fan-out of one change summary to every enabled recipient.

use std::sync::Arc;

use dropwatch_core::change::ChangeSummary;
use dropwatch_db::repositories::RecipientRepo;
use dropwatch_db::DbPool;

use crate::mailer::Mailer;

/// Subject line for every change alert email.
const ALERT_SUBJECT: &str = "File change alert";

/// Sends one alert email per enabled recipient of an account.
pub struct Dispatcher {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
}

impl Dispatcher {
    /// Create a dispatcher over the given pool and mail transport.
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Notify every enabled recipient of `account_id` about `summary`.
    ///
    /// Emits one email per registration with `alert_enabled = true`;
    /// registrations with alerts off are skipped. A failed send is
    /// logged and does not stop the remaining sends. There is no
    /// de-duplication across invocations. Returns the number of emails
    /// handed to the transport.
    ///
    /// Callers are expected to short-circuit on an empty summary; this
    /// method does not re-check.
    pub async fn dispatch(
        &self,
        account_id: &str,
        display_name: &str,
        summary: &ChangeSummary,
    ) -> Result<usize, sqlx::Error> {
        let recipients = RecipientRepo::list_for_account(&self.pool, account_id).await?;
        let body = format_alert_body(display_name, summary);

        let mut sent = 0;
        for recipient in recipients {
            if !recipient.alert_enabled {
                tracing::debug!(
                    account_id,
                    email = %recipient.email,
                    "Alerts disabled for recipient, skipping",
                );
                continue;
            }

            tracing::info!(account_id, email = %recipient.email, "Sending alert email");
            match self.mailer.send(&recipient.email, ALERT_SUBJECT, &body).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::error!(
                        account_id,
                        email = %recipient.email,
                        error = %e,
                        "Failed to send alert email",
                    );
                }
            }
        }

        Ok(sent)
    }
}

/// Render the plain-text alert body for one summary.
fn format_alert_body(display_name: &str, summary: &ChangeSummary) -> String {
    let mut body = format!("Hi {display_name},\n\nRecent activity in your account:\n");

    let sections: [(&str, &[String]); 3] = [
        ("New files", &summary.new_files),
        ("New folders", &summary.new_folders),
        ("Deleted", &summary.deleted),
    ];
    for (label, names) in sections {
        if names.is_empty() {
            continue;
        }
        body.push_str(&format!("\n{label}:\n"));
        for name in names {
            body.push_str(&format!("  - {name}\n"));
        }
    }

    body
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use dropwatch_core::change::ChangeEntry;

    use super::*;

    #[test]
    fn body_lists_only_populated_sections() {
        let mut summary = ChangeSummary::default();
        summary.record(ChangeEntry::FileAdded("report.pdf".into()));
        summary.record(ChangeEntry::Removed("old.txt".into()));

        let body = format_alert_body("Alice", &summary);

        assert!(body.contains("Hi Alice,"));
        assert!(body.contains("New files:\n  - report.pdf"));
        assert!(body.contains("Deleted:\n  - old.txt"));
        assert!(!body.contains("New folders"));
    }

    #[test]
    fn body_preserves_entry_order() {
        let mut summary = ChangeSummary::default();
        summary.record(ChangeEntry::FileAdded("a.txt".into()));
        summary.record(ChangeEntry::FileAdded("b.txt".into()));

        let body = format_alert_body("Alice", &summary);
        let a = body.find("a.txt").unwrap();
        let b = body.find("b.txt").unwrap();
        assert!(a < b);
    }
}
