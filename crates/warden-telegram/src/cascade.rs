// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security cascade: remove a departed editor from every project space.
//!
//! Triggered by an exit from the editors space. Each target is
//! attempted independently; one failure never aborts the run. Outcomes
//! are collected into a report posted back to the editors space.

use std::time::Duration;

use tracing::{error, info, warn};

use warden_core::types::{CascadeReport, SubjectUser};
use warden_core::ChatControl;

/// Run the removal cascade over the configured target spaces.
///
/// Empty entries and the editors space itself are skipped. A fixed
/// delay after each successful removal keeps us under the platform's
/// outbound rate limits; failed attempts and the final target get no
/// pause.
pub async fn run_cascade(
    control: &dyn ChatControl,
    subject: &SubjectUser,
    targets: &[String],
    editors_chat_id: &str,
    delay: Duration,
) -> CascadeReport {
    info!(
        user_id = subject.user_id,
        "editor left the editors space, starting removal cascade"
    );

    let mut report = CascadeReport::default();
    let eligible: Vec<&str> = targets
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && *t != editors_chat_id)
        .collect();

    for (index, &target) in eligible.iter().enumerate() {
        match control.kick_member(target, subject.user_id).await {
            Ok(()) => {
                // Title is cosmetic; fall back to the raw id.
                let title = match control.chat_title(target).await {
                    Ok(Some(title)) => title,
                    Ok(None) => target.to_string(),
                    Err(e) => {
                        warn!(chat_id = target, error = %e, "could not resolve chat title");
                        target.to_string()
                    }
                };
                report.succeeded.push(title);
                if index + 1 < eligible.len() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                error!(
                    chat_id = target,
                    user_id = subject.user_id,
                    error = %e,
                    "failed to remove user from target space"
                );
                report.failed.push(target.to_string());
            }
        }
    }

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "removal cascade finished"
    );
    report
}

/// Render the human-facing cascade report.
pub fn render_report(subject: &SubjectUser, report: &CascadeReport) -> String {
    let mut text = format!(
        "SECURITY NOTICE\n\nUser {} ({}, ID: {}) left the editors space.\n\n\
         They were automatically removed from all project spaces.",
        subject.first_name,
        subject.handle(),
        subject.user_id,
    );
    if !report.succeeded.is_empty() {
        text.push_str("\n\nRemoved from:\n- ");
        text.push_str(&report.succeeded.join("\n- "));
    }
    if !report.failed.is_empty() {
        text.push_str("\n\nCould not remove from (check bot permissions):\n- ");
        text.push_str(&report.failed.join("\n- "));
    }
    text
}

/// Post the report to the editors space. A failed send is logged and
/// dropped; the cascade itself already ran.
pub async fn send_report(control: &dyn ChatControl, editors_chat_id: &str, text: &str) {
    if let Err(e) = control.send_message(editors_chat_id, text).await {
        error!(chat_id = editors_chat_id, error = %e, "failed to deliver cascade report");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use warden_core::types::AdminInfo;
    use warden_core::WardenError;

    #[derive(Default)]
    struct MockControl {
        failing: Vec<String>,
        kicked: Mutex<Vec<String>>,
        sent: Mutex<Vec<(String, String)>>,
        send_fails: bool,
    }

    #[async_trait]
    impl ChatControl for MockControl {
        async fn kick_member(&self, chat_id: &str, _user_id: i64) -> Result<(), WardenError> {
            if self.failing.iter().any(|f| f == chat_id) {
                return Err(WardenError::Platform {
                    message: format!("no rights in {chat_id}"),
                    source: None,
                });
            }
            self.kicked.lock().unwrap().push(chat_id.to_string());
            Ok(())
        }

        async fn chat_title(&self, chat_id: &str) -> Result<Option<String>, WardenError> {
            if chat_id == "-3" {
                return Ok(None);
            }
            Ok(Some(format!("Space {chat_id}")))
        }

        async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), WardenError> {
            if self.send_fails {
                return Err(WardenError::Platform {
                    message: "send failed".into(),
                    source: None,
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn chat_administrators(
            &self,
            _chat_id: &str,
        ) -> Result<Vec<AdminInfo>, WardenError> {
            Ok(Vec::new())
        }
    }

    fn subject() -> SubjectUser {
        SubjectUser {
            user_id: 42,
            first_name: "Alice".to_string(),
            username: Some("alice".to_string()),
        }
    }

    fn targets(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn cascade_skips_empty_and_editors_entries() {
        let control = MockControl::default();
        let report = run_cascade(
            &control,
            &subject(),
            &targets(&["-1", "", "  ", "-100500", "-2"]),
            "-100500",
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(
            *control.kicked.lock().unwrap(),
            vec!["-1".to_string(), "-2".to_string()]
        );
    }

    #[tokio::test]
    async fn failures_are_collected_and_do_not_abort() {
        let control = MockControl {
            failing: targets(&["-3", "-6"]),
            ..MockControl::default()
        };
        let report = run_cascade(
            &control,
            &subject(),
            &targets(&["-1", "-2", "-3", "-4", "-5", "-6", "-7"]),
            "-100500",
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.succeeded.len(), 5);
        assert_eq!(report.failed, targets(&["-3", "-6"]));
        // Targets after a failure were still attempted.
        assert!(control.kicked.lock().unwrap().contains(&"-7".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_paces_only_between_successful_removals() {
        let control = MockControl {
            failing: targets(&["-2"]),
            ..MockControl::default()
        };
        let start = tokio::time::Instant::now();
        let report = run_cascade(
            &control,
            &subject(),
            &targets(&["-1", "-2", "-4"]),
            "-100500",
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed, targets(&["-2"]));
        // One pause after the first removal; none after the failed
        // attempt or the final target.
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn title_fallback_uses_raw_id() {
        let control = MockControl::default();
        let report = run_cascade(
            &control,
            &subject(),
            &targets(&["-3"]),
            "-100500",
            Duration::ZERO,
        )
        .await;
        assert_eq!(report.succeeded, targets(&["-3"]));
    }

    #[test]
    fn report_names_user_and_both_outcome_lists() {
        let report = CascadeReport {
            succeeded: targets(&["Space A", "Space B"]),
            failed: targets(&["-9"]),
        };
        let text = render_report(&subject(), &report);

        assert!(text.contains("Alice"));
        assert!(text.contains("@alice"));
        assert!(text.contains("ID: 42"));
        assert!(text.contains("Space A"));
        assert!(text.contains("- -9"));
        assert!(text.contains("check bot permissions"));
    }

    #[test]
    fn report_without_username_shows_na() {
        let subject = SubjectUser {
            user_id: 42,
            first_name: "Alice".to_string(),
            username: None,
        };
        let text = render_report(&subject, &CascadeReport::default());
        assert!(text.contains("N/A"));
    }

    #[tokio::test]
    async fn failed_report_send_is_swallowed() {
        let control = MockControl {
            send_fails: true,
            ..MockControl::default()
        };
        // Must not panic or propagate.
        send_report(&control, "-100500", "report").await;
    }

    #[tokio::test]
    async fn successful_report_send_targets_editors_space() {
        let control = MockControl::default();
        send_report(&control, "-100500", "report").await;
        let sent = control.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "-100500");
    }
}
