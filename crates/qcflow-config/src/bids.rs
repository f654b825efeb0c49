//! BIDS identifier and artifact-name helpers.

/// Participant label as the QC tool expects it: the subject ID with its
/// `sub-` prefix stripped.
pub fn participant_label(subject: &str) -> &str {
  subject.strip_prefix("sub-").unwrap_or(subject)
}

/// Session label with the `ses-` prefix stripped.
pub fn session_label(session: &str) -> &str {
  session.strip_prefix("ses-").unwrap_or(session)
}

/// Name of the subject-level report artifact. Existence of this file in the
/// project derivatives directory is the completion signal for a run.
pub fn subject_report_name(subject: &str, session: &str) -> String {
  format!("{subject}_{session}_T1w.html")
}

/// Scheduler job name for one subject/session QC run.
pub fn job_name(subject: &str, session: &str) -> String {
  format!(
    "{}s{}_mriqc",
    participant_label(subject),
    session_label(session)
  )
}
