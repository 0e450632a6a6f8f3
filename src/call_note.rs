use crate::history::HistoryEntry;
use crate::session::CallerIdentity;

const TITLE: &str = "TalkMobile Customer Care Call Summary";
const RULE: &str = "------------------------------------";
const MISSING: &str = "N/A";

// ---------------------------------------------------------------------------
// Call note
// ---------------------------------------------------------------------------

/// Build the plain-text summary pasted into the customer record at the end
/// of a call. Pure: same inputs, same bytes.
pub fn generate_call_note(
    identity: &CallerIdentity,
    auth_checks: &[String],
    auth_failure_reason: Option<&str>,
    history: &[HistoryEntry],
) -> String {
    let mut lines = header(identity);

    lines.push("Authentication:".into());
    if auth_checks.is_empty() {
        lines.push("- Not completed".into());
    } else {
        for check in auth_checks {
            lines.push(format!("- {}: Passed", humanize(check)));
        }
    }

    if let Some(reason) = auth_failure_reason.filter(|r| !r.is_empty()) {
        lines.push(String::new());
        lines.push("Authentication Failure Reason:".into());
        lines.push(format!("- {reason}"));
    }

    lines.push(String::new());
    lines.push("Actions & Flow History:".into());
    for entry in history {
        lines.push(action_line(entry));

        if let Some(script) = entry.extended_text.as_deref().filter(|t| !t.is_empty()) {
            lines.push("  [AGREEMENT SCRIPT READ]:".into());
            lines.push(format!("  \"{script}\""));
        }
    }

    lines.push(String::new());
    lines.push("Call completed.".into());

    lines.join("\n")
}

/// Note for a call that stopped at authentication. No flow history: nothing
/// was done on the account.
pub fn generate_auth_failure_note(identity: &CallerIdentity, reason: Option<&str>) -> String {
    let mut lines = header(identity);

    lines.push("Authentication:".into());
    lines.push("Authentication FAILED".into());
    lines.push(format!(
        "Failure Reason: {}",
        reason.filter(|r| !r.is_empty()).unwrap_or("Authentication failed")
    ));
    lines.push(String::new());

    lines.push("Outcome:".into());
    lines.push("Customer advised to verify details and call back.".into());
    lines.push("No account actions performed.".into());

    lines.join("\n")
}

fn header(identity: &CallerIdentity) -> Vec<String> {
    let field = |value: Option<&str>| value.unwrap_or(MISSING).to_string();

    vec![
        TITLE.into(),
        RULE.into(),
        format!(
            "Caller type: {}",
            field(identity.caller_type.as_ref().map(|c| c.as_str()))
        ),
        format!("Calling from: {}", field(identity.calling_number.as_deref())),
        format!("Number discussed: {}", field(identity.issue_number.as_deref())),
        format!("Customer Name: {}", field(identity.customer_name.as_deref())),
        String::new(),
    ]
}

fn action_line(entry: &HistoryEntry) -> String {
    let input = entry.input_value.as_deref().filter(|v| !v.is_empty());
    let label = entry.choice_label.as_deref().filter(|l| !l.is_empty());

    match input.or(label) {
        Some(detail) => format!("- {}: {detail}", entry.message),
        None => format!("- {}", entry.message),
    }
}

/// `dob_check` -> `Dob Check`. Letters following a non-letter start a new
/// word, so `addr_2slq` becomes `Addr 2Slq`.
fn humanize(check: &str) -> String {
    let mut out = String::with_capacity(check.len());
    let mut prev_letter = false;
    for c in check.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::session::CallerType;

    fn identity() -> CallerIdentity {
        CallerIdentity {
            caller_type: Some(CallerType::AccountHolder),
            calling_number: Some("07700900123".into()),
            issue_number: Some("07700900456".into()),
            customer_name: Some("Ava Jones".into()),
        }
    }

    fn entry(message: &str) -> HistoryEntry {
        HistoryEntry {
            message: message.into(),
            ..HistoryEntry::default()
        }
    }

    #[test]
    fn test_full_note() {
        let history = vec![
            HistoryEntry {
                choice_label: Some("Yes".into()),
                ..entry("Checked ID")
            },
            entry("Resolved issue"),
        ];
        let checks = vec!["name_check".to_string()];

        let note = generate_call_note(&identity(), &checks, None, &history);
        assert_eq!(
            note,
            "TalkMobile Customer Care Call Summary\n\
             ------------------------------------\n\
             Caller type: account_holder\n\
             Calling from: 07700900123\n\
             Number discussed: 07700900456\n\
             Customer Name: Ava Jones\n\
             \n\
             Authentication:\n\
             - Name Check: Passed\n\
             \n\
             Actions & Flow History:\n\
             - Checked ID: Yes\n\
             - Resolved issue\n\
             \n\
             Call completed."
        );
        assert_eq!(
            note,
            generate_call_note(&identity(), &checks, None, &history)
        );
    }

    #[test]
    fn test_input_wins_over_label() {
        let history = vec![
            HistoryEntry {
                input_value: Some("12".into()),
                choice_label: Some("ignored".into()),
                ..entry("30 Day Plan Price")
            },
            HistoryEntry {
                input_value: Some(String::new()),
                ..entry("Empty input")
            },
        ];
        let note = generate_call_note(&identity(), &[], None, &history);
        assert!(note.contains("- 30 Day Plan Price: 12\n"));
        assert!(note.contains("- Empty input\n"));
    }

    #[test]
    fn test_missing_auth_and_identity() {
        let note = generate_call_note(&CallerIdentity::default(), &[], None, &[]);
        assert!(note.contains("Caller type: N/A\n"));
        assert!(note.contains("Customer Name: N/A\n"));
        assert!(note.contains("Authentication:\n- Not completed\n"));
        assert!(!note.contains("Failure Reason"));
        assert!(note.ends_with("Actions & Flow History:\n\nCall completed."));
    }

    #[test]
    fn test_failure_reason_section() {
        let checks = vec!["dob_check".to_string(), "addr_2slq".to_string()];
        let note = generate_call_note(
            &identity(),
            &checks,
            Some("Authentication failed"),
            &[],
        );
        assert!(note.contains(
            "- Dob Check: Passed\n\
             - Addr 2Slq: Passed\n\
             \n\
             Authentication Failure Reason:\n\
             - Authentication failed\n"
        ));
    }

    #[test]
    fn test_agreement_script_block() {
        let history = vec![HistoryEntry {
            extended_text: Some("You agree to pay £12 per month.".into()),
            ..entry("Read TnC Script")
        }];
        let note = generate_call_note(&identity(), &[], None, &history);
        assert!(note.contains(
            "- Read TnC Script\n  [AGREEMENT SCRIPT READ]:\n  \"You agree to pay £12 per month.\"\n"
        ));
    }

    #[test]
    fn test_auth_failure_note() {
        let note = generate_auth_failure_note(
            &identity(),
            Some("First and Last Name verification failed"),
        );
        assert!(note.contains(
            "Authentication:\n\
             Authentication FAILED\n\
             Failure Reason: First and Last Name verification failed\n"
        ));
        assert!(note.ends_with("No account actions performed."));

        let default = generate_auth_failure_note(&identity(), None);
        assert!(default.contains("Failure Reason: Authentication failed\n"));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("name_check"), "Name Check");
        assert_eq!(humanize("DOB_EGAIN"), "Dob Egain");
        assert_eq!(humanize("addr_otac"), "Addr Otac");
    }
}
