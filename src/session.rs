use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::call_note;
use crate::history::HistoryLog;

// ---------------------------------------------------------------------------
// Caller type
// ---------------------------------------------------------------------------

/// Who is on the line. Selects which family of flows is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerType {
    AccountHolder,
    AuthorizedUser,
    OtherUser,
}

impl CallerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountHolder => "account_holder",
            Self::AuthorizedUser => "authorized_user",
            Self::OtherUser => "other_user",
        }
    }
}

impl fmt::Display for CallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "account_holder" => Ok(Self::AccountHolder),
            "authorized_user" => Ok(Self::AuthorizedUser),
            "other_user" => Ok(Self::OtherUser),
            other => anyhow::bail!(
                "unknown caller type '{other}' (expected account_holder, authorized_user or other_user)"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Fields captured before any flow starts. All optional: the call note
/// prints a placeholder for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub caller_type: Option<CallerType>,
    pub calling_number: Option<String>,
    pub issue_number: Option<String>,
    pub customer_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Variables collected by input nodes during the call.
///
/// Only grows: values are overwritten, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, String>);

impl Context {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Call session
// ---------------------------------------------------------------------------

/// Everything one call owns. The hosting layer keeps this alive (and
/// serialized, if it is stateless) for the length of the call and hands it
/// to the interpreter on every operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub identity: CallerIdentity,
    pub context: Context,
    pub history: HistoryLog,
    /// Names of the authentication checks the agent ticked, e.g. `dob_check`.
    pub auth_checks: Vec<String>,
    pub auth_failure_reason: Option<String>,
}

impl CallSession {
    pub fn new(identity: CallerIdentity) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    pub fn call_note(&self) -> String {
        call_note::generate_call_note(
            &self.identity,
            &self.auth_checks,
            self.auth_failure_reason.as_deref(),
            self.history.entries(),
        )
    }

    pub fn auth_failure_note(&self) -> String {
        call_note::generate_auth_failure_note(&self.identity, self.auth_failure_reason.as_deref())
    }
}
