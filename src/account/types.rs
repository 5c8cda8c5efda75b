//! Account and session record types.
//!
//! [`User`] carries the usage counters, [`SessionRecord`] is one stored voice
//! session, and [`UsageSnapshot`] is the view of the counters handed to clients.
//! Everything serializes in camelCase, which is what the web client reads.

use serde::{Deserialize, Serialize};

/// A user row, matching the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity provider's user id.
    pub id: String,
    pub name: String,
    pub email: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub free_trial_used: i64,
    pub free_trial_limit: i64,
    /// Purchased calls not yet consumed. Can go negative, see [`UsageAction::UsePremiumCall`].
    pub premium_calls_remaining: i64,
    /// Calls purchased over the account's lifetime.
    pub premium_calls_total: i64,
}

/// Fields needed to create a user on first sight.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A stored voice session, matching the `history` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    /// Owning user id.
    pub created_by: Option<String>,
    /// Raw transcript, one `speaker: text` line per message.
    pub notes: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "sentimentAnalysis")]
    pub sentiment: Option<String>,
    /// Elapsed call time as `HH:MM:SS`.
    pub duration: Option<String>,
    pub created_at: String,
}

/// Client view of a user's usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub free_trial_used: i64,
    pub free_trial_limit: i64,
    pub premium_calls_remaining: i64,
    pub premium_calls_total: i64,
    pub is_premium: bool,
}

/// Why a new session may not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDenial {
    PremiumExhausted,
    FreeTrialExhausted { limit: i64 },
}

impl std::fmt::Display for UsageDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PremiumExhausted => f.write_str(
                "You've used all your premium calls. Please add more calls to continue.",
            ),
            Self::FreeTrialExhausted { limit } => write!(
                f,
                "You've used all {limit} free trial sessions. Upgrade to premium to continue."
            ),
        }
    }
}

impl UsageSnapshot {
    /// Premium balance first, then the free trial.
    pub fn check_can_start(&self) -> Result<(), UsageDenial> {
        if self.premium_calls_remaining > 0 || self.free_trial_used < self.free_trial_limit {
            return Ok(());
        }
        if self.premium_calls_total > 0 {
            Err(UsageDenial::PremiumExhausted)
        } else {
            Err(UsageDenial::FreeTrialExhausted {
                limit: self.free_trial_limit,
            })
        }
    }

    /// The action that pays for one completed session.
    pub fn consuming_action(&self) -> UsageAction {
        if self.is_premium {
            UsageAction::UsePremiumCall
        } else {
            UsageAction::UseFreeCall
        }
    }
}

impl From<&User> for UsageSnapshot {
    fn from(user: &User) -> Self {
        Self {
            free_trial_used: user.free_trial_used,
            free_trial_limit: user.free_trial_limit,
            premium_calls_remaining: user.premium_calls_remaining,
            premium_calls_total: user.premium_calls_total,
            is_premium: user.premium_calls_remaining > 0,
        }
    }
}

/// Largest `calls` accepted by one `addPremiumCalls`. Keeps the counters far
/// from the SQLite integer range.
pub const MAX_PREMIUM_CALLS_PER_PURCHASE: i64 = 1_000_000;

/// A counter mutation requested through the subscription endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageAction {
    /// Increment `free_trial_used`.
    UseFreeCall,
    /// Add to both `premium_calls_remaining` and `premium_calls_total`.
    AddPremiumCalls(i64),
    /// Decrement `premium_calls_remaining`. No floor at zero.
    UsePremiumCall,
}

impl UsageAction {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UseFreeCall => "useFreeCall",
            Self::AddPremiumCalls(_) => "addPremiumCalls",
            Self::UsePremiumCall => "usePremiumCall",
        }
    }

    /// Build an action from its wire name and the optional `calls` count
    /// (missing counts as 0).
    pub fn parse(action: &str, calls: Option<i64>) -> Result<Self, String> {
        match action {
            "useFreeCall" => Ok(Self::UseFreeCall),
            "usePremiumCall" => Ok(Self::UsePremiumCall),
            "addPremiumCalls" => {
                let calls = calls.unwrap_or(0);
                if calls < 0 {
                    return Err(format!("calls must not be negative: {calls}"));
                }
                if calls > MAX_PREMIUM_CALLS_PER_PURCHASE {
                    return Err(format!(
                        "calls must be at most {MAX_PREMIUM_CALLS_PER_PURCHASE}: {calls}"
                    ));
                }
                Ok(Self::AddPremiumCalls(calls))
            }
            _ => Err("Invalid action".to_string()),
        }
    }
}

impl std::fmt::Display for UsageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
