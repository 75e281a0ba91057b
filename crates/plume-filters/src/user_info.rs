//! Inlet filter: personalize the system prompt with user profile details.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use plume_host::{ChatBody, UserRecord};
use serde::Deserialize;

/// Filter-level settings, shared across users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInfoFilterSettings {
    /// Extra tracing detail.
    pub debug: bool,
}

/// Per-user profile settings surfaced to the host's settings UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserProfileSettings {
    /// Birth date as "DD/MM/YYYY", "YYYY-MM-DD", "DD-MM-YYYY" or "DD.MM.YYYY".
    pub birth_date: Option<String>,

    /// Comma-separated list of liked things.
    pub likes: Option<String>,

    /// Comma-separated list of disliked things.
    pub dislikes: Option<String>,

    pub favorite_color: Option<String>,

    /// How the user relates to the assistant (e.g. "developer", "captain").
    pub status: Option<String>,

    /// Comma-separated nicknames the assistant may use.
    pub nicknames: Option<String>,

    pub gender: Option<String>,

    pub pronouns: Option<String>,

    /// Free-form extra notes.
    pub notes: Option<String>,

    /// IANA timezone used to stamp the current date and time.
    pub timezone: Option<String>,
}

/// Normalize a birth date across the accepted formats to "DD/MM/YYYY".
fn format_birth_date(raw: &str) -> Option<String> {
    for format in ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), format) {
            return Some(date.format("%d/%m/%Y").to_string());
        }
    }
    None
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Current date-time in the configured timezone, UTC when the identifier is
/// absent or unknown.
fn stamp_datetime(now: DateTime<Utc>, timezone: Option<&str>) -> String {
    match timezone.and_then(|tz| tz.parse::<Tz>().ok()) {
        Some(tz) => now.with_timezone(&tz).format("%d/%m/%Y %H:%M (%Z)").to_string(),
        None => now.format("%d/%m/%Y %H:%M (UTC)").to_string(),
    }
}

/// The user-info inlet filter.
#[derive(Debug, Clone, Default)]
pub struct UserInfoFilter {
    settings: UserInfoFilterSettings,
}

impl UserInfoFilter {
    pub fn new(settings: UserInfoFilterSettings) -> Self {
        Self { settings }
    }

    /// Inlet entry point.
    ///
    /// Builds a system message from the user record and profile settings and
    /// prepends it to the conversation. Never fails the request.
    pub fn inlet(&self, mut body: ChatBody, user: Option<&UserRecord>, now: DateTime<Utc>) -> ChatBody {
        let profile: UserProfileSettings =
            user.map(UserRecord::settings_or_default).unwrap_or_default();

        let mut lines = vec![
            "------ USER INFO ------".to_string(),
            "Known details about the user:".to_string(),
        ];
        if let Some(user) = user {
            if let Some(name) = &user.name {
                lines.push(format!("- Name: {}", name));
            }
            if let Some(email) = &user.email {
                lines.push(format!("- Email: {}", email));
            }
            if let Some(role) = &user.role {
                lines.push(format!("- Role: {}", role));
            }
        }
        if let Some(gender) = &profile.gender {
            lines.push(format!("- Gender: {}", gender));
        }
        if let Some(pronouns) = &profile.pronouns {
            lines.push(format!("- Pronouns: {}", pronouns));
        }
        if let Some(birth_date) = profile.birth_date.as_deref().and_then(format_birth_date) {
            lines.push(format!("- Birth date: {}", birth_date));
        }

        let mut preferences = Vec::new();
        if let Some(likes) = profile.likes.as_deref().map(split_list).filter(|l| !l.is_empty()) {
            preferences.push(format!("- Likes: {}", likes.join(", ")));
        }
        if let Some(dislikes) =
            profile.dislikes.as_deref().map(split_list).filter(|l| !l.is_empty())
        {
            preferences.push(format!("- Dislikes: {}", dislikes.join(", ")));
        }
        if let Some(color) = &profile.favorite_color {
            preferences.push(format!("- Favorite color: {}", color));
        }
        if !preferences.is_empty() {
            lines.push("Personal preferences:".to_string());
            lines.extend(preferences);
        }

        if let Some(status) = &profile.status {
            lines.push(format!("The user is, relative to you: {}", status));
        }
        if let Some(nicknames) =
            profile.nicknames.as_deref().map(split_list).filter(|l| !l.is_empty())
        {
            lines.push(format!(
                "Depending on context, you may call them: {}",
                nicknames.join(", ")
            ));
        }
        if let Some(notes) = &profile.notes {
            lines.push(format!("Additional notes from the user: {}", notes));
        }
        lines.push(format!(
            "Current date and time: {}",
            stamp_datetime(now, profile.timezone.as_deref())
        ));
        lines.push(
            "Use these details to personalize your answers and to answer questions \
             about the user or the current date and time directly."
                .to_string(),
        );

        let message = lines.join("\n");
        if self.settings.debug {
            tracing::debug!("system message:\n{}", message);
        }
        body.prepend_system_message(message);
        body
    }
}
