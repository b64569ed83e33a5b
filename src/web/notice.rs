use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One-shot message shown at the top of a page (the flash message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// CSS class for the alert box.
    pub fn css_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "alert-success",
            NoticeLevel::Error => "alert-danger",
        }
    }
}

/// Notice carried across a redirect as `?notice=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCode {
    Updated,
    UpdateFailed,
    Invalid,
    Deleted,
}

impl NoticeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeCode::Updated => "updated",
            NoticeCode::UpdateFailed => "update_failed",
            NoticeCode::Invalid => "invalid",
            NoticeCode::Deleted => "deleted",
        }
    }

    /// Message for `entity` ("Venue", "Artist").
    pub fn notice(&self, entity: &str) -> Notice {
        match self {
            NoticeCode::Updated => Notice::success(format!("{entity} was successfully updated!")),
            NoticeCode::UpdateFailed => {
                Notice::error(format!("An error occurred. {entity} could not be updated."))
            }
            NoticeCode::Invalid => Notice::error(format!(
                "{entity} was not updated: some fields were missing or invalid."
            )),
            NoticeCode::Deleted => Notice::success(format!("{entity} was successfully deleted!")),
        }
    }

    /// Parse an optional query value; unknown codes are ignored.
    pub fn from_query(raw: Option<&str>, entity: &str) -> Option<Notice> {
        raw.and_then(|r| r.parse::<NoticeCode>().ok())
            .map(|code| code.notice(entity))
    }
}

impl FromStr for NoticeCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated" => Ok(NoticeCode::Updated),
            "update_failed" => Ok(NoticeCode::UpdateFailed),
            "invalid" => Ok(NoticeCode::Invalid),
            "deleted" => Ok(NoticeCode::Deleted),
            _ => Err(()),
        }
    }
}
