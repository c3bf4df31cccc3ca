use std::fmt;

use serde::Serialize;

use crate::reconciler::{AddOutcome, RemoveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// User-visible result of a bookmark action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Added,
    AlreadyBookmarked,
    SaveFailed,
    Removed,
    RemoveFailed,
    LoadFailed,
    InvalidJob,
}

impl Notice {
    pub fn level(self) -> NoticeLevel {
        match self {
            Notice::Added | Notice::Removed => NoticeLevel::Success,
            Notice::AlreadyBookmarked => NoticeLevel::Info,
            Notice::SaveFailed | Notice::RemoveFailed | Notice::LoadFailed | Notice::InvalidJob => {
                NoticeLevel::Error
            }
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::Added => "Job added to bookmarks!",
            Notice::AlreadyBookmarked => "Job already bookmarked.",
            Notice::SaveFailed => "Could not save the job.",
            Notice::Removed => "Job removed from bookmarks!",
            Notice::RemoveFailed => "Could not remove the job.",
            Notice::LoadFailed => "Could not load bookmarks.",
            Notice::InvalidJob => "Invalid job details.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Notice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire {
            level: NoticeLevel,
            message: &'static str,
        }

        Wire {
            level: self.level(),
            message: self.message(),
        }
        .serialize(serializer)
    }
}

impl From<&AddOutcome> for Notice {
    fn from(outcome: &AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added(_) => Notice::Added,
            AddOutcome::AlreadyBookmarked => Notice::AlreadyBookmarked,
        }
    }
}

// Removing something that was already gone is still a success for the user.
impl From<RemoveOutcome> for Notice {
    fn from(_: RemoveOutcome) -> Self {
        Notice::Removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(Notice::AlreadyBookmarked).unwrap();
        assert_eq!(value["level"], "info");
        assert_eq!(value["message"], "Job already bookmarked.");
    }

    #[test]
    fn test_missing_bookmark_removal_reads_as_success() {
        assert_eq!(Notice::from(RemoveOutcome::NotPresent), Notice::Removed);
        assert_eq!(Notice::from(RemoveOutcome::NotPresent).level(), NoticeLevel::Success);
    }
}
