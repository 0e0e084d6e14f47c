use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementStatus {
    Draft,
    Published,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobAnnouncement {
    pub id: Uuid,
    pub academic_year_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: AnnouncementStatus,
    pub publication_date: Option<DateTime<Utc>>,
    pub closing_date: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobAnnouncement {
    /// The announcement window: [publication_date, closing_date) while PUBLISHED.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == AnnouncementStatus::Published
            && self
                .publication_date
                .map(|published| published <= now)
                .unwrap_or(false)
            && now < self.closing_date
    }

    pub fn can_be_published(&self, now: DateTime<Utc>) -> bool {
        self.status == AnnouncementStatus::Draft
            && !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.closing_date > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(status: AnnouncementStatus) -> JobAnnouncement {
        let now = Utc::now();
        JobAnnouncement {
            id: Uuid::new_v4(),
            academic_year_id: Uuid::new_v4(),
            title: "Lecturer in Computer Science".to_string(),
            description: "Teaching and research position".to_string(),
            status,
            publication_date: Some(now - Duration::days(1)),
            closing_date: now + Duration::days(30),
            created_by: Uuid::new_v4(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    #[test]
    fn published_announcement_inside_window_is_open() {
        let ann = announcement(AnnouncementStatus::Published);
        assert!(ann.is_open(Utc::now()));
    }

    #[test]
    fn draft_and_closed_are_never_open() {
        assert!(!announcement(AnnouncementStatus::Draft).is_open(Utc::now()));
        assert!(!announcement(AnnouncementStatus::Closed).is_open(Utc::now()));
    }

    #[test]
    fn window_boundaries() {
        let ann = announcement(AnnouncementStatus::Published);
        let published = ann.publication_date.unwrap();

        // open exactly at publication
        assert!(ann.is_open(published));
        // closed exactly at closing date (half-open interval)
        assert!(!ann.is_open(ann.closing_date));
        // not yet open before publication
        assert!(!ann.is_open(published - Duration::seconds(1)));
    }

    #[test]
    fn unpublished_date_means_not_open() {
        let mut ann = announcement(AnnouncementStatus::Published);
        ann.publication_date = None;
        assert!(!ann.is_open(Utc::now()));
    }

    #[test]
    fn publishable_requires_draft_fields_and_future_closing() {
        let now = Utc::now();
        let mut ann = announcement(AnnouncementStatus::Draft);
        assert!(ann.can_be_published(now));

        ann.title = "   ".to_string();
        assert!(!ann.can_be_published(now));

        let mut ann = announcement(AnnouncementStatus::Draft);
        ann.closing_date = now - Duration::hours(1);
        assert!(!ann.can_be_published(now));

        let ann = announcement(AnnouncementStatus::Published);
        assert!(!ann.can_be_published(now));
    }
}
