use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadType {
    Video,
    File,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Lecture {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content_url: String,
    pub upload_type: UploadType,
    pub sequence: i32,
    pub open_at: DateTime<Utc>,
}

/// Join record binding a Lecture to one challenge (cohort). The open
/// timestamp here, not the Lecture's own, is the effective one for the
/// cohort: the same Lecture can be reused across cohorts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChallengeLecture {
    pub id: i64,
    pub challenge_id: i64,
    pub open_at: DateTime<Utc>,
    pub lecture: Lecture,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Submission {
    pub id: i64,
    pub student_id: i64,
    pub challenge_lecture_id: i64,
    pub url: String,
    pub comment: String,
    pub image_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BulkEmailReq {
    pub template_id: String,
    /// Defaults to the whole roster when omitted.
    pub student_ids: Option<Vec<i64>>,
}
