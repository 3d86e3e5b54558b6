// Per-student submission state and the roster-wide rates the admin
// dashboard shows. A submission exists for (student, challenge lecture)
// or it does not; there is no partial state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ChallengeLecture, Submission};

#[serde_with::skip_serializing_none]
#[derive(Serialize, Debug, Clone)]
pub struct SubmissionStatus {
    pub challenge_lecture_id: i64,
    pub lecture_name: String,
    pub open_at: DateTime<Utc>,
    pub submitted: bool,
    pub submission_id: Option<i64>,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct StatusReport {
    pub per_lecture: Vec<SubmissionStatus>,
    pub is_all_submitted: bool,
}

impl StatusReport {
    /// What refund-eligibility screens get when the submission lookup
    /// fails upstream: fails closed instead of surfacing an error.
    pub fn safe_default() -> Self {
        StatusReport {
            per_lecture: Vec::new(),
            is_all_submitted: false,
        }
    }
}

/// `is_all_submitted` requires a non-empty lecture list: a student with
/// zero assigned lectures is not refund-eligible, so the vacuous-truth
/// reading of "all submitted" is deliberately rejected here.
pub fn compute_status(
    student_id: i64,
    lectures: &[ChallengeLecture],
    submissions: &[Submission],
) -> StatusReport {
    let per_lecture: Vec<SubmissionStatus> = lectures
        .iter()
        .map(|cl| {
            let found = submissions
                .iter()
                .find(|s| s.student_id == student_id && s.challenge_lecture_id == cl.id);
            match found {
                Some(s) => SubmissionStatus {
                    challenge_lecture_id: cl.id,
                    lecture_name: cl.lecture.name.clone(),
                    open_at: cl.open_at,
                    submitted: true,
                    submission_id: Some(s.id),
                    url: Some(s.url.clone()),
                    comment: Some(s.comment.clone()),
                    image_url: s.image_url.clone(),
                },
                None => SubmissionStatus {
                    challenge_lecture_id: cl.id,
                    lecture_name: cl.lecture.name.clone(),
                    open_at: cl.open_at,
                    submitted: false,
                    submission_id: None,
                    url: None,
                    comment: None,
                    image_url: None,
                },
            }
        })
        .collect();

    let is_all_submitted = !per_lecture.is_empty() && per_lecture.iter().all(|s| s.submitted);
    StatusReport {
        per_lecture,
        is_all_submitted,
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct LectureRate {
    pub challenge_lecture_id: i64,
    pub lecture_name: String,
    pub submitted_count: usize,
    pub rate: f64,
}

/// Submission rate per lecture, counting distinct students. A student
/// who somehow submitted twice for one lecture still counts once.
pub fn submission_rates(
    lectures: &[ChallengeLecture],
    submissions: &[Submission],
    roster_size: usize,
) -> Vec<LectureRate> {
    lectures
        .iter()
        .map(|cl| {
            let students: HashSet<i64> = submissions
                .iter()
                .filter(|s| s.challenge_lecture_id == cl.id)
                .map(|s| s.student_id)
                .collect();
            let submitted_count = students.len();
            let rate = if roster_size == 0 {
                0.0
            } else {
                submitted_count as f64 / roster_size as f64
            };
            LectureRate {
                challenge_lecture_id: cl.id,
                lecture_name: cl.lecture.name.clone(),
                submitted_count,
                rate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lecture, UploadType};
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn cl(id: i64, seq: i32) -> ChallengeLecture {
        ChallengeLecture {
            id,
            challenge_id: 1,
            open_at: ts("2024-03-20T09:00:00Z"),
            lecture: Lecture {
                id: id * 10,
                name: format!("lecture {seq}"),
                description: None,
                content_url: "https://videos.example.com/1".into(),
                upload_type: UploadType::Video,
                sequence: seq,
                open_at: ts("2024-03-20T09:00:00Z"),
            },
        }
    }

    fn sub(id: i64, student_id: i64, challenge_lecture_id: i64) -> Submission {
        Submission {
            id,
            student_id,
            challenge_lecture_id,
            url: format!("https://blog.example.com/post/{id}"),
            comment: "done".into(),
            image_url: None,
            submitted_at: ts("2024-03-20T12:00:00Z"),
        }
    }

    #[test]
    fn partial_submissions_are_not_all_submitted() {
        let lectures = vec![cl(1, 1), cl(2, 2), cl(3, 3)];
        let submissions = vec![sub(100, 7, 1), sub(101, 7, 2)];
        let report = compute_status(7, &lectures, &submissions);
        assert_eq!(report.per_lecture.len(), 3);
        assert!(!report.is_all_submitted);
        assert!(!report.per_lecture[2].submitted);
        assert_eq!(report.per_lecture[0].submission_id, Some(100));
        assert_eq!(
            report.per_lecture[0].url.as_deref(),
            Some("https://blog.example.com/post/100")
        );
    }

    #[test]
    fn another_students_submission_does_not_count() {
        let lectures = vec![cl(1, 1)];
        let submissions = vec![sub(100, 8, 1)];
        let report = compute_status(7, &lectures, &submissions);
        assert!(!report.per_lecture[0].submitted);
        assert!(!report.is_all_submitted);
    }

    #[test]
    fn complete_submissions_gate_open() {
        let lectures = vec![cl(1, 1), cl(2, 2)];
        let submissions = vec![sub(100, 7, 1), sub(101, 7, 2)];
        assert!(compute_status(7, &lectures, &submissions).is_all_submitted);
    }

    #[test]
    fn empty_lecture_list_is_never_all_submitted() {
        let report = compute_status(7, &[], &[]);
        assert!(report.per_lecture.is_empty());
        assert!(!report.is_all_submitted);
    }

    #[test]
    fn rates_count_distinct_students() {
        let lectures = vec![cl(1, 1), cl(2, 2)];
        let submissions = vec![sub(100, 7, 1), sub(101, 7, 1), sub(102, 8, 1)];
        let rates = submission_rates(&lectures, &submissions, 4);
        assert_eq!(rates[0].submitted_count, 2);
        assert!((rates[0].rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(rates[1].submitted_count, 0);
    }

    #[test]
    fn rates_with_empty_roster_are_zero() {
        let rates = submission_rates(&[cl(1, 1)], &[sub(100, 7, 1)], 0);
        assert_eq!(rates[0].rate, 0.0);
    }
}
