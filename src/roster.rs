// In-memory stand-in for the real student database. Handlers talk to the
// trait so a persistent implementation can slot in without touching them.

use std::sync::Mutex;

use crate::models::{Student, StudentForm};

pub trait StudentRepo: Send + Sync {
    /// Snapshot copy, never a handle to live state.
    fn get_all(&self) -> Vec<Student>;
    fn find_by_id(&self, id: i64) -> Option<Student>;
    /// `exclude_id` supports "find a duplicate other than myself" during
    /// edit flows.
    fn find_by_email(&self, email: &str, exclude_id: Option<i64>) -> Option<Student>;
    fn add(&self, form: StudentForm) -> Student;
    /// Replaces the record in place, preserving id. `None` when missing.
    fn update(&self, id: i64, form: StudentForm) -> Option<Student>;
    /// Removes and returns the record. `None` when missing.
    fn delete(&self, id: i64) -> Option<Student>;
}

pub struct InMemoryRoster {
    students: Mutex<Vec<Student>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        InMemoryRoster {
            students: Mutex::new(Vec::new()),
        }
    }

    pub fn with_demo_data() -> Self {
        let seed = vec![
            Student {
                id: 1,
                name: "Kim Jiwoo".into(),
                email: "jiwoo@example.com".into(),
                phone: "010-1234-5678".into(),
            },
            Student {
                id: 2,
                name: "Lee Mina".into(),
                email: "mina@example.com".into(),
                phone: "010-2345-6789".into(),
            },
            Student {
                id: 3,
                name: "Park Dohyun".into(),
                email: "dohyun@example.com".into(),
                phone: "010-3456-7890".into(),
            },
        ];
        InMemoryRoster {
            students: Mutex::new(seed),
        }
    }
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentRepo for InMemoryRoster {
    fn get_all(&self) -> Vec<Student> {
        self.students.lock().unwrap().clone()
    }

    fn find_by_id(&self, id: i64) -> Option<Student> {
        self.students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn find_by_email(&self, email: &str, exclude_id: Option<i64>) -> Option<Student> {
        self.students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.email == email && Some(s.id) != exclude_id)
            .cloned()
    }

    fn add(&self, form: StudentForm) -> Student {
        let mut students = self.students.lock().unwrap();
        let id = students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let student = Student {
            id,
            name: form.name,
            email: form.email,
            phone: form.phone,
        };
        students.push(student.clone());
        student
    }

    fn update(&self, id: i64, form: StudentForm) -> Option<Student> {
        let mut students = self.students.lock().unwrap();
        let idx = students.iter().position(|s| s.id == id)?;
        let student = Student {
            id,
            name: form.name,
            email: form.email,
            phone: form.phone,
        };
        students[idx] = student.clone();
        Some(student)
    }

    fn delete(&self, id: i64) -> Option<Student> {
        let mut students = self.students.lock().unwrap();
        let idx = students.iter().position(|s| s.id == id)?;
        Some(students.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str) -> StudentForm {
        StudentForm {
            name: name.into(),
            email: email.into(),
            phone: "010-1234-5678".into(),
        }
    }

    #[test]
    fn add_then_find_round_trips() {
        let roster = InMemoryRoster::new();
        let created = roster.add(form("Kim Jiwoo", "jiwoo@example.com"));
        assert_eq!(created.id, 1);
        let found = roster.find_by_id(created.id).unwrap();
        assert_eq!(found.name, "Kim Jiwoo");
        assert_eq!(found.email, "jiwoo@example.com");
        assert_eq!(found.phone, "010-1234-5678");
    }

    #[test]
    fn id_assignment_is_max_plus_one() {
        let roster = InMemoryRoster::new();
        let a = roster.add(form("A", "a@x.co"));
        let b = roster.add(form("B", "b@x.co"));
        assert_eq!(b.id, 2);
        roster.delete(b.id);
        // max remaining id is 1, so the next id reuses 2
        let c = roster.add(form("C", "c@x.co"));
        assert_eq!(c.id, 2);
        assert!(roster.find_by_id(a.id).is_some());
    }

    #[test]
    fn find_by_email_skips_excluded_id() {
        let roster = InMemoryRoster::new();
        let a = roster.add(form("A", "a@x.co"));
        assert!(roster.find_by_email("a@x.co", None).is_some());
        assert!(roster.find_by_email("a@x.co", Some(a.id)).is_none());
        assert!(roster.find_by_email("a@x.co", Some(a.id + 1)).is_some());
    }

    #[test]
    fn update_preserves_id_and_signals_missing() {
        let roster = InMemoryRoster::new();
        let a = roster.add(form("A", "a@x.co"));
        let updated = roster.update(a.id, form("A2", "a2@x.co")).unwrap();
        assert_eq!(updated.id, a.id);
        assert_eq!(roster.find_by_id(a.id).unwrap().email, "a2@x.co");
        assert!(roster.update(999, form("X", "x@x.co")).is_none());
    }

    #[test]
    fn delete_missing_is_a_noop() {
        let roster = InMemoryRoster::new();
        roster.add(form("A", "a@x.co"));
        assert!(roster.delete(999).is_none());
        assert_eq!(roster.get_all().len(), 1);
    }

    #[test]
    fn get_all_is_a_defensive_copy() {
        let roster = InMemoryRoster::new();
        roster.add(form("A", "a@x.co"));
        let mut snapshot = roster.get_all();
        snapshot.clear();
        assert_eq!(roster.get_all().len(), 1);
    }
}
