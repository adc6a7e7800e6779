use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A student allowed to book workshop sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Row id, `None` until the student is stored.
    pub id: Option<i64>,
    /// School-issued student number, unique across students.
    pub student_id: String,
    pub full_name: String,
    pub class_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Student {
    pub fn new(student_id: &str, full_name: &str, class_name: &str) -> Self {
        Student {
            id: None,
            student_id: student_id.to_string(),
            full_name: full_name.to_string(),
            class_name: class_name.to_string(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

impl std::fmt::Display for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name, self.student_id)
    }
}
