use super::db::{Db, Table};
use super::live::LiveQuery;
use crate::libs::error::{Entity, WorkshopError, WorkshopResult};
use crate::libs::messages::Message;
use crate::libs::student::Student;
use crate::libs::validation::{is_blank, is_valid_email, ValidationResult};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::debug;

const STUDENT_COLUMNS: &str = "id, student_id, full_name, class_name, email, phone, address, is_active, created_at, updated_at";
const INSERT_STUDENT: &str = "INSERT INTO students (student_id, full_name, class_name, email, phone, address, is_active, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime(CURRENT_TIMESTAMP, 'localtime'), datetime(CURRENT_TIMESTAMP, 'localtime'))";
const UPDATE_STUDENT: &str = "UPDATE students
    SET student_id = ?2, full_name = ?3, class_name = ?4, email = ?5, phone = ?6, address = ?7, is_active = ?8,
        updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
const UPDATE_ACTIVE: &str = "UPDATE students SET is_active = ?2, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime') WHERE id = ?1";
const DELETE_STUDENT: &str = "DELETE FROM students WHERE id = ?1";
const WHERE_ID: &str = "WHERE id = ?1";
const WHERE_STUDENT_ID: &str = "WHERE student_id = ?1";
const WHERE_ACTIVE: &str = "WHERE is_active = 1";
const WHERE_CLASS: &str = "WHERE class_name = ?1";
const WHERE_SEARCH: &str = "WHERE full_name LIKE '%' || ?1 || '%' OR student_id LIKE '%' || ?1 || '%'";
const ORDER_BY_NAME: &str = "ORDER BY full_name";
const SELECT_CLASSES: &str = "SELECT DISTINCT class_name FROM students WHERE is_active = 1 ORDER BY class_name";
const COUNT_STUDENTS: &str = "SELECT COUNT(*) FROM students";
const COUNT_ACTIVE_STUDENTS: &str = "SELECT COUNT(*) FROM students WHERE is_active = 1";
const COUNT_STUDENT_ID_TAKEN: &str = "SELECT COUNT(*) FROM students WHERE student_id = ?1 AND id != ?2";
const COUNT_RUNNING_SESSIONS: &str = "SELECT COUNT(*) FROM workshop_sessions WHERE student_id = ?1 AND status = 'IN_PROGRESS'";

fn select(filter: &str) -> String {
    format!("SELECT {} FROM students {} {}", STUDENT_COLUMNS, filter, ORDER_BY_NAME)
}

fn map_student(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        student_id: row.get(1)?,
        full_name: row.get(2)?,
        class_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        address: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn query_students<P: Params>(conn: &Connection, sql: &str, params: P) -> WorkshopResult<Vec<Student>> {
    let mut stmt = conn.prepare(sql)?;
    let students = stmt.query_map(params, map_student)?.collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

pub(crate) fn student_by_id(conn: &Connection, id: i64) -> WorkshopResult<Option<Student>> {
    let student = conn.query_row(&select(WHERE_ID), params![id], map_student).optional()?;
    Ok(student)
}

/// Repository for the `students` table.
#[derive(Clone)]
pub struct Students {
    db: Db,
}

impl Students {
    pub fn new(db: &Db) -> Self {
        Students { db: db.clone() }
    }

    /// Stores a new student and returns its row id.
    pub fn insert(&self, student: &Student) -> WorkshopResult<i64> {
        let id = {
            let conn = self.db.conn();
            conn.execute(
                INSERT_STUDENT,
                params![
                    student.student_id,
                    student.full_name,
                    student.class_name,
                    student.email,
                    student.phone,
                    student.address,
                    student.is_active
                ],
            )?;
            conn.last_insert_rowid()
        };
        debug!(student_id = id, "student created");
        self.db.notify(&[Table::Students]);
        Ok(id)
    }

    pub fn update(&self, student: &Student) -> WorkshopResult<()> {
        let id = student.id.ok_or(WorkshopError::Unsaved(Entity::Student))?;
        let affected = self.db.conn().execute(
            UPDATE_STUDENT,
            params![
                id,
                student.student_id,
                student.full_name,
                student.class_name,
                student.email,
                student.phone,
                student.address,
                student.is_active
            ],
        )?;
        if affected == 0 {
            return Err(WorkshopError::not_found(Entity::Student, id));
        }
        self.db.notify(&[Table::Students]);
        Ok(())
    }

    /// Deletes a student together with their sessions and usage records.
    ///
    /// Refused while the student has a session in progress, since that
    /// session still holds tool units.
    pub fn delete(&self, id: i64) -> WorkshopResult<()> {
        {
            let conn = self.db.conn();
            let running: i64 = conn.query_row(COUNT_RUNNING_SESSIONS, params![id], |row| row.get(0))?;
            if running > 0 {
                return Err(WorkshopError::StudentHasActiveSession(id));
            }
            if conn.execute(DELETE_STUDENT, params![id])? == 0 {
                return Err(WorkshopError::not_found(Entity::Student, id));
            }
        }
        debug!(student_id = id, "student deleted");
        self.db.notify(&[Table::Students, Table::Sessions, Table::SessionTools, Table::ToolUsage]);
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool) -> WorkshopResult<()> {
        if self.db.conn().execute(UPDATE_ACTIVE, params![id, active])? == 0 {
            return Err(WorkshopError::not_found(Entity::Student, id));
        }
        self.db.notify(&[Table::Students]);
        Ok(())
    }

    pub fn get(&self, id: i64) -> WorkshopResult<Option<Student>> {
        student_by_id(&self.db.conn(), id)
    }

    /// Looks a student up by school-issued number.
    pub fn get_by_student_id(&self, student_id: &str) -> WorkshopResult<Option<Student>> {
        let student = self
            .db
            .conn()
            .query_row(&select(WHERE_STUDENT_ID), params![student_id], map_student)
            .optional()?;
        Ok(student)
    }

    pub fn fetch_all(&self) -> WorkshopResult<Vec<Student>> {
        query_students(&self.db.conn(), &select(""), [])
    }

    pub fn fetch_active(&self) -> WorkshopResult<Vec<Student>> {
        query_students(&self.db.conn(), &select(WHERE_ACTIVE), [])
    }

    /// Students whose name or number contains `query`.
    pub fn search(&self, query: &str) -> WorkshopResult<Vec<Student>> {
        query_students(&self.db.conn(), &select(WHERE_SEARCH), params![query])
    }

    /// Students of one class, inactive ones included.
    pub fn by_class(&self, class_name: &str) -> WorkshopResult<Vec<Student>> {
        query_students(&self.db.conn(), &select(WHERE_CLASS), params![class_name])
    }

    /// Distinct classes that have at least one active student.
    pub fn classes(&self) -> WorkshopResult<Vec<String>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(SELECT_CLASSES)?;
        let classes = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
        Ok(classes)
    }

    pub fn count(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_STUDENTS, [], |row| row.get(0))?)
    }

    pub fn count_active(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_ACTIVE_STUDENTS, [], |row| row.get(0))?)
    }

    /// Whether `student_id` is free, ignoring the student with row id `exclude_id`.
    pub fn is_student_id_unique(&self, student_id: &str, exclude_id: i64) -> WorkshopResult<bool> {
        let taken: i64 = self
            .db
            .conn()
            .query_row(COUNT_STUDENT_ID_TAKEN, params![student_id, exclude_id], |row| row.get(0))?;
        Ok(taken == 0)
    }

    /// Checks a student form; every violated rule yields one message.
    pub fn validate(&self, student: &Student) -> WorkshopResult<ValidationResult> {
        let mut result = ValidationResult::new();

        result.check(!is_blank(&student.full_name), Message::StudentNameEmpty);

        if is_blank(&student.student_id) {
            result.push(Message::StudentIdEmpty);
        } else if !self.is_student_id_unique(&student.student_id, student.id.unwrap_or(0))? {
            result.push(Message::StudentIdDuplicate(student.student_id.clone()));
        }

        result.check(!is_blank(&student.class_name), Message::StudentClassEmpty);

        if let Some(email) = student.email.as_deref().filter(|e| !is_blank(e)) {
            result.check(is_valid_email(email), Message::StudentEmailInvalid(email.to_string()));
        }

        Ok(result)
    }

    pub fn subscribe_all(&self) -> LiveQuery<Vec<Student>> {
        let sql = select("");
        LiveQuery::new(&self.db, &[Table::Students], move |conn| query_students(conn, &sql, []))
    }

    pub fn subscribe_active(&self) -> LiveQuery<Vec<Student>> {
        let sql = select(WHERE_ACTIVE);
        LiveQuery::new(&self.db, &[Table::Students], move |conn| query_students(conn, &sql, []))
    }

    pub fn subscribe_search(&self, query: &str) -> LiveQuery<Vec<Student>> {
        let sql = select(WHERE_SEARCH);
        let query = query.to_string();
        LiveQuery::new(&self.db, &[Table::Students], move |conn| query_students(conn, &sql, params![query]))
    }

    pub fn subscribe_by_class(&self, class_name: &str) -> LiveQuery<Vec<Student>> {
        let sql = select(WHERE_CLASS);
        let class_name = class_name.to_string();
        LiveQuery::new(&self.db, &[Table::Students], move |conn| query_students(conn, &sql, params![class_name]))
    }
}
