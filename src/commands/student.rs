use super::report;
use crate::{
    db::{db::Db, sessions::Sessions, students::Students},
    libs::{messages::Message, student::Student, view::View},
    msg_error, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct StudentArgs {
    #[command(subcommand)]
    command: StudentCommand,
}

#[derive(Debug, Subcommand)]
enum StudentCommand {
    /// Register a new student
    Add {
        /// School-issued student number
        student_id: String,
        /// Full name
        full_name: String,
        /// Class, e.g. "XI TKR 2"
        #[arg(short, long)]
        class: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Change a student's details; omitted fields are kept
    Edit {
        id: i64,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        class: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List students
    List {
        /// Only active students
        #[arg(short, long)]
        active: bool,
    },
    /// Show one student
    Show { id: i64 },
    /// Search by name or student number
    Search { query: String },
    /// List the students of a class, or all classes when none is given
    Class { class: Option<String> },
    /// Allow a student to book sessions again
    Activate { id: i64 },
    /// Keep a student on record without allowing new sessions
    Deactivate { id: i64 },
    /// Delete a student with all their sessions
    Delete { id: i64 },
}

pub async fn cmd(args: StudentArgs) -> Result<()> {
    let db = Db::new()?;
    let students = Students::new(&db);

    match args.command {
        StudentCommand::Add {
            student_id,
            full_name,
            class,
            email,
            phone,
            address,
        } => {
            let student = Student {
                email,
                phone,
                address,
                ..Student::new(&student_id, &full_name, &class)
            };
            handle_add(&students, student)
        }
        StudentCommand::Edit {
            id,
            student_id,
            name,
            class,
            email,
            phone,
            address,
        } => {
            let Some(mut student) = students.get(id)? else {
                msg_error!(Message::StudentNotFound(id.to_string()));
                return Ok(());
            };
            student.student_id = student_id.unwrap_or(student.student_id);
            student.full_name = name.unwrap_or(student.full_name);
            student.class_name = class.unwrap_or(student.class_name);
            student.email = email.or(student.email);
            student.phone = phone.or(student.phone);
            student.address = address.or(student.address);
            handle_edit(&students, student)
        }
        StudentCommand::List { active } => {
            let list = if active { students.fetch_active()? } else { students.fetch_all()? };
            print_list(Message::StudentListHeader, &list)
        }
        StudentCommand::Show { id } => handle_show(&db, id),
        StudentCommand::Search { query } => print_list(Message::StudentListHeader, &students.search(&query)?),
        StudentCommand::Class { class: Some(class) } => {
            print_list(Message::StudentClassHeader(class.clone()), &students.by_class(&class)?)
        }
        StudentCommand::Class { class: None } => {
            for class in students.classes()? {
                msg_print!(class);
            }
            Ok(())
        }
        StudentCommand::Activate { id } => handle_set_active(&students, id, true),
        StudentCommand::Deactivate { id } => handle_set_active(&students, id, false),
        StudentCommand::Delete { id } => handle_delete(&db, id),
    }
}

fn handle_add(students: &Students, student: Student) -> Result<()> {
    if let Err(e) = students.validate(&student)?.into_result() {
        return report(e);
    }

    students.insert(&student)?;
    msg_success!(Message::StudentCreated(student.full_name));
    Ok(())
}

fn handle_edit(students: &Students, student: Student) -> Result<()> {
    if let Err(e) = students.validate(&student)?.into_result() {
        return report(e);
    }

    match students.update(&student) {
        Ok(()) => {
            msg_success!(Message::StudentUpdated(student.full_name));
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn print_list(header: Message, students: &[Student]) -> Result<()> {
    if students.is_empty() {
        msg_info!(Message::NoStudentsFound);
        return Ok(());
    }

    msg_print!(header, true);
    View::students(students)
}

fn handle_show(db: &Db, id: i64) -> Result<()> {
    let student = match Students::new(db).get(id)? {
        Some(student) => student,
        None => {
            msg_error!(Message::StudentNotFound(id.to_string()));
            return Ok(());
        }
    };
    let sessions = Sessions::new(db).count_by_student(id)?;
    View::student(&student, sessions)
}

fn handle_set_active(students: &Students, id: i64, active: bool) -> Result<()> {
    let student = match students.get(id)? {
        Some(student) => student,
        None => {
            msg_error!(Message::StudentNotFound(id.to_string()));
            return Ok(());
        }
    };

    if let Err(e) = students.set_active(id, active) {
        return report(e);
    }
    if active {
        msg_success!(Message::StudentActivated(student.full_name));
    } else {
        msg_success!(Message::StudentDeactivated(student.full_name));
    }
    Ok(())
}

fn handle_delete(db: &Db, id: i64) -> Result<()> {
    let students = Students::new(db);
    let student = match students.get(id)? {
        Some(student) => student,
        None => {
            msg_error!(Message::StudentNotFound(id.to_string()));
            return Ok(());
        }
    };
    let sessions = Sessions::new(db).count_by_student(id)? as usize;

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::ConfirmDeleteStudent(student.full_name.clone(), sessions).to_string())
        .default(false)
        .interact()?;

    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    match students.delete(id) {
        Ok(()) => {
            msg_success!(Message::StudentDeleted(student.full_name));
            Ok(())
        }
        Err(e) => report(e),
    }
}
