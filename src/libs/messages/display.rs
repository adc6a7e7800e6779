//! Display implementation for workshop messages.
//!
//! All user-facing wording is defined here, in one match, so every message
//! variant needs an explicit text and parameters are interpolated with type
//! safety.
//!
//! ```rust
//! use workshop::libs::messages::Message;
//!
//! assert_eq!(Message::StudentNameEmpty.to_string(), "Student name must not be empty");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === STUDENT MESSAGES ===
            Message::StudentCreated(name) => format!("Student '{}' created successfully.", name),
            Message::StudentUpdated(name) => format!("Student '{}' updated successfully.", name),
            Message::StudentDeleted(name) => format!("Student '{}' deleted.", name),
            Message::StudentNotFound(ident) => format!("Student '{}' not found.", ident),
            Message::StudentActivated(name) => format!("Student '{}' is active again.", name),
            Message::StudentDeactivated(name) => format!("Student '{}' has been deactivated.", name),
            Message::StudentHasActiveSession(id) => {
                format!("Student {} has a session in progress. End or cancel it first.", id)
            }
            Message::StudentListHeader => "Students:".to_string(),
            Message::StudentClassHeader(class) => format!("Students of class {}:", class),
            Message::NoStudentsFound => "No students found.".to_string(),
            Message::ConfirmDeleteStudent(name, 0) => format!("Delete student '{}'?", name),
            Message::ConfirmDeleteStudent(name, sessions) => {
                format!("Delete student '{}' and their {} session(s)?", name, sessions)
            }

            Message::StudentNameEmpty => "Student name must not be empty".to_string(),
            Message::StudentIdEmpty => "Student number must not be empty".to_string(),
            Message::StudentIdDuplicate(id) => format!("Student number '{}' is already in use", id),
            Message::StudentClassEmpty => "Class must not be empty".to_string(),
            Message::StudentEmailInvalid(email) => format!("'{}' is not a valid email address", email),

            // === TOOL MESSAGES ===
            Message::ToolCreated(name) => format!("Tool '{}' created successfully.", name),
            Message::ToolUpdated(name) => format!("Tool '{}' updated successfully.", name),
            Message::ToolDeleted(name) => format!("Tool '{}' deleted.", name),
            Message::ToolNotFound(ident) => format!("Tool '{}' not found.", ident),
            Message::ToolActivated(name) => format!("Tool '{}' is active again.", name),
            Message::ToolDeactivated(name) => format!("Tool '{}' has been deactivated.", name),
            Message::ToolStatusChanged(name, status) => format!("Tool '{}' is now marked as {}.", name, status),
            Message::ToolRestocked(name, quantity, available) => {
                format!("Tool '{}' now has {} unit(s), {} available.", name, quantity, available)
            }
            Message::ToolReserved(name) => format!("Tool '{}' is reserved by a session in progress.", name),
            Message::ToolUnavailable(name, status) => format!("Tool '{}' is {} and cannot be borrowed.", name, status),
            Message::InsufficientQuantity(name, available, requested) => format!(
                "Tool '{}' has {} unit(s) available but {} requested.",
                name, available, requested
            ),
            Message::NegativeAvailability(name, reserved) => format!(
                "Tool '{}' has {} unit(s) out on sessions; the total quantity cannot drop below that.",
                name, reserved
            ),
            Message::ToolStatusInvalid(status) => format!(
                "Unknown tool status '{}'. Use Available, Borrowed, Broken, Maintenance or Lost.",
                status
            ),
            Message::ToolListHeader => "Tools:".to_string(),
            Message::AvailableToolsHeader => "Tools available for borrowing:".to_string(),
            Message::NoToolsFound => "No tools found.".to_string(),
            Message::ConfirmDeleteTool(name) => format!("Delete tool '{}' and its usage history?", name),

            Message::ToolNameEmpty => "Tool name must not be empty".to_string(),
            Message::ToolCodeEmpty => "Tool code must not be empty".to_string(),
            Message::ToolCodeDuplicate(code) => format!("Tool code '{}' is already in use", code),
            Message::ToolCategoryEmpty => "Tool category must not be empty".to_string(),
            Message::ToolQuantityTooLow => "Tool quantity must be at least 1".to_string(),

            // === SESSION MESSAGES ===
            Message::SessionScheduled(id) => format!("Session {} scheduled.", id),
            Message::SessionUpdated(id) => format!("Session {} updated.", id),
            Message::SessionStarted(id) => format!("Session {} started, tools reserved.", id),
            Message::SessionEnded(id, end) => format!("Session {} completed at {}, tools returned.", id, end),
            Message::SessionCancelled(id) => format!("Session {} cancelled.", id),
            Message::SessionMarkedNoShow(id) => format!("Session {} marked as no-show.", id),
            Message::SessionDeleted(id) => format!("Session {} deleted.", id),
            Message::SessionNotFound(id) => format!("Session {} not found.", id),
            Message::InvalidTransition(id, action, status) => {
                format!("Cannot {} session {} while it is {}.", action, id, status)
            }
            Message::SessionToolsLocked(id) => {
                format!("The tools of session {} can only be changed while it is scheduled.", id)
            }
            Message::SessionUnreservedInProgress => {
                "A session cannot be created in progress; schedule it and start it instead.".to_string()
            }
            Message::SessionStatusInvalid(status) => format!(
                "Unknown session status '{}'. Use scheduled, in-progress, completed, cancelled or no-show.",
                status
            ),
            Message::SessionListHeader => "Sessions:".to_string(),
            Message::UpcomingSessionsHeader => "Upcoming sessions:".to_string(),
            Message::ActiveSessionsHeader => "Sessions in progress:".to_string(),
            Message::SessionToolsHeader(id) => format!("Tools of session {}:", id),
            Message::NoSessionsFound => "No sessions found.".to_string(),
            Message::ConfirmDeleteSession(id) => format!("Delete session {} and its tool usage records?", id),
            Message::ToolListInvalid(value) => {
                format!("Invalid tool list '{}'. Use ids separated by commas, e.g. 3,7:2", value)
            }
            Message::DateInvalid(value) => format!("Invalid date '{}'. Use YYYY-MM-DD.", value),

            Message::SessionStudentMissing => "A student must be selected".to_string(),
            Message::SessionProjectEmpty => "Project name must not be empty".to_string(),
            Message::SessionStartTimeEmpty => "Start time must not be empty".to_string(),
            Message::SessionInstructorEmpty => "Instructor name must not be empty".to_string(),
            Message::SessionDateInPast(date) => format!("Session date {} is in the past", date),
            Message::StartTimeInvalid(time) => format!("Start time '{}' is not a valid HH:MM time", time),
            Message::EndTimeInvalid(time) => format!("End time '{}' is not a valid HH:MM time", time),
            Message::SessionToolNotFound(id) => format!("Tool with id {} not found", id),
            Message::SessionToolUnavailable(name) => format!("Tool '{}' is not available", name),
            Message::SessionToolQuantityTooLow(id) => format!("Requested quantity of tool {} must be at least 1", id),
            Message::SessionToolDuplicate(id) => format!("Tool {} is listed more than once", id),

            // === TOOL USAGE MESSAGES ===
            Message::UsageStarted(id) => format!("Tool usage {} recorded.", id),
            Message::UsageEnded(id) => format!("Tool usage {} closed.", id),
            Message::UsagesEndedForSession(count, session) => {
                format!("Closed {} open tool usage record(s) of session {}.", count, session)
            }
            Message::UsageNotFound(id) => format!("Tool usage {} not found.", id),
            Message::RecordNotSaved(entity) => format!("This {} has not been saved yet.", entity),
            Message::UsageListHeader => "Tool usage:".to_string(),
            Message::UsageSummaryHeader(name) => format!("Usage summary for '{}':", name),
            Message::NoUsagesFound => "No tool usage recorded.".to_string(),
            Message::ConditionInvalid(value) => format!(
                "Unknown condition '{}'. Use excellent, good, fair, poor or broken.",
                value
            ),

            Message::UsageSessionMissing => "Session id is not valid".to_string(),
            Message::UsageToolMissing => "Tool id is not valid".to_string(),
            Message::UsageQuantityTooLow => "Quantity used must be at least 1".to_string(),
            Message::UsageStartTimeEmpty => "Usage start time must not be empty".to_string(),

            // === STATISTICS MESSAGES ===
            Message::DashboardHeader(date) => format!("Workshop overview for {}", date),
            Message::SessionBreakdownHeader => "Sessions by status:".to_string(),
            Message::ToolUsageStatsHeader => "Most used tools:".to_string(),
            Message::ToolConditionStatsHeader => "Average condition after use:".to_string(),
            Message::MonthlyStatsHeader => "Completed sessions per month:".to_string(),
            Message::StudentStatsHeader => "Completed sessions per student:".to_string(),
            Message::NoStatisticsYet => "Not enough data for statistics yet.".to_string(),

            // === VALIDATION MESSAGES ===
            Message::ValidationFailed => "Please fix the following:".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigModuleStorage => "Storage settings".to_string(),
            Message::ConfigModuleSessions => "Session settings".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptDatabasePath => "Database file path".to_string(),
            Message::PromptDefaultInstructor => "Default instructor name".to_string(),
            Message::PromptRecentLimit => "Number of recent sessions to show".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed successfully".to_string(),
            Message::DatabaseVersion(version) => format!("Database version: {}", version),
            Message::DatabaseNeedsUpdate => "Database needs migration".to_string(),
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),

            // === GENERIC MESSAGES ===
            Message::OperationCancelled => "Operation cancelled.".to_string(),
            Message::DatabaseFault => "Could not read or write the workshop database.".to_string(),
            Message::StorageFault => "Could not access the workshop data directory.".to_string(),
        };
        write!(f, "{}", text)
    }
}
