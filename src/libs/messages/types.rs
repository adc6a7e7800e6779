/// Every user-facing text of the application.
///
/// Variants carry the values interpolated into the text; the wording lives in
/// the `Display` implementation in `display.rs`. Validation results store
/// these variants directly, so tests and callers can match on them instead of
/// comparing strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // === STUDENT MESSAGES ===
    StudentCreated(String),
    StudentUpdated(String),
    StudentDeleted(String),
    StudentNotFound(String),
    StudentActivated(String),
    StudentDeactivated(String),
    StudentHasActiveSession(i64),
    StudentListHeader,
    StudentClassHeader(String),
    NoStudentsFound,
    ConfirmDeleteStudent(String, usize), // name, session count

    // Student validation
    StudentNameEmpty,
    StudentIdEmpty,
    StudentIdDuplicate(String),
    StudentClassEmpty,
    StudentEmailInvalid(String),

    // === TOOL MESSAGES ===
    ToolCreated(String),
    ToolUpdated(String),
    ToolDeleted(String),
    ToolNotFound(String),
    ToolActivated(String),
    ToolDeactivated(String),
    ToolStatusChanged(String, String), // name, status
    ToolRestocked(String, i32, i32),   // name, quantity, available
    ToolReserved(String),
    ToolUnavailable(String, String),          // name, status
    InsufficientQuantity(String, i32, i32),   // name, available, requested
    NegativeAvailability(String, i32),        // name, reserved units
    ToolStatusInvalid(String),
    ToolListHeader,
    AvailableToolsHeader,
    NoToolsFound,
    ConfirmDeleteTool(String),

    // Tool validation
    ToolNameEmpty,
    ToolCodeEmpty,
    ToolCodeDuplicate(String),
    ToolCategoryEmpty,
    ToolQuantityTooLow,

    // === SESSION MESSAGES ===
    SessionScheduled(i64),
    SessionUpdated(i64),
    SessionStarted(i64),
    SessionEnded(i64, String), // id, end time
    SessionCancelled(i64),
    SessionMarkedNoShow(i64),
    SessionDeleted(i64),
    SessionNotFound(i64),
    InvalidTransition(i64, String, String), // id, action, status
    SessionToolsLocked(i64),
    SessionUnreservedInProgress,
    SessionStatusInvalid(String),
    SessionListHeader,
    UpcomingSessionsHeader,
    ActiveSessionsHeader,
    SessionToolsHeader(i64),
    NoSessionsFound,
    ConfirmDeleteSession(i64),
    ToolListInvalid(String),
    DateInvalid(String),

    // Session validation
    SessionStudentMissing,
    SessionProjectEmpty,
    SessionStartTimeEmpty,
    SessionInstructorEmpty,
    SessionDateInPast(String),
    StartTimeInvalid(String),
    EndTimeInvalid(String),
    SessionToolNotFound(i64),
    SessionToolUnavailable(String),
    SessionToolQuantityTooLow(i64),
    SessionToolDuplicate(i64),

    // === TOOL USAGE MESSAGES ===
    UsageStarted(i64),
    UsageEnded(i64),
    UsagesEndedForSession(usize, i64), // count, session id
    UsageNotFound(i64),
    RecordNotSaved(String),
    UsageListHeader,
    UsageSummaryHeader(String),
    NoUsagesFound,
    ConditionInvalid(String),

    // Tool usage validation
    UsageSessionMissing,
    UsageToolMissing,
    UsageQuantityTooLow,
    UsageStartTimeEmpty,

    // === STATISTICS MESSAGES ===
    DashboardHeader(String), // date
    SessionBreakdownHeader,
    ToolUsageStatsHeader,
    ToolConditionStatsHeader,
    MonthlyStatsHeader,
    StudentStatsHeader,
    NoStatisticsYet,

    // === VALIDATION MESSAGES ===
    ValidationFailed,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleStorage,
    ConfigModuleSessions,
    PromptSelectModules,
    PromptDatabasePath,
    PromptDefaultInstructor,
    PromptRecentLimit,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseNeedsUpdate,
    DatabaseUpToDate,
    MigrationHistory,

    // === GENERIC MESSAGES ===
    OperationCancelled,
    DatabaseFault,
    StorageFault,
}
