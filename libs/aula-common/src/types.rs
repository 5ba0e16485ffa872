use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Languages the execution engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Rust,
}

impl Language {
    pub fn from_str(s: &str) -> Option<Language> {
        match s.to_lowercase().as_str() {
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "rust" => Some(Language::Rust),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
            Language::Rust => write!(f, "rust"),
        }
    }
}

/// One grading test for a challenge.
///
/// `test_code`, when present, is appended to the submission to produce the
/// program that actually runs for this test. Tests execute in definition
/// order; the first failing *visible* test drives user feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub test_code: Option<String>,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// A challenge definition, owned by the course-authoring subsystem.
/// Read-only as far as this engine is concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub language: Language,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default)]
    pub solution_code: Option<String>,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub time_limit_seconds: u64,
    pub memory_limit_mb: u64,
}

/// Structured outcome of running one program once in the sandbox.
///
/// Value object: created once by the sandbox, never mutated afterwards.
/// Exactly one of the failure flags is set for a failed run; a run with no
/// flags set and an empty `error` succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: String,
    pub error: String,
    pub timeout: bool,
    #[serde(default)]
    pub timeout_message: Option<String>,
    pub memory_exceeded: bool,
    #[serde(default)]
    pub memory_error_message: Option<String>,
    pub syntax_error: bool,
    #[serde(default)]
    pub syntax_error_info: Option<String>,
    pub container_cleaned: bool,
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    /// True when the program ran to completion with no error of any kind.
    pub fn success(&self) -> bool {
        !self.timeout && !self.memory_exceeded && !self.syntax_error && self.error.is_empty()
    }
}

/// Category of a forbidden construct found by the static scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    FileSystem,
    Network,
    SystemCommand,
    DataAccess,
}

impl ViolationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ViolationCategory::FileSystem => "acceso al sistema de archivos",
            ViolationCategory::Network => "acceso a la red",
            ViolationCategory::SystemCommand => "ejecucion de comandos o codigo dinamico",
            ViolationCategory::DataAccess => "acceso a datos de otros usuarios",
        }
    }
}

/// One forbidden construct matched in the submitted source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub name: String,
    pub category: ViolationCategory,
    pub message: String,
}

/// Result of a static security scan. `violations` is deduplicated by
/// pattern name; `is_blocked` iff it is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub is_blocked: bool,
    pub violations: Vec<Violation>,
}

/// Per-test outcome inside a graded submission.
///
/// For hidden tests the diagnostic fields are withheld: `expected`, `actual`
/// and `error` stay `None` and are omitted from serialized output, so the
/// answer key can never be extracted through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_id: u32,
    pub name: String,
    pub passed: bool,
    pub is_hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The persisted record of one grading attempt. Append-only: a submission is
/// fully populated at creation and never edited; re-submitting creates a new
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub code: String,
    pub language: Language,
    pub output: String,
    pub error: String,
    pub test_results: Vec<TestCaseResult>,
    pub is_correct: bool,
    pub execution_time_ms: u64,
    /// 0 for security-blocked submissions, which are persisted for audit but
    /// do not consume an attempt.
    pub attempt_number: u32,
    pub security_blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// What the HTTP layer returns to the learner after grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub submission_id: Uuid,
    pub is_correct: bool,
    pub test_results: Vec<TestCaseResult>,
    pub execution_time_ms: u64,
    pub attempt_number: u32,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
}
