/// Grading Harness - Submission Orchestration
///
/// **Core Responsibility:**
/// Turn one (user, challenge, code) triple into a graded, persisted
/// Submission.
///
/// **State machine per submission:**
/// Created -> Scanning -> { Blocked (terminal) | Executing } -> Graded.
/// Every call drives a fresh submission to a terminal state synchronously;
/// there are no implicit retries.
///
/// **Critical Properties:**
/// - The scanner runs strictly before any sandbox invocation; a blocked
///   submission never reaches the sandbox
/// - Test cases run sequentially: the next sandbox only starts after the
///   previous one's teardown is confirmed
/// - Hidden tests never leak expected/actual/error detail, in responses,
///   in persisted records, or in feedback
/// - Infrastructure failures abort grading and do not consume an attempt
use crate::scanner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aula_common::store::{ChallengeSource, SubmissionStore};
use aula_common::types::{
    Challenge, ExecutionResult, Language, Submission, SubmissionResult, TestCase, TestCaseResult,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Execution seam between the harness and the sandbox. Lets grading logic
/// be tested without Docker.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute_code(
        &self,
        code: &str,
        language: &Language,
        time_limit_seconds: u64,
        memory_limit_mb: u64,
    ) -> Result<ExecutionResult>;
}

#[async_trait]
impl CodeExecutor for crate::sandbox::ExecutionSandbox {
    async fn execute_code(
        &self,
        code: &str,
        language: &Language,
        time_limit_seconds: u64,
        memory_limit_mb: u64,
    ) -> Result<ExecutionResult> {
        crate::sandbox::ExecutionSandbox::execute_code(
            self,
            code,
            language,
            time_limit_seconds,
            memory_limit_mb,
        )
        .await
    }
}

pub struct GradingHarness<E, S, C> {
    executor: E,
    store: Arc<S>,
    challenges: Arc<C>,
}

/// Internal per-test outcome before redaction.
struct GradedTest {
    result: TestCaseResult,
    /// Full diagnostic detail, kept aside so feedback can use it for
    /// visible tests even after redaction.
    detail: Option<String>,
}

impl<E, S, C> GradingHarness<E, S, C>
where
    E: CodeExecutor,
    S: SubmissionStore,
    C: ChallengeSource,
{
    pub fn new(executor: E, store: Arc<S>, challenges: Arc<C>) -> Self {
        Self {
            executor,
            store,
            challenges,
        }
    }

    /// Fast-iteration path: scan and run once, no grading, nothing
    /// persisted, no attempt consumed.
    #[instrument(skip(self, code), fields(language = %language))]
    pub async fn run(
        &self,
        code: &str,
        language: &Language,
        time_limit_seconds: u64,
        memory_limit_mb: u64,
    ) -> Result<ExecutionResult> {
        let report = scanner::scan(code);
        if report.is_blocked {
            info!(
                violations = report.violations.len(),
                "Run blocked by security scan"
            );
            return Ok(blocked_result(&report.violations));
        }

        self.executor
            .execute_code(code, language, time_limit_seconds, memory_limit_mb)
            .await
    }

    /// Grade one submission against all of a challenge's test cases.
    ///
    /// Returns `Ok(None)` when the challenge does not exist. `Err` means an
    /// infrastructure failure: nothing was persisted and no attempt was
    /// consumed.
    #[instrument(skip(self, code), fields(challenge_id = %challenge_id, user_id = %user_id))]
    pub async fn submit(
        &self,
        challenge_id: &Uuid,
        user_id: &Uuid,
        code: &str,
    ) -> Result<Option<SubmissionResult>> {
        let challenge = match self.challenges.fetch(challenge_id).await? {
            Some(c) => c,
            None => return Ok(None),
        };

        // Scanning state: strictly before any sandbox cost
        let report = scanner::scan(code);
        if report.is_blocked {
            info!(
                violations = report.violations.len(),
                "Submission blocked by security scan"
            );
            return Ok(Some(
                self.record_blocked(&challenge, user_id, code, &report.violations)
                    .await?,
            ));
        }

        // Executing state: sequential sandbox calls, one per test case.
        // Each call returns only after its container teardown is confirmed,
        // so at most one container exists per submission at a time.
        let mut graded: Vec<GradedTest> = Vec::with_capacity(challenge.test_cases.len());
        let mut total_time_ms: u64 = 0;
        let mut last_output = String::new();
        let mut last_error = String::new();

        for test_case in &challenge.test_cases {
            let program = effective_program(code, test_case);
            let exec = self
                .executor
                .execute_code(
                    &program,
                    &challenge.language,
                    challenge.time_limit_seconds,
                    challenge.memory_limit_mb,
                )
                .await
                .context("Sandbox execution failed")?;

            total_time_ms += exec.execution_time_ms;

            let detail = failure_detail(&exec);

            // Aggregates feed the persisted record, which is served back
            // verbatim; only visible tests may contribute to them, or a
            // hidden test's output/error would leak through this side door
            if !test_case.is_hidden {
                if !exec.output.trim().is_empty() {
                    last_output = exec.output.trim().to_string();
                }
                if let Some(ref d) = detail {
                    last_error = d.clone();
                }
            }

            let passed = exec.success()
                && exec.output.trim() == test_case.expected_output.trim();

            graded.push(GradedTest {
                result: redacted_test_result(test_case, passed, &exec, detail.as_deref()),
                detail,
            });
        }

        let passed_count = graded.iter().filter(|g| g.result.passed).count();
        let is_correct = passed_count == graded.len();
        let feedback = build_feedback(&graded, &challenge.test_cases);

        // Graded state: claim the attempt number and persist. Claiming here
        // rather than before execution means an infrastructure failure
        // above never consumes an attempt.
        let attempt_number = self.store.next_attempt(user_id, challenge_id).await?;

        let submission = Submission {
            id: Uuid::new_v4(),
            user_id: *user_id,
            challenge_id: *challenge_id,
            code: code.to_string(),
            language: challenge.language,
            output: last_output,
            error: last_error,
            test_results: graded.iter().map(|g| g.result.clone()).collect(),
            is_correct,
            execution_time_ms: total_time_ms,
            attempt_number,
            security_blocked: false,
            created_at: Utc::now(),
        };
        self.store.record(&submission).await?;

        info!(
            submission_id = %submission.id,
            attempt_number,
            is_correct,
            passed = passed_count,
            total = graded.len(),
            execution_time_ms = total_time_ms,
            "Submission graded"
        );

        let solution = if is_correct {
            challenge.solution_code.clone()
        } else {
            None
        };

        Ok(Some(SubmissionResult {
            submission_id: submission.id,
            is_correct,
            test_results: submission.test_results,
            execution_time_ms: total_time_ms,
            attempt_number,
            feedback,
            solution,
        }))
    }

    /// Blocked terminal state: persist for audit without consuming an
    /// attempt (attempt_number stays 0) and return the violation-derived
    /// feedback. The sandbox is never invoked.
    async fn record_blocked(
        &self,
        challenge: &Challenge,
        user_id: &Uuid,
        code: &str,
        violations: &[aula_common::types::Violation],
    ) -> Result<SubmissionResult> {
        let message = scanner::format_violations(violations);

        let submission = Submission {
            id: Uuid::new_v4(),
            user_id: *user_id,
            challenge_id: challenge.id,
            code: code.to_string(),
            language: challenge.language,
            output: String::new(),
            error: message.clone(),
            test_results: Vec::new(),
            is_correct: false,
            execution_time_ms: 0,
            attempt_number: 0,
            security_blocked: true,
            created_at: Utc::now(),
        };
        self.store.record(&submission).await?;

        warn!(submission_id = %submission.id, "Blocked submission persisted for audit");

        Ok(SubmissionResult {
            submission_id: submission.id,
            is_correct: false,
            test_results: Vec::new(),
            execution_time_ms: 0,
            attempt_number: 0,
            feedback: message,
            solution: None,
        })
    }
}

/// The program actually executed for a test: the submission itself, or the
/// submission with the test's driver code appended.
fn effective_program(code: &str, test_case: &TestCase) -> String {
    match &test_case.test_code {
        Some(test_code) => format!("{}\n\n{}", code, test_code),
        None => code.to_string(),
    }
}

/// Human-readable reason a run did not succeed, or None for a clean run.
fn failure_detail(exec: &ExecutionResult) -> Option<String> {
    if exec.timeout {
        return exec
            .timeout_message
            .clone()
            .or_else(|| Some("limite de tiempo excedido".to_string()));
    }
    if exec.memory_exceeded {
        return exec
            .memory_error_message
            .clone()
            .or_else(|| Some("limite de memoria excedido".to_string()));
    }
    if exec.syntax_error {
        return exec
            .syntax_error_info
            .clone()
            .or_else(|| Some("error de sintaxis".to_string()));
    }
    if !exec.error.is_empty() {
        return Some(exec.error.clone());
    }
    None
}

/// Build the per-test record, withholding expected/actual/error for hidden
/// tests in both the response and the persisted submission.
fn redacted_test_result(
    test_case: &TestCase,
    passed: bool,
    exec: &ExecutionResult,
    detail: Option<&str>,
) -> TestCaseResult {
    if test_case.is_hidden {
        TestCaseResult {
            test_id: test_case.id,
            name: test_case.name.clone(),
            passed,
            is_hidden: true,
            expected: None,
            actual: None,
            error: None,
        }
    } else {
        TestCaseResult {
            test_id: test_case.id,
            name: test_case.name.clone(),
            passed,
            is_hidden: false,
            expected: Some(test_case.expected_output.trim().to_string()),
            actual: Some(exec.output.trim().to_string()),
            error: detail.map(str::to_string),
        }
    }
}

/// Feedback message for the learner. On failure, the hint comes only from
/// the first failing *visible* test; a failing hidden test surfaces neither
/// its name nor its error.
fn build_feedback(graded: &[GradedTest], test_cases: &[TestCase]) -> String {
    let total = graded.len();
    let passed = graded.iter().filter(|g| g.result.passed).count();

    if passed == total {
        return "Excelente! Tu solucion paso todas las pruebas.".to_string();
    }

    let mut feedback = format!("Pasaste {} de {} pruebas.", passed, total);

    let first_visible_failure = graded
        .iter()
        .zip(test_cases)
        .find(|(g, tc)| !g.result.passed && !tc.is_hidden);

    match first_visible_failure {
        Some((g, tc)) => {
            feedback.push_str(&format!(" Revisa la prueba '{}'", tc.name));
            match &g.detail {
                Some(d) => feedback.push_str(&format!(": {}", d)),
                None => feedback.push_str(": la salida no coincide con lo esperado"),
            }
        }
        None => {
            // Only hidden tests failed; say so without identifying them
            feedback.push_str(" Una prueba oculta no paso.");
        }
    }

    feedback
}

fn blocked_result(violations: &[aula_common::types::Violation]) -> ExecutionResult {
    ExecutionResult {
        output: String::new(),
        error: scanner::format_violations(violations),
        timeout: false,
        timeout_message: None,
        memory_exceeded: false,
        memory_error_message: None,
        syntax_error: false,
        syntax_error_info: None,
        container_cleaned: true,
        execution_time_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_common::store::MemoryStore;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted executor: returns pre-programmed results in order and
    /// counts how many times it was invoked.
    struct MockExecutor {
        scripted: Mutex<VecDeque<ExecutionResult>>,
        calls: AtomicUsize,
    }

    impl MockExecutor {
        fn new(results: Vec<ExecutionResult>) -> Self {
            Self {
                scripted: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CodeExecutor for Arc<MockExecutor> {
        async fn execute_code(
            &self,
            _code: &str,
            _language: &Language,
            _time_limit_seconds: u64,
            _memory_limit_mb: u64,
        ) -> Result<ExecutionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .scripted
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock executor ran out of scripted results"))
        }
    }

    fn ok_exec(output: &str) -> ExecutionResult {
        ExecutionResult {
            output: output.to_string(),
            error: String::new(),
            timeout: false,
            timeout_message: None,
            memory_exceeded: false,
            memory_error_message: None,
            syntax_error: false,
            syntax_error_info: None,
            container_cleaned: true,
            execution_time_ms: 25,
        }
    }

    fn error_exec(message: &str) -> ExecutionResult {
        ExecutionResult {
            error: message.to_string(),
            ..ok_exec("")
        }
    }

    fn suma_challenge() -> Challenge {
        Challenge {
            id: Uuid::new_v4(),
            language: Language::Python,
            starter_code: "def suma(a, b):\n    pass\n".to_string(),
            solution_code: Some("def suma(a, b):\n    return a + b\n".to_string()),
            test_cases: vec![
                TestCase {
                    id: 1,
                    name: "suma de positivos".to_string(),
                    test_code: Some("print(suma(3, 5))".to_string()),
                    expected_output: "8".to_string(),
                    is_hidden: false,
                },
                TestCase {
                    id: 2,
                    name: "suma con negativo".to_string(),
                    test_code: Some("print(suma(5, -3))".to_string()),
                    expected_output: "2".to_string(),
                    is_hidden: false,
                },
                TestCase {
                    id: 3,
                    name: "suma de opuestos".to_string(),
                    test_code: Some("print(suma(4, -4))".to_string()),
                    expected_output: "0".to_string(),
                    is_hidden: true,
                },
            ],
            hints: vec!["Usa el operador +".to_string()],
            difficulty: Some("facil".to_string()),
            time_limit_seconds: 5,
            memory_limit_mb: 128,
        }
    }

    fn harness_with(
        challenge: Challenge,
        results: Vec<ExecutionResult>,
    ) -> (
        GradingHarness<Arc<MockExecutor>, MemoryStore, MemoryStore>,
        Arc<MockExecutor>,
        Arc<MemoryStore>,
        Uuid,
    ) {
        let challenge_id = challenge.id;
        let store = Arc::new(MemoryStore::new());
        store.insert_challenge(challenge);
        let executor = Arc::new(MockExecutor::new(results));
        let harness = GradingHarness::new(executor.clone(), store.clone(), store.clone());
        (harness, executor, store, challenge_id)
    }

    #[tokio::test]
    async fn all_tests_pass() {
        let (harness, _, store, challenge_id) = harness_with(
            suma_challenge(),
            vec![ok_exec("8"), ok_exec("2"), ok_exec("0")],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def suma(a, b): return a + b")
            .await
            .unwrap()
            .unwrap();

        assert!(result.is_correct);
        assert_eq!(
            result.feedback,
            "Excelente! Tu solucion paso todas las pruebas."
        );
        assert_eq!(result.attempt_number, 1);
        assert_eq!(result.test_results.len(), 3);
        assert!(result.test_results.iter().all(|t| t.passed));
        assert!(result.solution.is_some());
        assert_eq!(result.execution_time_ms, 75);

        let persisted = store.submissions();
        assert_eq!(persisted.len(), 1);
        assert!(persisted[0].is_correct);
    }

    #[tokio::test]
    async fn visible_failure_drives_feedback() {
        // Test 2 (visible) wrong, tests 1 and 3 right
        let (harness, _, _, challenge_id) = harness_with(
            suma_challenge(),
            vec![ok_exec("8"), ok_exec("7"), ok_exec("0")],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def suma(a, b): return a | b")
            .await
            .unwrap()
            .unwrap();

        assert!(!result.is_correct);
        assert!(result.feedback.contains("2 de 3"));
        assert!(result.feedback.contains("suma con negativo"));
        assert!(result.solution.is_none());
    }

    #[tokio::test]
    async fn hidden_failure_never_named_in_feedback() {
        // Only the hidden test 3 fails
        let (harness, _, _, challenge_id) = harness_with(
            suma_challenge(),
            vec![ok_exec("8"), ok_exec("2"), ok_exec("1")],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def suma(a, b): return a + abs(b)")
            .await
            .unwrap()
            .unwrap();

        assert!(!result.is_correct);
        assert!(result.feedback.contains("2 de 3"));
        assert!(!result.feedback.contains("suma de opuestos"));
        assert!(result.feedback.contains("oculta"));
    }

    #[tokio::test]
    async fn hidden_test_results_are_redacted_everywhere() {
        let (harness, _, store, challenge_id) = harness_with(
            suma_challenge(),
            vec![ok_exec("8"), ok_exec("2"), ok_exec("1")],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def suma(a, b): return a + abs(b)")
            .await
            .unwrap()
            .unwrap();

        let hidden = &result.test_results[2];
        assert!(hidden.is_hidden);
        assert!(!hidden.passed);
        assert!(hidden.expected.is_none());
        assert!(hidden.actual.is_none());
        assert!(hidden.error.is_none());

        // Redaction also holds in the persisted record
        let persisted = &store.submissions()[0];
        assert!(persisted.test_results[2].expected.is_none());
        assert!(persisted.test_results[2].actual.is_none());

        // Visible tests keep full diagnostic detail
        let visible = &result.test_results[0];
        assert_eq!(visible.expected.as_deref(), Some("8"));
        assert_eq!(visible.actual.as_deref(), Some("8"));
    }

    #[tokio::test]
    async fn hidden_failure_stays_out_of_aggregate_output_and_error() {
        // Hidden test 3 errors and prints; neither may reach the
        // submission's aggregate fields, which are served back verbatim
        // by the submission-retrieval endpoint
        let hidden_exec = ExecutionResult {
            output: "pista secreta".to_string(),
            error: "AssertionError: comprobacion oculta fallo".to_string(),
            ..ok_exec("")
        };
        let (harness, _, store, challenge_id) = harness_with(
            suma_challenge(),
            vec![ok_exec("8"), ok_exec("2"), hidden_exec],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def suma(a, b): return a + b")
            .await
            .unwrap()
            .unwrap();
        assert!(!result.is_correct);

        let persisted = &store.submissions()[0];
        assert!(!persisted.error.contains("comprobacion oculta"));
        assert!(!persisted.output.contains("pista secreta"));
        // The last visible test's output is still recorded
        assert_eq!(persisted.output, "2");

        // A visible failure still surfaces in the aggregate error
        let visible_failure = ExecutionResult {
            error: "NameError: name 'suma' is not defined".to_string(),
            ..ok_exec("")
        };
        let (harness, _, store, challenge_id) = harness_with(
            suma_challenge(),
            vec![visible_failure, ok_exec("2"), ok_exec("0")],
        );
        harness
            .submit(&challenge_id, &user, "def sumar(a, b): return a + b")
            .await
            .unwrap()
            .unwrap();
        assert!(store.submissions()[0].error.contains("NameError"));
    }

    #[tokio::test]
    async fn blocked_submission_never_reaches_sandbox() {
        let (harness, executor, store, challenge_id) =
            harness_with(suma_challenge(), vec![]);
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "import os\nos.system('rm -rf /')")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(executor.call_count(), 0);
        assert!(!result.is_correct);
        assert_eq!(result.attempt_number, 0);
        assert!(result.feedback.contains("bloqueado"));

        // Persisted for audit, without consuming an attempt
        let persisted = store.submissions();
        assert_eq!(persisted.len(), 1);
        assert!(persisted[0].security_blocked);
        assert_eq!(persisted[0].attempt_number, 0);
        assert_eq!(store.attempt_count(&user, &challenge_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn attempt_numbers_increase_per_user_challenge() {
        let challenge = suma_challenge();
        let challenge_id = challenge.id;
        let store = Arc::new(MemoryStore::new());
        store.insert_challenge(challenge);
        let user = Uuid::new_v4();

        for expected_attempt in 1..=3u32 {
            let executor = Arc::new(MockExecutor::new(vec![
                ok_exec("8"),
                ok_exec("2"),
                ok_exec("0"),
            ]));
            let harness =
                GradingHarness::new(executor, store.clone(), store.clone());
            let result = harness
                .submit(&challenge_id, &user, "def suma(a, b): return a + b")
                .await
                .unwrap()
                .unwrap();
            assert_eq!(result.attempt_number, expected_attempt);
        }
    }

    #[tokio::test]
    async fn runtime_error_fails_test_and_shows_in_feedback() {
        let (harness, _, _, challenge_id) = harness_with(
            suma_challenge(),
            vec![
                error_exec("NameError: name 'suma' is not defined"),
                error_exec("NameError: name 'suma' is not defined"),
                error_exec("NameError: name 'suma' is not defined"),
            ],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def sumar(a, b): return a + b")
            .await
            .unwrap()
            .unwrap();

        assert!(!result.is_correct);
        assert!(result.feedback.contains("0 de 3"));
        assert!(result.feedback.contains("NameError"));
        // Hidden test's error stays redacted even though it also errored
        assert!(result.test_results[2].error.is_none());
    }

    #[tokio::test]
    async fn timeout_is_not_a_pass_even_with_matching_output() {
        let challenge = suma_challenge();
        let timeout = ExecutionResult {
            output: "8".to_string(),
            timeout: true,
            timeout_message: Some("El programa supero el limite de tiempo de 5 segundos".to_string()),
            ..ok_exec("")
        };
        let (harness, _, _, challenge_id) =
            harness_with(challenge, vec![timeout, ok_exec("2"), ok_exec("0")]);
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "while True: pass")
            .await
            .unwrap()
            .unwrap();

        assert!(!result.is_correct);
        assert!(!result.test_results[0].passed);
        assert!(result.feedback.contains("limite de tiempo"));
    }

    #[tokio::test]
    async fn unknown_challenge_returns_none() {
        let (harness, executor, _, _) = harness_with(suma_challenge(), vec![]);
        let missing = Uuid::new_v4();
        let user = Uuid::new_v4();

        let result = harness.submit(&missing, &user, "print(1)").await.unwrap();
        assert!(result.is_none());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn trimmed_exact_match_comparison() {
        let (harness, _, _, challenge_id) = harness_with(
            suma_challenge(),
            vec![ok_exec("  8\n"), ok_exec("2\n"), ok_exec("\n0  \n")],
        );
        let user = Uuid::new_v4();

        let result = harness
            .submit(&challenge_id, &user, "def suma(a, b): return a + b")
            .await
            .unwrap()
            .unwrap();

        // Leading/trailing whitespace is trimmed, nothing else is forgiven
        assert!(result.is_correct);
    }

    #[tokio::test]
    async fn run_path_scans_but_does_not_persist() {
        let (harness, executor, store, _) =
            harness_with(suma_challenge(), vec![ok_exec("hola")]);

        let blocked = harness
            .run("import socket", &Language::Python, 5, 128)
            .await
            .unwrap();
        assert!(!blocked.error.is_empty());
        assert_eq!(executor.call_count(), 0);

        let ok = harness
            .run("print('hola')", &Language::Python, 5, 128)
            .await
            .unwrap();
        assert_eq!(ok.output, "hola");
        assert_eq!(executor.call_count(), 1);

        assert!(store.submissions().is_empty());
    }

    #[test]
    fn effective_program_appends_test_code() {
        let tc = TestCase {
            id: 1,
            name: "t".to_string(),
            test_code: Some("print(f())".to_string()),
            expected_output: "1".to_string(),
            is_hidden: false,
        };
        assert_eq!(
            effective_program("def f(): return 1", &tc),
            "def f(): return 1\n\nprint(f())"
        );

        let plain = TestCase {
            test_code: None,
            ..tc
        };
        assert_eq!(effective_program("print(1)", &plain), "print(1)");
    }
}
