/// Static Security Scanner - Pre-Execution Screen
///
/// **Core Responsibility:**
/// Reject code that attempts filesystem, network, process or data-access
/// escapes before any sandbox cost is paid.
///
/// **Critical Properties:**
/// - Single regex pass over the source, negligible latency
/// - Pure function, safe to call from many tasks concurrently
/// - Fast-reject heuristic only: the authoritative safety boundary is the
///   sandbox isolation, never this scanner. Obfuscated or dynamically
///   assembled calls will slip through here and must die in the sandbox.
use aula_common::types::{ScanReport, Violation, ViolationCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

struct SecurityPattern {
    name: &'static str,
    category: ViolationCategory,
    regex: Regex,
    message: &'static str,
}

fn pattern(
    name: &'static str,
    category: ViolationCategory,
    re: &str,
    message: &'static str,
) -> SecurityPattern {
    SecurityPattern {
        name,
        category,
        regex: Regex::new(re).expect("invalid security pattern"),
        message,
    }
}

/// Forbidden-construct taxonomy. Matched against the source with
/// single-line comments stripped.
static PATTERNS: Lazy<Vec<SecurityPattern>> = Lazy::new(|| {
    use ViolationCategory::*;
    vec![
        // --- file system ---
        pattern(
            "file_open",
            FileSystem,
            r"\bopen\s*\(",
            "apertura de archivos no permitida",
        ),
        pattern(
            "os_file_ops",
            FileSystem,
            r"\bos\s*\.\s*(open|remove|unlink|rmdir|mkdir|makedirs|listdir|scandir|rename|chmod|chown|walk)\b",
            "operaciones de archivos del sistema no permitidas",
        ),
        pattern(
            "shutil_import",
            FileSystem,
            r"\b(import\s+shutil|from\s+shutil\s+import)\b",
            "manipulacion de archivos y directorios no permitida",
        ),
        pattern(
            "pathlib_import",
            FileSystem,
            r"\b(import\s+pathlib|from\s+pathlib\s+import)\b",
            "manipulacion de rutas no permitida",
        ),
        pattern(
            "system_path",
            FileSystem,
            r"(/etc/|/proc/|C:\\)",
            "acceso a rutas del sistema no permitido",
        ),
        pattern(
            "path_traversal",
            FileSystem,
            r"\.\./",
            "navegacion fuera del directorio de trabajo no permitida",
        ),
        pattern(
            "home_dir",
            FileSystem,
            r"(~/|expanduser)",
            "acceso al directorio personal no permitido",
        ),
        // --- network ---
        pattern(
            "socket_import",
            Network,
            r"\b(import\s+socket|from\s+socket\s+import)\b",
            "uso de sockets de red no permitido",
        ),
        pattern(
            "http_client",
            Network,
            r"\b(import\s+(requests|urllib|httpx|aiohttp)|from\s+(requests|urllib|httpx|aiohttp)[\s.])",
            "clientes HTTP no permitidos",
        ),
        pattern(
            "mail_ftp_ssh",
            Network,
            r"\b(import\s+(smtplib|ftplib|paramiko|telnetlib)|from\s+(smtplib|ftplib|paramiko|telnetlib)\s+import)\b",
            "protocolos de red no permitidos",
        ),
        pattern(
            "url_literal",
            Network,
            r"https?://",
            "conexiones a URLs externas no permitidas",
        ),
        // --- system command / code injection ---
        pattern(
            "subprocess",
            SystemCommand,
            r"\b(import\s+subprocess|from\s+subprocess\s+import|subprocess\s*\.)",
            "ejecucion de procesos no permitida",
        ),
        pattern(
            "os_exec",
            SystemCommand,
            r"\bos\s*\.\s*(system|popen|exec\w*|spawn\w*|fork|kill)\b",
            "ejecucion de comandos del sistema no permitida",
        ),
        pattern(
            "eval_exec",
            SystemCommand,
            r"\b(eval|exec|compile)\s*\(",
            "evaluacion dinamica de codigo no permitida",
        ),
        pattern(
            "dynamic_import",
            SystemCommand,
            r"(__import__\s*\(|\bimportlib\b)",
            "importacion dinamica no permitida",
        ),
        pattern(
            "interpreter_internals",
            SystemCommand,
            r"(__globals__|__subclasses__|__builtins__|__bases__|__mro__)",
            "acceso a internos del interprete no permitido",
        ),
        pattern(
            "deserialization",
            SystemCommand,
            r"\b(import\s+(pickle|marshal|dill)|from\s+(pickle|marshal|dill)\s+import|pickle\s*\.\s*loads?)\b",
            "deserializacion de objetos no permitida",
        ),
        pattern(
            "ffi",
            SystemCommand,
            r"\b(import\s+(ctypes|cffi)|from\s+(ctypes|cffi)[\s.])",
            "acceso a librerias nativas no permitido",
        ),
        pattern(
            "thread_signal",
            SystemCommand,
            r"\b(import\s+(threading|multiprocessing|signal)|from\s+(threading|multiprocessing|signal)\s+import|signal\s*\.\s*(signal|alarm))\b",
            "manipulacion de hilos o senales no permitida",
        ),
        // --- data access ---
        pattern(
            "db_driver",
            DataAccess,
            r"\b(import\s+(sqlite3|psycopg2|pymysql|mysql|pymongo|sqlalchemy|redis)|from\s+(sqlite3|psycopg2|pymysql|mysql|pymongo|sqlalchemy|redis)[\s.])",
            "conexiones directas a bases de datos no permitidas",
        ),
        pattern(
            "foreign_user_data",
            DataAccess,
            r"(user_id\s*==|\ball_users\b)",
            "referencias a datos de otros usuarios no permitidas",
        ),
        pattern(
            "raw_user_sql",
            DataAccess,
            r"(?i)select\s+.+\s+from\s+users?\b",
            "consultas directas sobre tablas de usuarios no permitidas",
        ),
    ]
});

/// Strip single-line comments so commented-out code does not trip the
/// scanner. Comment markers inside string literals are not markers: a `#`
/// in a quoted string must not hide the rest of the line from the scan.
fn strip_line_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        out.push_str(visible_prefix(line));
        out.push('\n');
    }
    out
}

/// The part of a line before its comment, tracking quote state so quoted
/// `#` and `//` survive. Per-line and naive on purpose: no escapes, no
/// multi-line strings; the sandbox remains the authoritative boundary.
fn visible_prefix(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev: Option<char> = None;

    for (idx, ch) in line.char_indices() {
        if !in_single && !in_double {
            match ch {
                '#' => return &line[..idx],
                // `//` only counts as a comment when preceded by
                // whitespace, so URL literals keep their `://`
                '/' if prev == Some('/') => {
                    let start = idx - 1;
                    let preceded_by_space = start == 0
                        || line[..start]
                            .chars()
                            .next_back()
                            .is_some_and(char::is_whitespace);
                    if preceded_by_space {
                        return &line[..start];
                    }
                }
                '\'' => in_single = true,
                '"' => in_double = true,
                _ => {}
            }
        } else if in_single && ch == '\'' {
            in_single = false;
        } else if in_double && ch == '"' {
            in_double = false;
        }
        prev = Some(ch);
    }
    line
}

/// Scan submitted source for forbidden constructs.
///
/// Violations are deduplicated by pattern name; `is_blocked` iff any
/// pattern matched. Must run strictly before any sandbox invocation.
pub fn scan(code: &str) -> ScanReport {
    let stripped = strip_line_comments(code);

    let mut seen: HashSet<&'static str> = HashSet::new();
    let mut violations = Vec::new();

    for p in PATTERNS.iter() {
        if p.regex.is_match(&stripped) && seen.insert(p.name) {
            violations.push(Violation {
                name: p.name.to_string(),
                category: p.category,
                message: p.message.to_string(),
            });
        }
    }

    ScanReport {
        is_blocked: !violations.is_empty(),
        violations,
    }
}

/// Remediation hint per category, shown after the grouped violations.
fn hint(category: ViolationCategory) -> &'static str {
    match category {
        ViolationCategory::FileSystem => {
            "Los ejercicios no necesitan leer ni escribir archivos."
        }
        ViolationCategory::Network => {
            "Los ejercicios se resuelven sin conexiones de red."
        }
        ViolationCategory::SystemCommand => {
            "Usa solo las construcciones del lenguaje; no ejecutes procesos ni codigo dinamico."
        }
        ViolationCategory::DataAccess => {
            "Tu codigo solo puede trabajar con los datos del ejercicio."
        }
    }
}

/// Build the user-facing explanation for a blocked submission.
/// Groups violations by category; never echoes the offending source line.
pub fn format_violations(violations: &[Violation]) -> String {
    let mut out = String::from("Tu codigo fue bloqueado por el analisis de seguridad.\n");

    let categories = [
        ViolationCategory::FileSystem,
        ViolationCategory::Network,
        ViolationCategory::SystemCommand,
        ViolationCategory::DataAccess,
    ];

    for category in categories {
        let in_category: Vec<&Violation> =
            violations.iter().filter(|v| v.category == category).collect();
        if in_category.is_empty() {
            continue;
        }

        out.push_str(&format!("\n[{}]\n", category.label()));
        for v in &in_category {
            out.push_str(&format!("  - {}\n", v.message));
        }
        out.push_str(&format!("Sugerencia: {}\n", hint(category)));
    }

    out
}
