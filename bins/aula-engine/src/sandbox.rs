/// Execution Sandbox - Isolated One-Shot Code Execution
///
/// **Core Responsibility:**
/// Run exactly one program once, under wall-clock and memory ceilings, and
/// report a fully structured outcome.
///
/// **Critical Architectural Boundary:**
/// - The sandbox knows HOW to execute (Docker containers)
/// - The sandbox does NOT know grading rules or test-case semantics
/// - The grading harness interprets the structured ExecutionResult
///
/// **Isolation model:**
/// Every invocation gets a freshly created container: network disabled,
/// memory and CPU limits enforced, a throwaway /code scratch dir, nothing
/// shared with any other execution. Two calls with identical input never
/// observe each other's filesystem or environment.
use crate::config::LanguageConfigManager;
use anyhow::{bail, Context, Result};
use aula_common::types::{ExecutionResult, Language};
use base64::{engine::general_purpose, Engine as _};
use bollard::container::{
    Config, CreateContainerOptions, KillContainerOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::container::LogOutput;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Safety limit to prevent pathological inputs from reaching Docker.
const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB

/// Exit code Docker reports when the kernel OOM-kills the process.
const OOM_EXIT_CODE: i64 = 137;

/// Slack added to the container's keep-alive sleep beyond the time limit,
/// covering the compile step and exec plumbing.
const CONTAINER_LIFETIME_SLACK_SECS: u64 = 30;

/// Container cleanup guard - guarantees container removal on drop.
/// Covers panics and task cancellation; the happy path tears down
/// explicitly and disarms the guard so teardown can be confirmed.
struct ContainerGuard {
    docker: Docker,
    container_id: String,
    armed: bool,
}

impl ContainerGuard {
    fn new(docker: Docker, container_id: String) -> Self {
        Self {
            docker,
            container_id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Cannot be async in Drop - spawn the removal and log failures
        let container_id = self.container_id.clone();
        let docker = self.docker.clone();

        tokio::spawn(async move {
            let remove_options = RemoveContainerOptions {
                force: true,
                ..Default::default()
            };
            if let Err(e) = docker.remove_container(&container_id, Some(remove_options)).await {
                warn!(container_id = %container_id, error = %e, "Failed to cleanup container from guard");
            }
        });
    }
}

/// Output of one exec inside the container.
struct ExecOutput {
    stdout: String,
    stderr: String,
    exit_code: Option<i64>,
}

/// Docker-backed execution sandbox.
///
/// Cheap to clone; the bollard client multiplexes one daemon connection.
/// Holds no mutable state, so any number of `execute_code` calls may run
/// concurrently, each owning an independent container.
#[derive(Clone)]
pub struct ExecutionSandbox {
    docker: Docker,
    languages: LanguageConfigManager,
}

impl ExecutionSandbox {
    pub fn new(languages: LanguageConfigManager) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to Docker daemon")?;
        Ok(Self { docker, languages })
    }

    /// Pull every configured language image up front. Part of the explicit
    /// startup phase: the engine refuses to accept requests until all
    /// runtime images are locally available.
    pub async fn provision_images(&self) -> Result<()> {
        for language in self.languages.configured_languages() {
            let image = self.languages.image(&language)?;
            self.ensure_image(&image)
                .await
                .with_context(|| format!("Failed to provision image '{}'", image))?;
        }
        Ok(())
    }

    async fn ensure_image(&self, image: &str) -> Result<()> {
        if self.docker.inspect_image(image).await.is_ok() {
            debug!(image = %image, "Image cache hit");
            return Ok(());
        }

        warn!(image = %image, "Image cache miss, pulling");
        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });
        let mut stream = self.docker.create_image(options, None, None);
        while let Some(result) = stream.next().await {
            result.context("Failed to pull Docker image")?;
        }
        info!(image = %image, "Image pulled");
        Ok(())
    }

    fn source_filename(language: &Language) -> &'static str {
        match language {
            Language::Python => "main.py",
            Language::Java => "Main.java",
            Language::Rust => "main.rs",
        }
    }

    /// Compile / syntax-check command. For Python this is a pure syntax
    /// check; a failure here is a SyntaxError, not a runtime error.
    fn compile_command(language: &Language) -> &'static str {
        match language {
            Language::Python => "python3 -m py_compile /code/main.py 2>&1",
            Language::Java => "javac /code/Main.java 2>&1",
            Language::Rust => "rustc /code/main.rs -o /code/main 2>&1",
        }
    }

    fn run_command(language: &Language) -> &'static str {
        match language {
            Language::Python => "python3 -u /code/main.py",
            // Unset JAVA_TOOL_OPTIONS inside a subshell to keep JVM noise
            // out of stderr
            Language::Java => "(unset JAVA_TOOL_OPTIONS; java -cp /code Main)",
            Language::Rust => "/code/main",
        }
    }

    /// Run one program once with the given ceilings.
    ///
    /// Errors are infrastructure failures only (container could not be
    /// provisioned or teardown could not be confirmed). Every user-facing
    /// outcome - success, runtime error, timeout, memory kill, syntax
    /// error - is a structured field on the returned ExecutionResult.
    #[tracing::instrument(skip(self, code), fields(language = %language, time_limit_seconds, memory_limit_mb))]
    pub async fn execute_code(
        &self,
        code: &str,
        language: &Language,
        time_limit_seconds: u64,
        memory_limit_mb: u64,
    ) -> Result<ExecutionResult> {
        if code.len() > MAX_SOURCE_CODE_BYTES {
            bail!(
                "Source code exceeds maximum size of {} bytes",
                MAX_SOURCE_CODE_BYTES
            );
        }

        let image = self.languages.image(language)?;
        let container_name = format!("aula-{}", uuid::Uuid::new_v4());

        // Pre-pulled at startup; this only covers images evicted since then
        self.ensure_image(&image)
            .await
            .with_context(|| format!("Failed to ensure Docker image '{}' is available", image))?;

        let keepalive = time_limit_seconds + CONTAINER_LIFETIME_SLACK_SECS;
        let config = Config {
            image: Some(image.clone()),
            cmd: Some(vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                format!("mkdir -p /code && sleep {}", keepalive),
            ]),
            entrypoint: Some(vec![]),
            network_disabled: Some(true), // SECURITY: no network access
            host_config: Some(bollard::models::HostConfig {
                memory: Some((memory_limit_mb as i64) * 1024 * 1024),
                memory_swap: Some((memory_limit_mb as i64) * 1024 * 1024),
                nano_cpus: Some(self.languages.nano_cpus(language)),
                ..Default::default()
            }),
            working_dir: Some("/code".to_string()),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: container_name.as_str(),
            platform: None,
        };

        let container = self
            .docker
            .create_container(Some(create_options), config)
            .await
            .context("Failed to create Docker container")?;
        let container_id = container.id.clone();

        // Guard set up immediately after creation: removal is guaranteed
        // even if this task panics or is cancelled from here on
        let mut guard = ContainerGuard::new(self.docker.clone(), container_id.clone());

        self.docker
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await
            .context("Failed to start Docker container")?;

        self.write_source(&container_id, language, code).await?;

        let start_time = Instant::now();

        // Syntax / compile step first; a failure here never reaches the
        // run step
        let compile = self
            .exec_capture(&container_id, Self::compile_command(language))
            .await?;

        if compile.exit_code != Some(0) {
            let diagnostics = if compile.stdout.trim().is_empty() {
                compile.stderr
            } else {
                compile.stdout
            };
            debug!("Syntax check failed");
            let execution_time_ms = start_time.elapsed().as_millis() as u64;
            self.teardown(&container_id, &mut guard).await?;
            return Ok(ExecutionResult {
                output: String::new(),
                error: String::new(),
                timeout: false,
                timeout_message: None,
                memory_exceeded: false,
                memory_error_message: None,
                syntax_error: true,
                syntax_error_info: Some(diagnostics.trim().to_string()),
                container_cleaned: true,
                execution_time_ms,
            });
        }

        // Run step under a hard wall-clock ceiling
        let run_start = Instant::now();
        let timeout_duration = Duration::from_secs(time_limit_seconds);
        let run = tokio::time::timeout(
            timeout_duration,
            self.exec_capture(&container_id, Self::run_command(language)),
        )
        .await;

        let result = match run {
            Ok(Ok(output)) => {
                let execution_time_ms = run_start.elapsed().as_millis() as u64;
                match output.exit_code {
                    Some(0) => ExecutionResult {
                        output: output.stdout,
                        error: String::new(),
                        timeout: false,
                        timeout_message: None,
                        memory_exceeded: false,
                        memory_error_message: None,
                        syntax_error: false,
                        syntax_error_info: None,
                        container_cleaned: false, // set after teardown below
                        execution_time_ms,
                    },
                    Some(OOM_EXIT_CODE) => ExecutionResult {
                        output: output.stdout,
                        error: String::new(),
                        timeout: false,
                        timeout_message: None,
                        memory_exceeded: true,
                        memory_error_message: Some(format!(
                            "El programa supero el limite de memoria de {} MB",
                            memory_limit_mb
                        )),
                        syntax_error: false,
                        syntax_error_info: None,
                        container_cleaned: false,
                        execution_time_ms,
                    },
                    code => {
                        let mut error = output.stderr.trim().to_string();
                        if error.is_empty() {
                            error = format!(
                                "El programa termino con codigo de salida {}",
                                code.unwrap_or(-1)
                            );
                        }
                        ExecutionResult {
                            output: output.stdout,
                            error,
                            timeout: false,
                            timeout_message: None,
                            memory_exceeded: false,
                            memory_error_message: None,
                            syntax_error: false,
                            syntax_error_info: None,
                            container_cleaned: false,
                            execution_time_ms,
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                // Exec plumbing failed: infrastructure, not a wrong answer
                self.teardown(&container_id, &mut guard).await?;
                return Err(e.context("Failed to exec program in container"));
            }
            Err(_) => {
                // Wall clock exceeded: kill the whole container, which
                // terminates the entire process tree inside it
                warn!(time_limit_seconds, "Execution timed out, killing container");
                if let Err(e) = self
                    .docker
                    .kill_container(&container_id, None::<KillContainerOptions<String>>)
                    .await
                {
                    warn!(error = %e, "Failed to kill timed-out container");
                }
                ExecutionResult {
                    output: String::new(),
                    error: String::new(),
                    timeout: true,
                    timeout_message: Some(format!(
                        "El programa supero el limite de tiempo de {} segundos",
                        time_limit_seconds
                    )),
                    memory_exceeded: false,
                    memory_error_message: None,
                    syntax_error: false,
                    syntax_error_info: None,
                    container_cleaned: false,
                    execution_time_ms: run_start.elapsed().as_millis() as u64,
                }
            }
        };

        self.teardown(&container_id, &mut guard).await?;

        Ok(ExecutionResult {
            container_cleaned: true,
            ..result
        })
    }

    /// Confirmed teardown: remove the container and disarm the guard.
    /// If removal cannot be confirmed this is an infrastructure error;
    /// the guard stays armed and retries on drop.
    async fn teardown(&self, container_id: &str, guard: &mut ContainerGuard) -> Result<()> {
        let remove_options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.docker
            .remove_container(container_id, Some(remove_options))
            .await
            .context("Failed to confirm container teardown")?;
        guard.disarm();
        debug!(container_id = %container_id, "Container removed");
        Ok(())
    }

    /// Write the submitted source into the container's scratch dir.
    async fn write_source(
        &self,
        container_id: &str,
        language: &Language,
        code: &str,
    ) -> Result<()> {
        let encoded = general_purpose::STANDARD.encode(code);
        let command = format!(
            "echo '{}' | base64 -d > /code/{}",
            encoded,
            Self::source_filename(language)
        );

        let output = self.exec_capture(container_id, &command).await?;
        if output.exit_code != Some(0) {
            bail!("Failed to write source code to container");
        }
        Ok(())
    }

    /// Run one shell command inside the container and collect its output.
    async fn exec_capture(&self, container_id: &str, command: &str) -> Result<ExecOutput> {
        let exec_config = CreateExecOptions {
            cmd: Some(vec!["/bin/sh".to_string(), "-c".to_string(), command.to_string()]),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec = self
            .docker
            .create_exec(container_id, exec_config)
            .await
            .context("Failed to create exec")?;

        let start_config = StartExecOptions {
            detach: false,
            ..Default::default()
        };

        let started = self
            .docker
            .start_exec(&exec.id, Some(start_config))
            .await
            .context("Failed to start exec")?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } = started {
            while let Some(msg) = output.next().await {
                match msg {
                    Ok(LogOutput::StdOut { message }) => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(LogOutput::StdErr { message }) => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Error reading exec output");
                        break;
                    }
                }
            }
        }

        let inspect = self
            .docker
            .inspect_exec(&exec.id)
            .await
            .context("Failed to inspect exec")?;

        Ok(ExecOutput {
            stdout,
            stderr,
            exit_code: inspect.exit_code,
        })
    }
}
