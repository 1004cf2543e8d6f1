//! Out-of-process model codec driven by a configurable command template.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::{Extracted, ModelCodec};
use crate::error::{ModelError, ModelResult};

/// Artifact file names the external tool reads and writes in its work dir.
pub const ARCHITECTURE_FILE: &str = "architecture.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const WEIGHTS_FILE: &str = "weights.safetensors";

/// Command templates and limits for [`CommandCodec`].
///
/// Each template is an argv vector whose elements may contain placeholders,
/// substituted per invocation:
///
/// - extract: `{model}` (input model file), `{out_dir}` (directory the tool
///   must write `architecture.json`, `metadata.json` and
///   `weights.safetensors` into)
/// - rebuild: `{weights}`, `{architecture}`, `{metadata}` (input artifact
///   files) and `{output}` (model file to produce)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCodecConfig {
    /// argv template for extraction.
    pub extract: Vec<String>,
    /// argv template for rebuild.
    pub rebuild: Vec<String>,
    /// Wall-clock bound per invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for CommandCodecConfig {
    fn default() -> Self {
        Self {
            extract: vec![
                "model-codec".into(),
                "extract".into(),
                "{model}".into(),
                "{out_dir}".into(),
            ],
            rebuild: vec![
                "model-codec".into(),
                "rebuild".into(),
                "{weights}".into(),
                "{architecture}".into(),
                "{metadata}".into(),
                "{output}".into(),
            ],
            timeout_secs: 600,
        }
    }
}

/// Model codec that shells out to an external tool.
///
/// The tool, its arguments, and the timeout all come from configuration;
/// nothing is hardcoded. Stdout and stderr are captured and folded into the
/// error on failure, so a misbehaving tool is diagnosable from the error
/// alone.
#[derive(Clone, Debug)]
pub struct CommandCodec {
    config: CommandCodecConfig,
}

impl CommandCodec {
    /// Create a codec from its configuration.
    pub fn new(config: CommandCodecConfig) -> Self {
        Self { config }
    }

    fn render(template: &[String], substitute: impl Fn(&str) -> Option<String>) -> Vec<String> {
        template
            .iter()
            .map(|arg| {
                let mut rendered = arg.clone();
                for key in ["{model}", "{out_dir}", "{weights}", "{architecture}", "{metadata}", "{output}"] {
                    if rendered.contains(key) {
                        if let Some(value) = substitute(key) {
                            rendered = rendered.replace(key, &value);
                        }
                    }
                }
                rendered
            })
            .collect()
    }

    /// Run an argv with the configured timeout, capturing output to temp
    /// files (pipes could fill and deadlock the poll loop).
    fn run(&self, argv: &[String], context: &str) -> ModelResult<()> {
        let (program, args) = argv.split_first().ok_or_else(|| ModelError::Codec {
            context: context.to_string(),
            detail: "empty command template".to_string(),
        })?;

        let stdout_file = tempfile::tempfile()?;
        let stderr_file = tempfile::tempfile()?;
        debug!(context, program = program.as_str(), "invoking model codec");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .spawn()
            .map_err(|e| ModelError::Codec {
                context: context.to_string(),
                detail: format!("failed to spawn {program}: {e}"),
            })?;

        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                warn!(context, "model codec timed out, killing");
                let _ = child.kill();
                let _ = child.wait();
                return Err(ModelError::Timeout {
                    context: context.to_string(),
                    seconds: self.config.timeout_secs,
                });
            }
            std::thread::sleep(Duration::from_millis(25));
        };

        if !status.success() {
            let stderr = read_capture(stderr_file);
            return Err(ModelError::Codec {
                context: context.to_string(),
                detail: format!("exit status {status}: {stderr}"),
            });
        }
        Ok(())
    }
}

fn read_capture(mut file: fs::File) -> String {
    use std::io::{Read, Seek, SeekFrom};
    let mut out = String::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.take(16 * 1024).read_to_string(&mut out);
    }
    out.trim().to_string()
}

fn read_artifact(path: &Path) -> ModelResult<Vec<u8>> {
    if !path.is_file() {
        return Err(ModelError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    Ok(fs::read(path)?)
}

impl ModelCodec for CommandCodec {
    fn extract(&self, model_path: &Path) -> ModelResult<Extracted> {
        let work = tempfile::tempdir()?;
        let model = model_path.display().to_string();
        let out_dir = work.path().display().to_string();
        let argv = Self::render(&self.config.extract, |key| match key {
            "{model}" => Some(model.clone()),
            "{out_dir}" => Some(out_dir.clone()),
            _ => None,
        });
        self.run(&argv, &format!("extract {model}"))?;

        Ok(Extracted {
            architecture: read_artifact(&work.path().join(ARCHITECTURE_FILE))?,
            metadata: read_artifact(&work.path().join(METADATA_FILE))?,
            weights: read_artifact(&work.path().join(WEIGHTS_FILE))?,
        })
    }

    fn rebuild(
        &self,
        weights: &[u8],
        architecture: &[u8],
        metadata: &[u8],
        output_path: &Path,
    ) -> ModelResult<()> {
        let work = tempfile::tempdir()?;
        let weights_path = work.path().join(WEIGHTS_FILE);
        let architecture_path = work.path().join(ARCHITECTURE_FILE);
        let metadata_path = work.path().join(METADATA_FILE);
        fs::write(&weights_path, weights)?;
        fs::write(&architecture_path, architecture)?;
        fs::write(&metadata_path, metadata)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let argv = Self::render(&self.config.rebuild, |key| match key {
            "{weights}" => Some(weights_path.display().to_string()),
            "{architecture}" => Some(architecture_path.display().to_string()),
            "{metadata}" => Some(metadata_path.display().to_string()),
            "{output}" => Some(output_path.display().to_string()),
            _ => None,
        });
        self.run(&argv, &format!("rebuild {}", output_path.display()))?;

        if !output_path.is_file() {
            return Err(ModelError::MissingArtifact {
                path: output_path.to_path_buf(),
            });
        }
        Ok(())
    }
}
