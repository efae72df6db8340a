//! Byte sources and artifact collections
//!
//! A source is reopened for every digest, so the same collection can be
//! generated and later checked.

use crate::digest::stream::digest_labeled;
use crate::digest::{DigestAlgorithm, DigestOptions, DigestResult, Encoding};
use crate::errors::{DriftXError, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Supplier of the bytes of one artifact
pub trait ByteSource: Send + Sync {
    /// Open a fresh stream over the full content
    ///
    /// # Errors
    ///
    /// Any I/O error that prevents the stream from starting.
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Human-readable origin used in errors and logs
    fn describe(&self) -> String;
}

/// Digest everything a source yields
///
/// # Errors
///
/// Returns `SourceRead` naming the source if it cannot be opened or fails
/// before end of stream.
pub fn digest_source(
    source: &dyn ByteSource,
    algorithm: DigestAlgorithm,
    encoding: Encoding,
    options: &DigestOptions,
) -> Result<DigestResult> {
    options.validate()?;
    let origin = source.describe();
    let reader = source.open().map_err(|e| DriftXError::SourceRead {
        origin: origin.clone(),
        message: e.to_string(),
    })?;
    digest_labeled(reader, &origin, algorithm, encoding, options)
}

/// File on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// In-memory fixture
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ByteSource for MemorySource {
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(self.bytes.as_slice()))
    }

    fn describe(&self) -> String {
        format!("memory:{} bytes", self.bytes.len())
    }
}

/// Captured stdout of an external process
///
/// Output is streamed, not buffered. The stream fails if the process exits
/// unsuccessfully, so a crashed command never yields a digest.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Build from an argv list; the first element is the program
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty list.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| DriftXError::InvalidInput {
            reason: "command must name a program".to_string(),
        })?;
        Ok(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl ByteSource for CommandSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;

        Ok(Box::new(CommandOutput {
            child,
            stdout,
            exited: false,
            description: self.describe(),
        }))
    }

    fn describe(&self) -> String {
        let mut rendered = format!("command:{}", self.program);
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Child stdout that reports the exit status at end of stream
struct CommandOutput {
    child: Child,
    stdout: ChildStdout,
    exited: bool,
    description: String,
}

impl Read for CommandOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stdout.read(buf)?;
        if n == 0 && !buf.is_empty() && !self.exited {
            self.exited = true;
            let status = self.child.wait()?;
            if !status.success() {
                return Err(io::Error::other(format!(
                    "{} exited with {}",
                    self.description, status
                )));
            }
        }
        Ok(n)
    }
}

impl Drop for CommandOutput {
    fn drop(&mut self) {
        if !self.exited {
            self.child.kill().ok();
            self.child.wait().ok();
        }
    }
}

/// Named artifact under verification
pub struct Artifact {
    id: String,
    source: Box<dyn ByteSource>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, source: impl ByteSource + 'static) -> Self {
        Self {
            id: id.into(),
            source: Box::new(source),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &dyn ByteSource {
        self.source.as_ref()
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("id", &self.id)
            .field("source", &self.source.describe())
            .finish()
    }
}

/// Ordered sequence of artifacts; ids may repeat
#[derive(Debug, Default)]
pub struct Collection {
    artifacts: Vec<Artifact>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn with(mut self, id: impl Into<String>, source: impl ByteSource + 'static) -> Self {
        self.push(Artifact::new(id, source));
        self
    }

    pub fn with_text(self, id: impl Into<String>, text: &str) -> Self {
        self.with(id, MemorySource::new(text.as_bytes()))
    }

    pub fn with_file(self, id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.with(id, FileSource::new(path))
    }

    pub fn with_command(self, id: impl Into<String>, command: CommandSource) -> Self {
        self.with(id, command)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    pub fn as_slice(&self) -> &[Artifact] {
        &self.artifacts
    }
}

impl FromIterator<Artifact> for Collection {
    fn from_iter<T: IntoIterator<Item = Artifact>>(iter: T) -> Self {
        Self {
            artifacts: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}
