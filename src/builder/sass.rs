//! Compiler backed by the `sass` command-line executable.
//!
//! Each conversion pipes the source into `sass --stdin` and copies its
//! stdout into the destination. Compiler diagnostics are returned verbatim.

use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};

use crate::builder::compiler::{Compiler, Converter};
use crate::core::StyleSyntax;
use crate::util::diagnostic::SasspilerError;
use crate::util::process::{find_executable, ProcessBuilder};

/// Default executable name.
pub const DEFAULT_PROGRAM: &str = "sass";

/// CSS output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// One declaration per line.
    #[default]
    Expanded,
    /// Minified output.
    Compressed,
}

impl OutputStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expanded" => Ok(OutputStyle::Expanded),
            "compressed" => Ok(OutputStyle::Compressed),
            _ => Err(format!(
                "invalid output style '{}'; expected 'expanded' or 'compressed'",
                s
            )),
        }
    }
}

/// [`Compiler`] that shells out to a Sass executable.
#[derive(Debug, Clone)]
pub struct SassCompiler {
    program: PathBuf,
    style: OutputStyle,
}

impl SassCompiler {
    /// Create a compiler that runs `program` (looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        SassCompiler {
            program: program.into(),
            style: OutputStyle::default(),
        }
    }

    /// Set the output style.
    pub fn style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

}

impl Default for SassCompiler {
    fn default() -> Self {
        SassCompiler::new(DEFAULT_PROGRAM)
    }
}

impl Compiler for SassCompiler {
    fn converter<'a>(
        &self,
        syntax: StyleSyntax,
        dest: &'a mut dyn Write,
        src: &'a mut dyn Read,
    ) -> Result<Box<dyn Converter + 'a>> {
        let program = find_executable(&self.program).ok_or_else(|| {
            SasspilerError::CompilerNotFound {
                program: self.program.display().to_string(),
            }
        })?;

        Ok(Box::new(SassConverter {
            program,
            syntax,
            style: self.style,
            load_paths: Vec::new(),
            dest,
            src,
        }))
    }
}

struct SassConverter<'a> {
    program: PathBuf,
    syntax: StyleSyntax,
    style: OutputStyle,
    load_paths: Vec<PathBuf>,
    dest: &'a mut dyn Write,
    src: &'a mut dyn Read,
}

impl SassConverter<'_> {
    fn command(&self, input: Vec<u8>) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program).args(["--stdin", "--no-source-map"]);
        // stdin is read as SCSS unless told otherwise.
        if self.syntax == StyleSyntax::Sass {
            cmd = cmd.arg("--indented");
        }
        cmd.arg(format!("--style={}", self.style))
            .args(
                self.load_paths
                    .iter()
                    .map(|p| format!("--load-path={}", p.display())),
            )
            .stdin(input)
    }
}

impl Converter for SassConverter<'_> {
    fn include_paths(&mut self, paths: &[PathBuf]) -> Result<()> {
        self.load_paths.extend(paths.iter().cloned());
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let mut input = Vec::new();
        self.src.read_to_end(&mut input)?;

        let cmd = self.command(input);
        tracing::trace!("running {}", cmd.display_command());

        let output = cmd.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{}", stderr.trim_end());
        }

        self.dest.write_all(&output.stdout)?;
        Ok(())
    }
}
