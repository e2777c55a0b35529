//! Root `sasspiler --source <path> --dest <path>` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::CompileArgs;
use sasspiler::builder::executor::{BatchProgress, Schedule};
use sasspiler::builder::sass::SassCompiler;
use sasspiler::core::ImportPaths;
use sasspiler::ops::sasspiler_compile::{check_source, compile, CompileOptions};
use sasspiler::util::diagnostic::SasspilerError;
use sasspiler::util::fs::{FileSystem, OsFileSystem};
use sasspiler::util::shell::{format_duration, Shell, Status};
use sasspiler::util::GlobalContext;

pub fn execute(args: CompileArgs, shell: &Shell) -> Result<()> {
    let source = args.source.ok_or_else(SasspilerError::missing_source)?;
    let dest = args.dest.ok_or_else(SasspilerError::missing_dest)?;

    let ctx = GlobalContext::new()?;

    // Load configuration (global + project)
    let config = ctx.load_config();

    // Schedule: CLI > config > sequential
    let schedule = if args.parallel || args.jobs.is_some() {
        Schedule::Parallel {
            jobs: args.jobs.or(config.build.jobs),
        }
    } else {
        config.schedule()
    };

    // Style: CLI > config > expanded
    let style = args.style.or_else(|| config.style()).unwrap_or_default();
    let compiler = SassCompiler::new(config.program()).style(style);

    // CLI import dirs come first, then configured ones
    let mut import_paths: ImportPaths = args.import_dirs.into_iter().collect();
    import_paths.extend_unique(config.build.include_paths.iter().map(|p| ctx.resolve(p)));

    let opts = CompileOptions {
        source,
        dest,
        import_paths,
        schedule,
    };

    let mut progress = BatchProgress::new(0);
    if matches!(schedule, Schedule::Parallel { .. }) {
        if let Some(bar) = shell.progress_bar() {
            progress = progress.with_bar(bar);
        }
    }

    let fs: Arc<dyn FileSystem> = Arc::new(OsFileSystem::new());
    check_source(fs.as_ref(), &opts.source)?;

    shell.status(
        Status::Compiling,
        format!("{} -> {}", opts.source.display(), opts.dest.display()),
    );

    let result = compile(
        fs,
        Arc::new(compiler),
        &opts,
        progress.clone(),
    );
    progress.finish();
    let summary = result?;

    if summary.outcomes.is_empty() {
        shell.status(
            Status::Skipped,
            format!("no stylesheets found in {}", opts.source.display()),
        );
    }

    shell.status(
        Status::Finished,
        format!(
            "{} file(s) ({} skipped) in {}",
            summary.converted(),
            summary.skipped(),
            format_duration(summary.elapsed)
        ),
    );

    Ok(())
}
