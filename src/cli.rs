use crate::each::{concurrent_filter_map, concurrent_flat_map, concurrent_for_each, concurrent_map};
use crate::shell::{CommandError, ShellCommand};
use crate::types::{ApiResponse, Concurrency, Context, Dispatch, Limit, Priority};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "fanout",
    version,
    about = "Run a command for every input line with bounded, ordered concurrency (JSON only)"
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Command,
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the command for every line; succeed only if all of them do
    Each(RunArgs),
    /// Collect each command's trimmed stdout, in input order
    Map(RunArgs),
    /// Like map, but drop lines whose command printed nothing
    Filter(RunArgs),
    /// Collect every stdout line of every command, in input order
    Flat(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    exec: ExecArgs,
    /// Read input lines from FILE instead of stdin
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Program and arguments; `{}` is replaced by the input line
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[derive(Args)]
struct ExecArgs {
    /// Commands in flight per window
    #[arg(short = 'j', long = "jobs", env = "FANOUT_JOBS")]
    jobs: Option<Limit>,
    /// Put every line in a single window
    #[arg(long)]
    unbounded: bool,
    /// One command at a time, stopping at the first failure
    #[arg(long)]
    sequential: bool,
    /// Spawn commands onto worker threads instead of polling them in place
    #[arg(long)]
    spawn: bool,
    /// Scheduling hint attached to every unit (low, normal, high)
    #[arg(long)]
    priority: Option<Priority>,
}

impl ExecArgs {
    /// `--sequential` wins over `--unbounded`, which wins over `--jobs`.
    fn context(&self) -> Context {
        let mut ctx = Context::new();
        if let Some(limit) = self.jobs {
            ctx = ctx.with_limit(limit);
        }
        if self.unbounded {
            ctx = ctx.unbounded();
        }
        if self.sequential {
            ctx = ctx.sequential();
        }
        if self.spawn {
            ctx = ctx.with_dispatch(Dispatch::Spawned);
        }
        if let Some(priority) = self.priority {
            ctx = ctx.with_priority(priority);
        }
        ctx
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Each,
    Map,
    Filter,
    Flat,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub concurrency: Concurrency,
    pub items: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Absent for `each`, which produces no values.
    pub results: Option<Vec<String>>,
}

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    crate::log::init(cli.verbose);

    let (mode, args) = match cli.cmd {
        Command::Each(args) => (Mode::Each, args),
        Command::Map(args) => (Mode::Map, args),
        Command::Filter(args) => (Mode::Filter, args),
        Command::Flat(args) => (Mode::Flat, args),
    };
    let ctx = args.exec.context();
    let lines = read_lines(args.input.as_deref())?;
    let cmd = ShellCommand::from_argv(args.command)?;

    let outcome = crate::runtime::block_on(execute(mode, lines, ctx, cmd));
    finish(outcome)
}

/// Run `cmd` over `lines` with the call pattern matching `mode`.
pub async fn execute(
    mode: Mode,
    lines: Vec<String>,
    ctx: Context,
    cmd: ShellCommand,
) -> Result<RunReport, CommandError> {
    let started_at = Utc::now();
    let timer = Instant::now();
    let items = lines.len();
    let cmd = Arc::new(cmd);
    info!(?mode, items, program = cmd.program(), "starting run");

    let results = match mode {
        Mode::Each => {
            concurrent_for_each(lines, &ctx, move |line: String| {
                let cmd = Arc::clone(&cmd);
                async move { cmd.status(&line).await }
            })
            .await?;
            None
        }
        Mode::Map => Some(
            concurrent_map(lines, &ctx, move |line: String| {
                let cmd = Arc::clone(&cmd);
                async move { cmd.stdout(&line).await }
            })
            .await?,
        ),
        Mode::Filter => Some(
            concurrent_filter_map(lines, &ctx, move |line: String| {
                let cmd = Arc::clone(&cmd);
                async move { cmd.stdout_nonempty(&line).await }
            })
            .await?,
        ),
        Mode::Flat => Some(
            concurrent_flat_map(lines, &ctx, move |line: String| {
                let cmd = Arc::clone(&cmd);
                async move { cmd.stdout_lines(&line).await }
            })
            .await?,
        ),
    };

    let duration_ms = timer.elapsed().as_millis() as u64;
    info!(?mode, items, duration_ms, "run finished");
    Ok(RunReport {
        mode,
        concurrency: ctx.concurrency,
        items,
        started_at,
        duration_ms,
        results,
    })
}

/// Non-blank, trimmed lines from `path`, or stdin when `None`.
pub fn read_lines(path: Option<&Path>) -> crate::Result<Vec<String>> {
    let raw = match path {
        Some(p) => std::fs::read_to_string(p)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(parse_lines(&raw))
}

fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn finish(res: Result<RunReport, CommandError>) -> anyhow::Result<ExitCode> {
    match res {
        Ok(report) => {
            print_json(&ApiResponse::ok(report))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::warn!(error = %e, "run failed");
            print_json(&ApiResponse::<()>::err(e.to_string()))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn print_json<T: Serialize>(val: &T) -> crate::Result<()> {
    // pretty JSON output
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn exec_of(cli: Cli) -> (Mode, Context, Vec<String>) {
        match cli.cmd {
            Command::Each(a) => (Mode::Each, a.exec.context(), a.command),
            Command::Map(a) => (Mode::Map, a.exec.context(), a.command),
            Command::Filter(a) => (Mode::Filter, a.exec.context(), a.command),
            Command::Flat(a) => (Mode::Flat, a.exec.context(), a.command),
        }
    }

    #[test]
    fn test_parse_jobs_and_command() {
        let (mode, ctx, command) =
            exec_of(parse(&["fanout", "map", "-j", "3", "--", "echo", "-n", "{}"]));
        assert_eq!(mode, Mode::Map);
        assert_eq!(ctx.concurrency.width(), Some(3));
        assert_eq!(command, vec!["echo", "-n", "{}"]);
    }

    #[test]
    fn test_parse_rejects_zero_jobs() {
        assert!(Cli::try_parse_from(["fanout", "each", "-j", "0", "true"]).is_err());
    }

    #[test]
    fn test_flag_precedence() {
        let (_, ctx, _) = exec_of(parse(&[
            "fanout", "flat", "-j", "4", "--unbounded", "--spawn", "--priority", "high", "cat",
        ]));
        assert_eq!(ctx.concurrency, Concurrency::Unbounded);
        assert_eq!(ctx.dispatch, Dispatch::Spawned);
        assert_eq!(ctx.priority, Some(Priority::High));

        let (_, ctx, _) = exec_of(parse(&["fanout", "each", "--unbounded", "--sequential", "true"]));
        assert_eq!(ctx.concurrency, Concurrency::Sequential);
    }

    #[test]
    fn test_parse_lines_skips_blanks() {
        assert_eq!(parse_lines("a\n\n  b  \n\t\nc"), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_execute_map_keeps_input_order() {
        let lines: Vec<String> = ["3", "1", "2"].iter().map(|s| s.to_string()).collect();
        let cmd = ShellCommand::from_argv(vec!["echo".into()]).unwrap();
        let ctx = Context::new().with_concurrency(2).unwrap();
        let concurrency = ctx.concurrency;

        let report = execute(Mode::Map, lines, ctx, cmd).await.unwrap();
        assert_eq!(report.items, 3);
        assert_eq!(report.concurrency, concurrency);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "map");
        assert_eq!(json["concurrency"]["mode"], "bounded");
        assert_eq!(json["concurrency"]["limit"], 2);
        assert!(json.get("context").is_none());
        assert_eq!(
            report.results,
            Some(vec!["3".to_string(), "1".to_string(), "2".to_string()])
        );
    }

    #[tokio::test]
    async fn test_execute_each_surfaces_first_failure() {
        let lines: Vec<String> = ["ok", "bad", "worse"].iter().map(|s| s.to_string()).collect();
        let cmd = ShellCommand::from_argv(vec![
            "sh".into(),
            "-c".into(),
            "test {} = ok".into(),
        ])
        .unwrap();

        let err = execute(Mode::Each, lines, Context::new(), cmd).await.unwrap_err();
        match err {
            CommandError::Failed { input, .. } => assert_eq!(input, "bad"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
