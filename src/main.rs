use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    fanout::cli::run()
}
