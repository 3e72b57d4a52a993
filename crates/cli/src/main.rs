use std::process::ExitCode;

fn main() -> ExitCode {
    inboxpilot_cli::run()
}
