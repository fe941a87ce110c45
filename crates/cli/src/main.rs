use std::process::ExitCode;

fn main() -> ExitCode {
    custsync_cli::run()
}
