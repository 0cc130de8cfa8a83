use std::process::ExitCode;

fn main() -> ExitCode {
    babelflag_cli::run()
}
