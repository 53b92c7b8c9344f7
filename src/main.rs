use std::process::ExitCode;

fn main() -> ExitCode {
    match imgsplit::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
