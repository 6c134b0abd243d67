use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    let args = ext_sorter::cli::parse();
    app::run(args)
}
