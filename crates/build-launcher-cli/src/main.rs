use std::process;

fn main() {
    match build_launcher_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("build-launcher error: {err}");
            process::exit(1);
        }
    }
}
