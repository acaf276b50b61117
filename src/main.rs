use std::process;

fn main() {
    if let Err(err) = specbars::app::run() {
        eprintln!("{}", specbars::app::diagnostic(&err));
        process::exit(1);
    }
}
