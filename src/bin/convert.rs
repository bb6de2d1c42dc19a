use std::io::{self, Read};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut html = String::new();
    io::stdin().read_to_string(&mut html).expect("read stdin");
    match tagmark::convert(&html) {
        Ok(md) => {
            print!("{md}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
