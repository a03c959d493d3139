//! rFichaje main entrypoint.

use rfichaje::run;
use rfichaje::ui::messages::error;

fn main() {
    println!();
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
