use kakeibo_core::cli::{output, run_cli};

fn main() {
    kakeibo_core::init();

    if let Err(err) = run_cli() {
        output::error(format!("CLI terminated: {}", err));
        std::process::exit(1);
    }
}
