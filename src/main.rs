fn main() {
    if let Err(e) = token_covenant::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
