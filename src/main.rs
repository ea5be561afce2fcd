// Main entry point that forwards to the library
fn main() {
    std::process::exit(match quantum_forge::main() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    });
}
