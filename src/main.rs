fn main() {
    if let Err(e) = particle_morph::core::Engine::run() {
        eprintln!("Engine failed to start: {}", e);
        std::process::exit(1);
    }
}
