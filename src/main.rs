fn main() {
    if let Err(err) = mindwell_lib::run() {
        eprintln!("mindwell: {err:#}");
        std::process::exit(1);
    }
}
