fn main() {
    aitlisp::cli::run();
}
