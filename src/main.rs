fn main() -> std::process::ExitCode {
    minsftp_lib::run()
}
