use clap::Parser;
use datascope::{Cli, run};

fn main() {
    // Restore default SIGPIPE handling so piping query output into
    // `head` or `less` terminates quietly instead of panicking
    #[cfg(unix)]
    restore_default_sigpipe();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn restore_default_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
