pub mod prompt;

use console::Term;

/// Console writer shared by the output macros.
pub struct Writer {
    term: Term,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            term: Term::stdout(),
        }
    }

    pub fn get_max_len(&self) -> u16 {
        let (_, width) = self.term.size();
        if width > 150 {
            150
        } else {
            width
        }
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Right-align `prefix` in a 10 character gutter so message bodies line up.
pub fn gen_prefix(prefix: &str) -> String {
    let width = console::measure_text_width(prefix);
    let pad = 10usize.saturating_sub(width);
    format!("{}{} ", " ".repeat(pad), prefix)
}

#[macro_export]
macro_rules! msg {
    ($prefix:expr, $($arg:tt)+) => ({
        print!("{}", $crate::cli::gen_prefix($prefix));
        println!($($arg)+);
    });
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => ({
        print!("{}", $crate::cli::gen_prefix(&console::style("INFO").blue().to_string()));
        println!($($arg)+);
    });
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => ({
        print!("{}", $crate::cli::gen_prefix(&console::style("WARN").yellow().bold().to_string()));
        println!($($arg)+);
    });
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => ({
        print!("{}", $crate::cli::gen_prefix(&console::style("ERROR").red().bold().to_string()));
        println!($($arg)+);
    });
}

#[macro_export]
macro_rules! due_to {
    ($($arg:tt)+) => ({
        print!("{}", $crate::cli::gen_prefix(&console::style("DUE TO").yellow().bold().to_string()));
        println!($($arg)+);
    });
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => ({
        print!("{}", $crate::cli::gen_prefix(&console::style("DONE").green().bold().to_string()));
        println!($($arg)+);
    });
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => ({
        if $crate::DEBUG.load(std::sync::atomic::Ordering::Relaxed) {
            print!("{}", $crate::cli::gen_prefix(&console::style("DEBUG").dim().to_string()));
            println!($($arg)+);
        }
    });
}
