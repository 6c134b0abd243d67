//! User-facing console messages, separate from the tracing log stream.
//! Prefixes are colored only when the target stream is a TTY.

use owo_colors::OwoColorize;

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Ok,
    Warn,
    Error,
}

impl Tone {
    fn label(self) -> &'static str {
        match self {
            Tone::Info => "info:",
            Tone::Ok => "ok:",
            Tone::Warn => "warn:",
            Tone::Error => "error:",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Tone::Warn | Tone::Error)
    }
}

fn emit(tone: Tone, msg: &str) {
    let stream = if tone.to_stderr() {
        atty::Stream::Stderr
    } else {
        atty::Stream::Stdout
    };
    let label = tone.label();
    let line = if atty::is(stream) {
        let colored = match tone {
            Tone::Info => label.cyan().bold().to_string(),
            Tone::Ok => label.green().bold().to_string(),
            Tone::Warn => label.yellow().bold().to_string(),
            Tone::Error => label.red().bold().to_string(),
        };
        format!("{colored} {msg}")
    } else {
        format!("{label} {msg}")
    };
    if tone.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn print_info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn print_success(msg: &str) {
    emit(Tone::Ok, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tone::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tone::Error, msg);
}
