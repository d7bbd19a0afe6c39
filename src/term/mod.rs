/*!
## Terminal module

The interactive front end: a linefeed interface for the `Diag> ` prompt and
the `input` verb, ctrl-c folded into the break flag, and bold error lines.

*/

use crate::disc::LinuxDisc;
use crate::mach::{Console, Machine};
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct TermConsole {
    interface: Interface<linefeed::DefaultTerminal>,
    brk: Arc<AtomicBool>,
}

impl TermConsole {
    pub fn new(brk: Arc<AtomicBool>) -> std::io::Result<TermConsole> {
        let interface = Interface::new("discdiag")?;
        interface.set_report_signal(Signal::Interrupt, true);
        Ok(TermConsole { interface, brk })
    }
}

impl Console for TermConsole {
    fn print(&mut self, s: &str) {
        let _ = self.interface.write_fmt(format_args!("{}", s));
    }

    fn print_error(&mut self, s: &str) {
        let _ = self
            .interface
            .write_fmt(format_args!("{}", Style::new().bold().paint(s)));
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if self.interface.set_prompt(prompt).is_err() {
            return None;
        }
        match self.interface.read_line() {
            Ok(ReadResult::Input(line)) => {
                if !line.trim().is_empty() {
                    self.interface.add_history_unique(line.clone());
                }
                Some(line)
            }
            Ok(ReadResult::Signal(Signal::Interrupt)) => {
                // interrupt during entry becomes a sampled break
                self.brk.store(true, Ordering::SeqCst);
                Some(String::new())
            }
            Ok(ReadResult::Signal(_)) | Ok(ReadResult::Eof) => None,
            Err(_) => None,
        }
    }
}

pub fn main() {
    println!("Disc Diagnostic 2.1");
    println!();
    println!("Enter ? or Help for command list");
    println!();
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");
    let console = match TermConsole::new(interrupted.clone()) {
        Ok(console) => console,
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    };
    println!("Linux interface");
    println!();
    let mut machine = Machine::new(Box::new(LinuxDisc::new()), Box::new(console), interrupted);
    machine.repl();
    std::process::exit(machine.exit_code());
}
