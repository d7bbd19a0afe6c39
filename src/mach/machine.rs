use super::command;
use super::program::Program;
use super::rng::Lcg;
use super::vars::Vars;
use crate::disc::{DiscIo, BUF_SECTORS, SECTOR_SIZE};
use crate::error;
use crate::lang::{expr, Cursor, Error, ErrorKind, Scope};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub(super) type Result<T> = std::result::Result<T, Error>;
pub(super) type Exec = Result<Outcome>;

/// Lines shown between pager stops.
const SCREEN_LINES: usize = 24;

/// What a verb tells the dispatcher to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Continue with the next command on the line.
    Ok,
    /// Terminate the diagnostic.
    Exit,
    /// Abort the current line and return to the prompt.
    Stop,
    /// The cursor was redirected; resume there without a terminator check.
    Restart,
}

/// Terminal seam. The real console runs over linefeed; tests script one.
pub trait Console {
    fn print(&mut self, s: &str);
    fn print_error(&mut self, s: &str);
    /// Read one line, `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Miscompare reporting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CompMode {
    All,
    One,
    Fail,
}

/// Mismatch policy state, reset at the start of every compare.
pub(super) struct CompState {
    pub mode: CompMode,
    pub first: bool,
    pub rep_a: u8,
    pub rep_b: u8,
    pub dataset: bool,
    pub repcnt: i64,
}

/// One interpreter level: `None` for the immediate-mode sentinel, otherwise
/// the program line being executed. `cursor` is the saved return position;
/// `mark` is the variables watermark restored on return.
pub(super) struct Frame {
    pub line: Option<usize>,
    pub cursor: usize,
    pub mark: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CtlKind {
    While,
    Repeat,
    For,
}

/// One control level for a multi-line loop, remembering where its condition
/// or end expression sits so the closing verb can re-evaluate it.
pub(super) struct Ctl {
    pub kind: CtlKind,
    pub line: Option<usize>,
    pub pos: usize,
    pub var: String,
    pub step: i64,
}

#[derive(Default)]
pub(super) struct Stats {
    pub iop_read: f64,
    pub iop_write: f64,
    pub bytes_read: f64,
    pub bytes_written: f64,
}

/// The diagnostic machine: two sector buffers, the current drive slot, the
/// variable and program stores, and the interpreter that drives them.
pub struct Machine {
    pub(super) disc: Box<dyn DiscIo>,
    pub(super) console: Box<dyn Console>,
    brk: Arc<AtomicBool>,
    pub(super) write_buffer: Vec<u8>,
    pub(super) read_buffer: Vec<u8>,
    pub(super) current_drive: Option<u32>,
    pub(super) drive_size: i64,
    pub(super) write_prot: bool,
    pub(super) rng: Lcg,
    pub(super) vars: Vars,
    pub(super) program: Program,
    pub(super) frames: Vec<Frame>,
    pub(super) ctls: Vec<Ctl>,
    pub(super) counters: HashMap<(Option<usize>, usize), i64>,
    immediate: String,
    pub(super) comp: CompState,
    pub(super) exit_on_error: bool,
    last_error: bool,
    pub(super) stats: Stats,
    screen_line: usize,
}

impl Machine {
    pub fn new(disc: Box<dyn DiscIo>, console: Box<dyn Console>, brk: Arc<AtomicBool>) -> Machine {
        Machine {
            disc,
            console,
            brk,
            write_buffer: vec![0u8; SECTOR_SIZE * BUF_SECTORS],
            read_buffer: vec![0u8; SECTOR_SIZE * BUF_SECTORS],
            current_drive: None,
            drive_size: 0,
            write_prot: true,
            rng: Lcg::new(),
            vars: Vars::new(),
            program: Program::new(),
            frames: Vec::new(),
            ctls: Vec::new(),
            counters: HashMap::new(),
            immediate: String::new(),
            comp: CompState {
                mode: CompMode::One,
                first: true,
                rep_a: 0,
                rep_b: 0,
                dataset: false,
                repcnt: 0,
            },
            exit_on_error: false,
            last_error: false,
            stats: Stats::default(),
            screen_line: 0,
        }
    }

    /// Process exit code: 1 only when the last command errored with
    /// `exitonerror` in force.
    pub fn exit_code(&self) -> i32 {
        (self.last_error && self.exit_on_error) as i32
    }

    /// The interactive loop: prompt, execute, report the timing window.
    pub fn repl(&mut self) {
        let mut mark = Instant::now();
        let (mut timed, quit) = self.run_startup();
        if quit {
            return;
        }
        loop {
            if timed {
                let secs = mark.elapsed().as_secs_f64();
                self.report(secs);
            }
            let line = match self.console.read_line("Diag> ") {
                Some(line) => line,
                None => break,
            };
            if self.check_break() {
                self.console.print("\n");
                if self.exit_on_error {
                    break;
                }
                continue;
            }
            mark = Instant::now();
            self.stats = Stats::default();
            timed = true;
            match self.enter(&line) {
                Outcome::Exit => break,
                _ => {}
            }
        }
    }

    /// Load `discdiag.ini` if present and run its `init` procedure. Returns
    /// (ran-a-timed-command, exit-requested).
    fn run_startup(&mut self) -> (bool, bool) {
        if self.program.load("discdiag.ini").is_ok() {
            self.console.print("Init file loaded\n\n");
        }
        let idx = match self.program.find_label("init") {
            Some(idx) => idx,
            None => return (false, false),
        };
        self.stats = Stats::default();
        self.immediate.clear();
        self.frames.clear();
        self.ctls.clear();
        self.counters.clear();
        self.frames.push(Frame {
            line: None,
            cursor: 0,
            mark: self.vars.mark(),
        });
        self.frames.push(Frame {
            line: Some(idx),
            cursor: 0,
            mark: self.vars.mark(),
        });
        let mut cur = self.cursor_for(Some(idx));
        let out = self.run(&mut cur);
        self.drain_frames();
        (true, out == Outcome::Exit)
    }

    /// Process one entered line: a leading decimal stores an edit, anything
    /// else executes immediately.
    pub fn enter(&mut self, line: &str) -> Outcome {
        let mut cur = Cursor::new(line);
        cur.skip_spaces();
        if cur.ch().is_ascii_digit() {
            if let Err(e) = self.program.enter(line) {
                self.report_error(&e);
            }
            return Outcome::Ok;
        }
        self.run_immediate(line)
    }

    fn run_immediate(&mut self, line: &str) -> Outcome {
        self.immediate = line.to_string();
        self.frames.clear();
        self.ctls.clear();
        self.counters.clear();
        self.frames.push(Frame {
            line: None,
            cursor: 0,
            mark: self.vars.mark(),
        });
        let mut cur = Cursor::new(line);
        let out = self.run(&mut cur);
        self.drain_frames();
        out
    }

    /// Execute from the cursor across program lines until the interpreter
    /// stack drains or something stops it.
    fn run(&mut self, cur: &mut Cursor) -> Outcome {
        loop {
            let r = self.run_line(cur);
            self.last_error = r.is_err();
            match r {
                Err(e) => {
                    if e.kind() == ErrorKind::Fatal {
                        self.console.print_error(&format!("*** Error: {}\n", e));
                        self.console.print_error("***        Halting program\n");
                        std::process::exit(1);
                    }
                    self.report_error(&e);
                    if self.exit_on_error {
                        return Outcome::Exit;
                    }
                    return Outcome::Stop;
                }
                Ok(Outcome::Exit) => return Outcome::Exit,
                Ok(Outcome::Stop) => return Outcome::Stop,
                Ok(_) => {}
            }
            // the line is spent, follow the program to the next one
            if !self.in_program() {
                return Outcome::Ok;
            }
            let next = self.frames.last().unwrap().line.unwrap() + 1;
            if next >= self.program.len() {
                // running off the end always terminates execution
                self.drain_frames();
                return Outcome::Ok;
            }
            self.frames.last_mut().unwrap().line = Some(next);
            *cur = self.cursor_for(Some(next));
        }
    }

    /// Execute the commands of one line, `;`-separated, honoring comments,
    /// break sampling, and cursor redirection.
    fn run_line(&mut self, cur: &mut Cursor) -> Exec {
        loop {
            cur.skip_spaces();
            if cur.at_end() || cur.ch() == b'!' {
                return Ok(Outcome::Ok);
            }
            let r = self.exec_verb(cur)?;
            match r {
                Outcome::Exit => return Ok(Outcome::Exit),
                Outcome::Stop => return Ok(Outcome::Stop),
                _ => {}
            }
            if self.check_break() {
                return Ok(self.break_outcome());
            }
            cur.skip_spaces();
            if cur.ch() == b'!' {
                return Ok(Outcome::Ok);
            }
            if r != Outcome::Restart {
                if !cur.at_end() && cur.ch() != b';' {
                    return error!(Syntax; "Invalid command termination");
                }
                if cur.ch() == b';' {
                    cur.bump();
                }
            }
        }
    }

    /// Parse one verb and run it: program labels first, so procedures can
    /// shadow built-ins, then the command table.
    fn exec_verb(&mut self, cur: &mut Cursor) -> Exec {
        let word = cur.take_word();
        if let Some(idx) = self.program.find_label(&word) {
            let params = self.program.get(idx).unwrap().params().to_vec();
            let mark = self.vars.mark();
            for param in params {
                let val = match expr::eval(cur, self) {
                    Ok(val) => val,
                    Err(e) => {
                        self.vars.release(mark);
                        return Err(e);
                    }
                };
                self.vars.push(&param, val);
            }
            let pos = cur.pos();
            if let Some(top) = self.frames.last_mut() {
                top.cursor = pos;
            }
            self.frames.push(Frame {
                line: Some(idx),
                cursor: 0,
                mark,
            });
            *cur = self.cursor_for(Some(idx));
            return Ok(Outcome::Restart);
        }
        match command::lookup(&word) {
            Some(handler) => handler(self, cur),
            None => error!(Name; "Command \"{}\" invalid", word),
        }
    }

    /// Scan forward across commands and program lines for one of up to
    /// three terminator verbs, counting construct nesting so only a
    /// terminator at depth zero matches. Returns the 1-based index of the
    /// target found; running off the end drains the stack.
    pub(super) fn skip_to(&mut self, cur: &mut Cursor, targets: &[&str]) -> Result<usize> {
        let mut whl = 0i32;
        let mut rep = 0i32;
        let mut fors = 0i32;
        let mut sel = 0i32;
        cur.skip_command();
        loop {
            loop {
                cur.skip_spaces();
                if cur.at_end() {
                    break;
                }
                let word = cur.take_word();
                let mut consumed = false;
                match word.as_str() {
                    "while" => whl += 1,
                    "repeat" => rep += 1,
                    "for" => fors += 1,
                    "select" => sel += 1,
                    "wend" => {
                        if whl > 0 {
                            whl -= 1;
                            consumed = true;
                        }
                    }
                    "until" => {
                        if rep > 0 {
                            rep -= 1;
                            consumed = true;
                        }
                    }
                    "fend" => {
                        if fors > 0 {
                            fors -= 1;
                            consumed = true;
                        }
                    }
                    "send" => {
                        if sel > 0 {
                            sel -= 1;
                            consumed = true;
                        }
                    }
                    _ => {}
                }
                if !consumed && whl == 0 && rep == 0 && fors == 0 && sel == 0 {
                    if let Some(found) = targets.iter().position(|t| *t == word) {
                        return Ok(found + 1);
                    }
                }
                cur.skip_command();
            }
            if self.in_program() {
                let next = self.frames.last().unwrap().line.unwrap() + 1;
                if next >= self.program.len() {
                    self.drain_frames();
                    return error!(Flow; "No matching \"{}\" found", targets[0]);
                }
                self.frames.last_mut().unwrap().line = Some(next);
                *cur = self.cursor_for(Some(next));
            } else {
                self.drain_frames();
                return error!(Flow; "No matching \"{}\" found", targets[0]);
            }
        }
    }

    pub(super) fn in_program(&self) -> bool {
        self.frames.last().map_or(false, |f| f.line.is_some())
    }

    /// A cursor over the text a frame refers to: the transient line buffer
    /// for the immediate sentinel, the stored text otherwise.
    pub(super) fn cursor_for(&self, line: Option<usize>) -> Cursor {
        match line {
            None => Cursor::new(&self.immediate),
            Some(idx) => Cursor::new(self.program.get(idx).map(|l| l.text()).unwrap_or("")),
        }
    }

    /// Pop one interpreter level, destroying variables above the frame's
    /// watermark. The sentinel frame's variables survive.
    pub(super) fn pop_level(&mut self) -> Result<()> {
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return error!(Fatal; "System fault: Interpreter stack runs dry"),
        };
        if !self.frames.is_empty() {
            self.vars.release(frame.mark);
        }
        Ok(())
    }

    pub(super) fn drain_frames(&mut self) {
        while !self.frames.is_empty() {
            let _ = self.pop_level();
        }
    }

    /// Sample and clear the user break flag.
    pub(super) fn check_break(&mut self) -> bool {
        self.brk.swap(false, Ordering::SeqCst)
    }

    pub(super) fn break_outcome(&self) -> Outcome {
        if self.exit_on_error {
            Outcome::Exit
        } else {
            Outcome::Stop
        }
    }

    pub(super) fn require_drive(&self) -> Result<()> {
        match self.current_drive {
            Some(_) => Ok(()),
            None => error!(State; "No current drive is set"),
        }
    }

    fn report_error(&mut self, e: &Error) {
        self.console.print_error(&format!("*** Error: {}\n", e));
    }

    pub(super) fn say(&mut self, s: &str) {
        self.console.print(s);
    }

    /// Count a line of voluminous output against the screen, stopping for
    /// the pager when it fills.
    pub(super) fn pause(&mut self) {
        self.screen_line += 1;
        if self.screen_line > SCREEN_LINES - 1 {
            self.console.read_line("*** Hit return to continue ***");
            self.screen_line = 0;
        }
    }

    pub(super) fn reset_pager(&mut self) {
        self.screen_line = 0;
    }

    /// Hex and ASCII dump of the first `size` bytes of one of the buffers,
    /// paged, break sampled per line.
    pub(super) fn dump_buffer(&mut self, write_side: bool, size: usize) -> Exec {
        self.reset_pager();
        let mut hex = String::new();
        let mut ascii = String::new();
        for i in 0..size {
            let b = if write_side {
                self.write_buffer[i]
            } else {
                self.read_buffer[i]
            };
            if i % 16 == 0 {
                hex = format!("{:08x}: ", i);
                ascii.clear();
            }
            hex.push_str(&format!("{:02x} ", b));
            let c = b & 0x7f;
            ascii.push(if c >= 0x20 { c as char } else { '.' });
            if i % 16 == 15 {
                self.say(&format!("{} \"{}\"\n", hex, ascii));
                self.pause();
                if self.check_break() {
                    return Ok(self.break_outcome());
                }
            }
        }
        if size % 16 != 0 {
            for _ in 0..16 - size % 16 {
                hex.push_str("   ");
            }
            self.say(&format!("{} \"{}\"\n", hex, ascii));
        }
        Ok(Outcome::Ok)
    }

    /// Judge one compared byte under the mismatch policy, folding in the
    /// per-byte break sample.
    pub(super) fn print_comp(&mut self, addr: usize, got: u8, want: u8) -> Exec {
        if got != want {
            if self.comp.first || self.comp.mode == CompMode::All {
                if self.comp.dataset && got == self.comp.rep_a && want == self.comp.rep_b {
                    self.comp.repcnt += 1;
                } else {
                    self.flush_repeats();
                    self.console.print_error(&format!(
                        "*** Error: Buffer miscompare: {:08x}: {:02x} s/b {:02x}\n",
                        addr, got, want
                    ));
                }
            }
            self.comp.first = false;
            if self.comp.mode == CompMode::Fail {
                return error!(Compare; "Buffer miscompare in fail mode");
            }
            self.comp.rep_a = got;
            self.comp.rep_b = want;
            self.comp.dataset = true;
        }
        if self.check_break() {
            return Ok(self.break_outcome());
        }
        Ok(Outcome::Ok)
    }

    /// Report accumulated identical mismatches.
    pub(super) fn flush_repeats(&mut self) {
        if self.comp.repcnt > 0 {
            let n = self.comp.repcnt;
            self.say(&format!(
                "*** Info: There were {} occurrances of the above mismatch\n",
                n
            ));
            self.comp.repcnt = 0;
        }
    }

    /// One timing window's throughput report.
    pub fn report(&mut self, secs: f64) {
        let iow = self.stats.iop_write;
        let ior = self.stats.iop_read;
        let bw = self.stats.bytes_written;
        let br = self.stats.bytes_read;
        self.say(&format!(
            "Time: {:.2}s {}{}{}\n{}{}{}\n",
            secs,
            scaled_rate("IOW: ", iow, secs),
            scaled_rate("IOR: ", ior, secs),
            scaled_rate("IO: ", iow + ior, secs),
            scaled_rate("BW: ", bw, secs),
            scaled_rate("BR: ", br, secs),
            scaled_rate("BT: ", bw + br, secs),
        ));
    }
}

/// Scale a count with k at 1024 and M at 1024 squared.
fn scaled(n: f64) -> String {
    if n >= 1024.0 * 1024.0 {
        format!("{:.2}M", n / (1024.0 * 1024.0))
    } else if n >= 1024.0 {
        format!("{:.2}k", n / 1024.0)
    } else {
        format!("{:.2}", n)
    }
}

fn scaled_rate(label: &str, n: f64, secs: f64) -> String {
    let rate = if secs == 0.0 { 0.0 } else { n / secs };
    format!("{}{} ({}/s) ", label, scaled(n), scaled(rate))
}

impl Scope for Machine {
    /// Built-in variables first, then the user stack, newest match wins.
    fn value_of(&mut self, name: &str) -> Result<i64> {
        match name {
            "drvsiz" => Ok(self.drive_size),
            "rand" => Ok(self.rng.rand64()),
            "lbarnd" => {
                if self.current_drive.is_none() || self.drive_size <= 0 {
                    return error!(State; "No current drive is set");
                }
                Ok(self.rng.rand64() % self.drive_size)
            }
            "secsiz" => Ok(SECTOR_SIZE as i64),
            "bufsiz" => Ok(BUF_SECTORS as i64),
            _ => match self.vars.get(name) {
                Some(val) => Ok(val),
                None => error!(Name; "Variable \"{}\" invalid", name),
            },
        }
    }
}
