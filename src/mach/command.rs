use super::machine::{CompMode, Ctl, CtlKind, Exec, Machine, Outcome, Result, Stats};
use super::pattern::{fill, Pattern, PatternBytes};
use crate::disc::{BUF_SECTORS, SECTOR_SIZE};
use crate::error;
use crate::lang::{expr, parse_number, Cursor};

pub(super) type Handler = fn(&mut Machine, &mut Cursor) -> Exec;

/// The verb table. Program labels are searched first by the dispatcher, so
/// a stored procedure can shadow any of these.
const COMMANDS: &[(&str, Handler)] = &[
    ("?", Machine::cmd_help),
    ("help", Machine::cmd_help),
    ("r", Machine::cmd_read),
    ("read", Machine::cmd_read),
    ("w", Machine::cmd_write),
    ("write", Machine::cmd_write),
    ("dw", Machine::cmd_dumpwrite),
    ("dumpwrite", Machine::cmd_dumpwrite),
    ("dr", Machine::cmd_dumpread),
    ("dumpread", Machine::cmd_dumpread),
    ("pt", Machine::cmd_pattn),
    ("pattn", Machine::cmd_pattn),
    ("c", Machine::cmd_comp),
    ("comp", Machine::cmd_comp),
    ("cm", Machine::cmd_compmode),
    ("compmode", Machine::cmd_compmode),
    ("drive", Machine::cmd_drive),
    ("listdrives", Machine::cmd_listdrives),
    ("ld", Machine::cmd_listdrives),
    ("unprot", Machine::cmd_unprot),
    ("echo", Machine::cmd_echo),
    ("echon", Machine::cmd_echon),
    ("l", Machine::cmd_loop),
    ("loop", Machine::cmd_loop),
    ("lq", Machine::cmd_loopq),
    ("loopq", Machine::cmd_loopq),
    ("u", Machine::cmd_untill),
    ("while", Machine::cmd_while),
    ("wend", Machine::cmd_wend),
    ("repeat", Machine::cmd_repeat),
    ("until", Machine::cmd_until),
    ("for", Machine::cmd_for),
    ("fend", Machine::cmd_fend),
    ("select", Machine::cmd_select),
    ("case", Machine::cmd_case),
    ("default", Machine::cmd_default),
    ("send", Machine::cmd_send),
    ("p", Machine::cmd_print),
    ("print", Machine::cmd_print),
    ("pn", Machine::cmd_printn),
    ("printn", Machine::cmd_printn),
    ("s", Machine::cmd_set),
    ("set", Machine::cmd_set),
    ("local", Machine::cmd_local),
    ("srand", Machine::cmd_srand),
    ("list", Machine::cmd_list),
    ("clear", Machine::cmd_clear),
    ("save", Machine::cmd_save),
    ("load", Machine::cmd_load),
    ("delt", Machine::cmd_delt),
    ("end", Machine::cmd_end),
    ("go", Machine::cmd_go),
    ("if", Machine::cmd_if),
    ("exit", Machine::cmd_exit),
    ("exitonerror", Machine::cmd_exitonerror),
    ("i", Machine::cmd_input),
    ("input", Machine::cmd_input),
    // hidden diagnostics for the diagnostic
    ("testrand", Machine::cmd_testrand),
    ("listvariables", Machine::cmd_listvariables),
];

pub(super) fn lookup(word: &str) -> Option<Handler> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, handler)| *handler)
}

impl Machine {
    /// `read|r [lba [n]]` — read sectors into the read buffer.
    fn cmd_read(&mut self, cur: &mut Cursor) -> Exec {
        let (lba, n) = self.parse_lba_count(cur)?;
        self.require_drive()?;
        self.check_extent(lba, n)?;
        let size = n as usize * SECTOR_SIZE;
        self.disc.read_sectors(&mut self.read_buffer[..size], lba, n)?;
        self.stats.iop_read += 1.0;
        self.stats.bytes_read += (n * SECTOR_SIZE as i64) as f64;
        Ok(Outcome::Ok)
    }

    /// `write|w [lba [n]]` — write sectors from the write buffer.
    fn cmd_write(&mut self, cur: &mut Cursor) -> Exec {
        if self.write_prot {
            return error!(State; "Drive is write protected, use unprot command");
        }
        let (lba, n) = self.parse_lba_count(cur)?;
        self.require_drive()?;
        self.check_extent(lba, n)?;
        let size = n as usize * SECTOR_SIZE;
        self.disc.write_sectors(&self.write_buffer[..size], lba, n)?;
        self.stats.iop_write += 1.0;
        self.stats.bytes_written += (n * SECTOR_SIZE as i64) as f64;
        Ok(Outcome::Ok)
    }

    fn parse_lba_count(&mut self, cur: &mut Cursor) -> Result<(i64, i64)> {
        let mut lba = 0;
        let mut n = 1;
        cur.skip_spaces();
        if !cur.at_break() {
            lba = expr::eval(cur, self)?;
            cur.skip_spaces();
            if !cur.at_break() {
                n = expr::eval(cur, self)?;
            }
        }
        Ok((lba, n))
    }

    fn check_extent(&self, lba: i64, n: i64) -> Result<()> {
        if n < 0 || n > BUF_SECTORS as i64 {
            return error!(Bounds; "Invalid sector count, must be <= {}", BUF_SECTORS);
        }
        if lba < 0 || lba >= self.drive_size {
            return error!(Bounds; "Invalid lba number, must be <= {}", self.drive_size);
        }
        if lba + n - 1 >= self.drive_size {
            return error!(Bounds; "Operation will exceed drive size");
        }
        Ok(())
    }

    /// `dumpwrite|dw [n]` — paged hex+ASCII dump of the write buffer.
    fn cmd_dumpwrite(&mut self, cur: &mut Cursor) -> Exec {
        self.dump_command(cur, true)
    }

    /// `dumpread|dr [n]` — paged hex+ASCII dump of the read buffer.
    fn cmd_dumpread(&mut self, cur: &mut Cursor) -> Exec {
        self.dump_command(cur, false)
    }

    fn dump_command(&mut self, cur: &mut Cursor, write_side: bool) -> Exec {
        let mut n = 1i64;
        cur.skip_spaces();
        if !cur.at_break() {
            n = expr::eval(cur, self)?;
        }
        if n < 0 || n > BUF_SECTORS as i64 {
            return error!(Bounds; "Invalid sector count, must be <= {}", BUF_SECTORS);
        }
        self.say("Contents of sector:\n\n");
        let r = self.dump_buffer(write_side, n as usize * SECTOR_SIZE)?;
        if r != Outcome::Ok {
            return Ok(r);
        }
        self.say("\n");
        Ok(Outcome::Ok)
    }

    fn parse_pattern_args(&mut self, cur: &mut Cursor) -> Result<(String, i64, i64)> {
        let mut name = "cnt".to_string();
        let mut val = 0i64;
        let mut len = BUF_SECTORS as i64;
        cur.skip_spaces();
        if !cur.at_break() {
            name = cur.take_word();
            cur.skip_spaces();
            if !cur.at_break() {
                val = expr::eval(cur, self)?;
                cur.skip_spaces();
                if !cur.at_break() {
                    len = expr::eval(cur, self)?;
                }
            }
        }
        Ok((name, val, len))
    }

    /// `pattn|pt [name [val [len]]]` — fill the write buffer.
    fn cmd_pattn(&mut self, cur: &mut Cursor) -> Exec {
        let (name, val, len) = self.parse_pattern_args(cur)?;
        let pattern = match Pattern::from_name(&name) {
            Some(Pattern::Buffs) | None => return error!(Name; "bad pattern name: {}", name),
            Some(p) => p,
        };
        if len < 0 || len > BUF_SECTORS as i64 {
            return error!(Bounds; "Invalid sector count, must be <= {}", BUF_SECTORS);
        }
        fill(pattern, val, len, &mut self.write_buffer);
        Ok(Outcome::Ok)
    }

    /// `comp|c [name [val [len]]]` — verify the read buffer against a
    /// pattern, or against the write buffer for `buffs`.
    fn cmd_comp(&mut self, cur: &mut Cursor) -> Exec {
        let (name, val, len) = self.parse_pattern_args(cur)?;
        let pattern = match Pattern::from_name(&name) {
            Some(p) => p,
            None => return error!(Name; "bad pattern name: {}", name),
        };
        if len < 0 || len > BUF_SECTORS as i64 {
            return error!(Bounds; "Invalid sector count, must be <= {}", BUF_SECTORS);
        }
        self.comp.first = true;
        self.comp.dataset = false;
        self.comp.repcnt = 0;
        let mut out = Outcome::Ok;
        match pattern {
            Pattern::Buffs => {
                for i in 0..len as usize * SECTOR_SIZE {
                    let got = self.read_buffer[i];
                    let want = self.write_buffer[i];
                    let r = self.print_comp(i, got, want)?;
                    if r != Outcome::Ok {
                        out = r;
                        break;
                    }
                }
            }
            _ => {
                for (offset, want) in PatternBytes::new(pattern, val, len) {
                    let got = self.read_buffer[offset];
                    let r = self.print_comp(offset, got, want)?;
                    if r != Outcome::Ok {
                        out = r;
                        break;
                    }
                }
            }
        }
        if out == Outcome::Ok {
            self.flush_repeats();
        }
        Ok(out)
    }

    /// `compmode|cm {all|one|fail}`.
    fn cmd_compmode(&mut self, cur: &mut Cursor) -> Exec {
        match cur.take_word().as_str() {
            "all" => self.comp.mode = CompMode::All,
            "one" => self.comp.mode = CompMode::One,
            "fail" => self.comp.mode = CompMode::Fail,
            _ => return error!(Name; "mode not recognized"),
        }
        Ok(Outcome::Ok)
    }

    /// `drive [n]` — open and select a drive, or print the current one.
    fn cmd_drive(&mut self, cur: &mut Cursor) -> Exec {
        cur.skip_spaces();
        if !cur.at_break() {
            let v = expr::eval(cur, self)?;
            if v < 0 || v > 9 {
                return error!(Bounds; "Invalid drive number, must be 0 to 9");
            }
            // every drive change re-arms the write protect
            self.write_prot = true;
            if v == 0 {
                self.say("*** Warning: You have selected the system drive\n");
            }
            self.disc.set_drive(v as u32)?;
            self.current_drive = Some(v as u32);
            let bytes = self.disc.size_current()?;
            self.drive_size = bytes / SECTOR_SIZE as i64;
            if bytes % SECTOR_SIZE as i64 != 0 {
                self.say("*** Warning: Drive total size is not an even number of sectors\n");
            }
            self.stats = Stats::default();
        } else {
            match self.current_drive {
                None => self.say("Current drive is: Not set\n"),
                Some(d) => self.say(&format!("Current drive is: {}\n", d)),
            }
        }
        Ok(Outcome::Ok)
    }

    /// `listdrives|ld` — probe drives 0..9 and their sizes.
    fn cmd_listdrives(&mut self, _cur: &mut Cursor) -> Exec {
        self.say("Physical drives available:\n\n");
        for i in 0..10u32 {
            if self.disc.test_drive(i) {
                if let Ok(bytes) = self.disc.size_of(i) {
                    let name = self.disc.drive_name(i).unwrap_or("?").to_string();
                    let sectors = bytes / SECTOR_SIZE as i64;
                    self.say(&format!("Drive {} ({}) available {} lbas\n", i, name, sectors));
                }
            }
        }
        self.say("\n");
        Ok(Outcome::Ok)
    }

    /// `unprot` — clear the write protect on the current drive.
    fn cmd_unprot(&mut self, _cur: &mut Cursor) -> Exec {
        self.write_prot = false;
        Ok(Outcome::Ok)
    }

    /// `echon [text]` — print the parameter area without a newline.
    fn cmd_echon(&mut self, cur: &mut Cursor) -> Exec {
        cur.skip_spaces();
        let text = cur.take_to_break();
        self.say(&text);
        Ok(Outcome::Ok)
    }

    /// `echo [text]` — print the parameter area with a newline.
    fn cmd_echo(&mut self, cur: &mut Cursor) -> Exec {
        let r = self.cmd_echon(cur)?;
        self.say("\n");
        Ok(r)
    }

    /// `loop|l [n]` — restart the line, announcing the iteration.
    fn cmd_loop(&mut self, cur: &mut Cursor) -> Exec {
        self.do_loop(cur, false)
    }

    /// `loopq|lq [n]` — restart the line quietly.
    fn cmd_loopq(&mut self, cur: &mut Cursor) -> Exec {
        self.do_loop(cur, true)
    }

    fn do_loop(&mut self, cur: &mut Cursor, quiet: bool) -> Exec {
        let mut stop = -1i64;
        cur.skip_spaces();
        if !cur.at_break() {
            stop = expr::eval(cur, self)?;
        }
        // one counter per physical loop site, keyed by the cursor position
        let key = (self.frames.last().and_then(|f| f.line), cur.pos());
        let count = {
            let c = self.counters.entry(key).or_insert(0);
            *c += 1;
            *c
        };
        if !quiet {
            self.say(&format!("Iteration: {}\n", count));
        }
        if stop < 0 || count < stop {
            cur.set_pos(0);
            return Ok(Outcome::Restart);
        }
        self.counters.insert(key, 0);
        Ok(Outcome::Ok)
    }

    /// `u cond` — restart the line until the condition holds.
    fn cmd_untill(&mut self, cur: &mut Cursor) -> Exec {
        let v = expr::eval(cur, self)?;
        if v == 0 {
            cur.set_pos(0);
            return Ok(Outcome::Restart);
        }
        Ok(Outcome::Ok)
    }

    /// `while cond` — enter the loop when true, otherwise skip to the
    /// matching `wend`.
    fn cmd_while(&mut self, cur: &mut Cursor) -> Exec {
        let start = cur.pos();
        let v = expr::eval(cur, self)?;
        if v == 0 {
            self.skip_to(cur, &["wend"])?;
        } else {
            let line = self.frames.last().and_then(|f| f.line);
            self.ctls.push(Ctl {
                kind: CtlKind::While,
                line,
                pos: start,
                var: String::new(),
                step: 0,
            });
        }
        Ok(Outcome::Ok)
    }

    /// `wend` — re-evaluate the saved condition; loop or fall out.
    fn cmd_wend(&mut self, cur: &mut Cursor) -> Exec {
        if self.ctls.last().map_or(false, |c| c.kind != CtlKind::While) {
            self.ctls.pop();
        }
        let (line, pos) = match self.ctls.last() {
            Some(c) if c.kind == CtlKind::While => (c.line, c.pos),
            _ => return error!(State; "No \"while\" is active"),
        };
        let save_line = self.frames.last().and_then(|f| f.line);
        let save_pos = cur.pos();
        self.frames.last_mut().unwrap().line = line;
        *cur = self.cursor_for(line);
        cur.set_pos(pos);
        let v = expr::eval(cur, self)?;
        if v == 0 {
            self.frames.last_mut().unwrap().line = save_line;
            *cur = self.cursor_for(save_line);
            cur.set_pos(save_pos);
            self.ctls.pop();
        }
        Ok(Outcome::Ok)
    }

    /// `repeat` — mark the top of a repeat/until loop.
    fn cmd_repeat(&mut self, cur: &mut Cursor) -> Exec {
        let line = self.frames.last().and_then(|f| f.line);
        self.ctls.push(Ctl {
            kind: CtlKind::Repeat,
            line,
            pos: cur.pos(),
            var: String::new(),
            step: 0,
        });
        Ok(Outcome::Ok)
    }

    /// `until cond` — loop back to the `repeat` while false.
    fn cmd_until(&mut self, cur: &mut Cursor) -> Exec {
        if self.ctls.last().map_or(false, |c| c.kind != CtlKind::Repeat) {
            self.ctls.pop();
        }
        let (line, pos) = match self.ctls.last() {
            Some(c) if c.kind == CtlKind::Repeat => (c.line, c.pos),
            _ => return error!(State; "No \"repeat\" is active"),
        };
        let v = expr::eval(cur, self)?;
        if v == 0 {
            self.frames.last_mut().unwrap().line = line;
            *cur = self.cursor_for(line);
            cur.set_pos(pos);
        } else {
            self.ctls.pop();
        }
        Ok(Outcome::Ok)
    }

    /// `for var start end [step]` — assign the variable and enter or skip
    /// the loop depending on the range.
    fn cmd_for(&mut self, cur: &mut Cursor) -> Exec {
        let var = cur.take_word();
        let s = expr::eval(cur, self)?;
        cur.skip_spaces();
        let end_pos = cur.pos();
        let e = expr::eval(cur, self)?;
        let mut step = 1i64;
        cur.skip_spaces();
        if !cur.at_break() {
            step = expr::eval(cur, self)?;
        }
        self.vars.set(&var, s);
        if (s > e && step >= 0) || (s < e && step < 0) {
            self.skip_to(cur, &["fend"])?;
        } else {
            let line = self.frames.last().and_then(|f| f.line);
            self.ctls.push(Ctl {
                kind: CtlKind::For,
                line,
                pos: end_pos,
                var,
                step,
            });
        }
        Ok(Outcome::Ok)
    }

    /// `fend` — step the loop variable, re-evaluate the end expression, and
    /// loop or fall out.
    fn cmd_fend(&mut self, cur: &mut Cursor) -> Exec {
        if self.ctls.last().map_or(false, |c| c.kind != CtlKind::For) {
            self.ctls.pop();
        }
        let (line, pos, var, step) = match self.ctls.last() {
            Some(c) if c.kind == CtlKind::For => (c.line, c.pos, c.var.clone(), c.step),
            _ => return error!(State; "No \"for\" is active"),
        };
        let val = match self.vars.get(&var) {
            Some(v) => v,
            None => return error!(Name; "Variable \"{}\" invalid", var),
        };
        let s = val.wrapping_add(step);
        self.vars.set(&var, s);
        let save_line = self.frames.last().and_then(|f| f.line);
        let save_pos = cur.pos();
        self.frames.last_mut().unwrap().line = line;
        *cur = self.cursor_for(line);
        cur.set_pos(pos);
        let e = expr::eval(cur, self)?;
        cur.skip_to_break(); // a step expression may follow the end value
        if (s > e && step >= 0) || (s < e && step < 0) {
            self.frames.last_mut().unwrap().line = save_line;
            *cur = self.cursor_for(save_line);
            cur.set_pos(save_pos);
            self.ctls.pop();
        }
        Ok(Outcome::Ok)
    }

    /// `select val` — scan forward for a matching `case`, a `default`, or
    /// the closing `send`.
    fn cmd_select(&mut self, cur: &mut Cursor) -> Exec {
        let v = expr::eval(cur, self)?;
        let mut found = false;
        loop {
            let what = self.skip_to(cur, &["case", "default", "send"])?;
            if what == 1 {
                loop {
                    let m = expr::eval(cur, self)?;
                    if v == m {
                        found = true;
                    }
                    cur.skip_spaces();
                    if cur.ch() == b',' {
                        cur.bump();
                        cur.skip_spaces();
                    }
                    if cur.at_break() {
                        break;
                    }
                }
            } else if what == 2 {
                found = true;
            }
            if found || what != 1 {
                break;
            }
        }
        Ok(Outcome::Ok)
    }

    /// A `case` reached by falling through a matched body ends it: skip to
    /// the closing `send`.
    fn cmd_case(&mut self, cur: &mut Cursor) -> Exec {
        self.skip_to(cur, &["send"])?;
        Ok(Outcome::Ok)
    }

    fn cmd_default(&mut self, cur: &mut Cursor) -> Exec {
        self.skip_to(cur, &["send"])?;
        Ok(Outcome::Ok)
    }

    /// `send` alone is a no-op; `select` does all the work.
    fn cmd_send(&mut self, _cur: &mut Cursor) -> Exec {
        Ok(Outcome::Ok)
    }

    /// `go label` — redirect the current frame to a labeled line.
    fn cmd_go(&mut self, cur: &mut Cursor) -> Exec {
        let w = cur.take_word();
        if w.is_empty() {
            return error!(Name; "no label specified");
        }
        let idx = match self.program.find_label(&w) {
            Some(idx) => idx,
            None => return error!(Name; "Program label {} not found", w),
        };
        if let Some(top) = self.frames.last_mut() {
            top.line = Some(idx);
            top.cursor = 0;
        }
        *cur = self.cursor_for(Some(idx));
        Ok(Outcome::Restart)
    }

    /// `if cond` — discard the rest of the line when false.
    fn cmd_if(&mut self, cur: &mut Cursor) -> Exec {
        let v = expr::eval(cur, self)?;
        if v == 0 {
            cur.to_line_end();
        }
        Ok(Outcome::Ok)
    }

    /// `end` — return from a procedure to the saved caller cursor.
    fn cmd_end(&mut self, cur: &mut Cursor) -> Exec {
        if self.frames.len() <= 1 {
            return error!(State; "Nothing to return to at immediate mode");
        }
        self.pop_level()?;
        let (line, pos) = {
            let top = self.frames.last().unwrap();
            (top.line, top.cursor)
        };
        *cur = self.cursor_for(line);
        cur.set_pos(pos);
        Ok(Outcome::Ok)
    }

    /// `set|s var expr` — update an existing variable in place, else create.
    fn cmd_set(&mut self, cur: &mut Cursor) -> Exec {
        let w = cur.take_word();
        let v = expr::eval(cur, self)?;
        self.vars.set(&w, v);
        Ok(Outcome::Ok)
    }

    /// `local var` — force a fresh variable cell, shadowing any outer one.
    fn cmd_local(&mut self, cur: &mut Cursor) -> Exec {
        let w = cur.take_word();
        self.vars.push(&w, 0);
        Ok(Outcome::Ok)
    }

    /// `input|i var` — read a value from the console into a variable.
    fn cmd_input(&mut self, cur: &mut Cursor) -> Exec {
        let w = cur.take_word();
        let line = self.console.read_line("");
        if self.check_break() || line.is_none() {
            if self.exit_on_error {
                return Ok(Outcome::Exit);
            }
            return Ok(Outcome::Ok);
        }
        let v = parse_number(line.unwrap().trim_start());
        self.vars.set(&w, v);
        Ok(Outcome::Ok)
    }

    /// `srand` — reset the random sequence to the pattern baseline.
    fn cmd_srand(&mut self, _cur: &mut Cursor) -> Exec {
        self.rng.reseed(super::rng::PATTERN_SEED);
        Ok(Outcome::Ok)
    }

    /// `list` — print the program store with 1-based line numbers.
    fn cmd_list(&mut self, _cur: &mut Cursor) -> Exec {
        self.say("\nProgram store:\n\n");
        self.reset_pager();
        for n in 0..self.program.len() {
            if self.check_break() {
                return Ok(self.break_outcome());
            }
            let line = self.program.get(n).unwrap().to_string();
            self.say(&format!("{}: {}\n", n + 1, line));
            self.pause();
        }
        Ok(Outcome::Ok)
    }

    /// `clear` — drop the whole program store.
    fn cmd_clear(&mut self, _cur: &mut Cursor) -> Exec {
        self.program.clear();
        Ok(Outcome::Ok)
    }

    /// `save file` — write the program store back out.
    fn cmd_save(&mut self, cur: &mut Cursor) -> Exec {
        let fname = cur.take_word();
        if self.program.save(&fname).is_err() {
            return error!(Io; "could not create file {}", fname);
        }
        Ok(Outcome::Ok)
    }

    /// `load file` — replace the program store from a file.
    fn cmd_load(&mut self, cur: &mut Cursor) -> Exec {
        let fname = cur.take_word();
        if self.program.load(&fname).is_err() {
            return error!(Io; "cannot load file");
        }
        Ok(Outcome::Ok)
    }

    /// `delt N` — delete the N-th program line.
    fn cmd_delt(&mut self, cur: &mut Cursor) -> Exec {
        let n = expr::eval(cur, self)?;
        self.program.delete(n);
        Ok(Outcome::Ok)
    }

    fn cmd_exit(&mut self, _cur: &mut Cursor) -> Exec {
        Ok(Outcome::Exit)
    }

    /// `exitonerror` — escalate later errors to process exit, for batch use.
    fn cmd_exitonerror(&mut self, _cur: &mut Cursor) -> Exec {
        self.exit_on_error = true;
        Ok(Outcome::Ok)
    }

    /// `print|p ["fmt"] val…` — formatted print with a trailing newline.
    fn cmd_print(&mut self, cur: &mut Cursor) -> Exec {
        let r = self.cmd_printn(cur);
        self.say("\n");
        r
    }

    /// `printn|pn ["fmt"] val…` — formatted print, no trailing newline.
    ///
    /// Directives are `%[width[.prec]]{d|x|o}` over 64-bit signed values;
    /// `\` escapes the next character inside the format; an unmatched `%`
    /// falls back to plain decimal.
    fn cmd_printn(&mut self, cur: &mut Cursor) -> Exec {
        let fmt = self.take_format(cur)?;
        let mut fi = 0;
        loop {
            let mut filler = String::new();
            while fi < fmt.len() && fmt[fi] != b'%' {
                filler.push(fmt[fi] as char);
                fi += 1;
            }
            if !filler.is_empty() {
                self.say(&filler);
            }
            let mut v = 0i64;
            let mut have_value = false;
            cur.skip_spaces();
            if !cur.at_break() {
                v = expr::eval(cur, self)?;
                have_value = true;
            }
            if fi < fmt.len() && fmt[fi] == b'%' {
                fi += 1;
                let mut width = 1usize;
                let mut prec = 1usize;
                if fi < fmt.len() && fmt[fi].is_ascii_digit() {
                    width = 0;
                    while fi < fmt.len() && fmt[fi].is_ascii_digit() {
                        width = width * 10 + (fmt[fi] - b'0') as usize;
                        fi += 1;
                    }
                }
                if fi < fmt.len() && fmt[fi] == b'.' {
                    fi += 1;
                    if fi < fmt.len() && fmt[fi].is_ascii_digit() {
                        prec = 0;
                        while fi < fmt.len() && fmt[fi].is_ascii_digit() {
                            prec = prec * 10 + (fmt[fi] - b'0') as usize;
                            fi += 1;
                        }
                    }
                }
                match fmt.get(fi).copied() {
                    Some(conv) if conv == b'd' || conv == b'x' || conv == b'o' => {
                        let s = pad_number(v, width, prec, conv);
                        self.say(&s);
                        fi += 1;
                    }
                    _ => {
                        let s = format!("{}", v);
                        self.say(&s);
                    }
                }
            } else if have_value {
                self.say(&format!("{}", v));
            }
            if cur.at_break() {
                break;
            }
        }
        Ok(Outcome::Ok)
    }

    fn take_format(&mut self, cur: &mut Cursor) -> Result<Vec<u8>> {
        let mut fmt = Vec::new();
        cur.skip_spaces();
        if cur.ch() == b'"' {
            cur.bump();
            while cur.ch() != b'"' && !cur.at_end() {
                if cur.ch() == b'\\' {
                    let save = cur.pos();
                    cur.bump();
                    if cur.at_end() {
                        cur.set_pos(save);
                    }
                }
                fmt.push(cur.ch());
                cur.bump();
            }
            if cur.ch() != b'"' {
                return error!(Syntax; "Unterminated format string");
            }
            cur.bump();
        }
        Ok(fmt)
    }

    /// `testrand` — bin test of the generator, a diagnostic for the
    /// diagnostic.
    fn cmd_testrand(&mut self, _cur: &mut Cursor) -> Exec {
        let mut bins = [0i64; 100];
        for _ in 0..1_000_000 {
            let r = self.rng.rand64();
            bins[(r % 100) as usize] += 1;
        }
        self.say("Bins:\n\n");
        for (i, count) in bins.iter().enumerate() {
            let line = format!("{}: {}\n", i, count);
            self.say(&line);
        }
        self.say("\n");
        Ok(Outcome::Ok)
    }

    /// `listvariables` — dump the variables stack, newest first.
    fn cmd_listvariables(&mut self, _cur: &mut Cursor) -> Exec {
        self.say("Contents of variables stack:\n\n");
        let listing: Vec<String> = self
            .vars
            .iter()
            .map(|(name, val)| format!("var: {} val: {}\n", name, val))
            .collect();
        for s in listing {
            self.say(&s);
        }
        Ok(Outcome::Ok)
    }

    /// `?`, `help` — paged command summary.
    fn cmd_help(&mut self, _cur: &mut Cursor) -> Exec {
        self.reset_pager();
        for line in HELP_TEXT {
            self.say(line);
            self.say("\n");
            self.pause();
        }
        Ok(Outcome::Ok)
    }
}

/// Zero-pad to the precision, then space-pad to the field width. Hex and
/// octal render the value as its unsigned 64-bit form, matching printf.
fn pad_number(v: i64, width: usize, prec: usize, conv: u8) -> String {
    let digits = match conv {
        b'x' => format!("{:x}", v as u64),
        b'o' => format!("{:o}", v as u64),
        _ => format!("{}", (v as i128).abs()),
    };
    let mut s = if digits.len() < prec {
        let mut padded = "0".repeat(prec - digits.len());
        padded.push_str(&digits);
        padded
    } else {
        digits
    };
    if conv == b'd' && v < 0 {
        s.insert(0, '-');
    }
    if s.len() < width {
        let mut padded = " ".repeat(width - s.len());
        padded.push_str(&s);
        padded
    } else {
        s
    }
}

const HELP_TEXT: &[&str] = &[
    "",
    "Commands available:",
    "",
    "?, help                     - Print command help.",
    "r, read [lba][num]          - Read sector(s) at LBA, default read 0 1.",
    "w, write [lba][num]         - Write sector(s) at LBA, default write 0 1.",
    "dw, dumpwrite [num]         - Dump sector(s) from write buffer, default 1.",
    "dr, dumpread [num]          - Dump sector(s) from read buffer, default 1.",
    "pt, pattn [pat [val [cnt]]] - Set write buffer to pattern, default is count.",
    "c, comp [pat [val [cnt]]]   - Compare read buffer to pattern, default is count.",
    "cm, compmode mode           - Set miscompare handling mode, default is one.",
    "drive [num]                 - Set current phy drive, default is print current.",
    "listdrives, ld              - List available physical drives.",
    "unprot                      - Unprotect current drive.",
    "echo [text]                 - Echo the parameter area with next line.",
    "echon [text]                - Echo the parameter area without next line.",
    "p, print [fmt] val...       - Print calculated value(s) with next line.",
    "pn, printn [fmt] val...     - Print calculated value(s) without next line.",
    "l, loop [num]               - Loop from line start num times, default is forever.",
    "lq, loopq [num]             - Loop quiet from line start num times.",
    "u cond                      - Loop until condition is true.",
    "while cond                  - Start while/wend loop. Exec loop if cond is true.",
    "wend                        - Terminate while/wend loop.",
    "repeat                      - Start repeat/until loop.",
    "until cond                  - End repeat/until loop. Repeat if cond is false.",
    "for var start end [step]    - Run for loop, start to end in var.",
    "fend                        - End for loop.",
    "select val                  - Select value, match successive cases for val.",
    "case val...                 - Start new select case.",
    "default                     - Start select case matching any value.",
    "send                        - Terminate select statement.",
    "end                         - Terminate procedure.",
    "go label                    - Go to program label.",
    "if cond                     - Continue if condition met, otherwise next line.",
    "s, set var val              - Set/reset user variable.",
    "local var                   - Mark variable as local.",
    "srand                       - Reset random number sequence.",
    "list                        - List stored program.",
    "clear                       - Clear stored program.",
    "save filename               - Save stored program to file.",
    "load filename               - Load stored program from file.",
    "delt num                    - Delete line in program with line number.",
    "exit                        - Exit diagnostic.",
    "exitonerror                 - Exit the diagnostic on error.",
    "i, input var                - Input value from user.",
    "",
    "Multiple commands can appear on a line as a; b; c...",
    "",
    "Patterns are:",
    "",
    "cnt   - Byte incrementing count.",
    "dwcnt - 32 bit incrementing count.",
    "val   - Numeric 32 bit value, big endian.",
    "rand  - Random byte value, repeated per sector.",
    "lba   - First dword of each sector gets the LBA, starting at [val].",
    "        Use another pattern to fill the background.",
    "buffs - Compare the read and write buffers to each other.",
    "",
    "All write operations are from the write buffer.",
    "All read operations are to the read buffer.",
    "",
    "All drives start write locked, and are relocked when the drive is changed.",
    "",
    "Predefined variables: drvsiz, rand, lbarnd, secsiz, bufsiz.",
    "Compare modes: all, one, fail.",
    "",
    "*** WARNING: This diagnostic CAN and WILL destroy your hard disc!",
    "",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_number_decimal() {
        assert_eq!(pad_number(0x10, 4, 4, b'x'), "0010");
        assert_eq!(pad_number(42, 1, 1, b'd'), "42");
        assert_eq!(pad_number(7, 5, 3, b'd'), "  007");
        assert_eq!(pad_number(-7, 1, 3, b'd'), "-007");
        assert_eq!(pad_number(8, 1, 1, b'o'), "10");
    }

    #[test]
    fn test_pad_number_unsigned_radix() {
        assert_eq!(pad_number(-1, 1, 1, b'x'), "ffffffffffffffff");
        assert_eq!(pad_number(i64::min_value(), 1, 1, b'd'), "-9223372036854775808");
    }

    #[test]
    fn test_lookup_aliases() {
        assert!(lookup("read").is_some());
        assert!(lookup("r").is_some());
        assert!(lookup("wend").is_some());
        assert!(lookup("bogus").is_none());
    }
}
