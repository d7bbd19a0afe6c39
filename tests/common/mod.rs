use discdiag::disc::SimDisc;
use discdiag::mach::{Console, Machine, Outcome};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Console that records everything printed and feeds scripted input lines
/// to the pager and the `input` verb.
struct ScriptConsole {
    out: Rc<RefCell<String>>,
    input: Rc<RefCell<VecDeque<String>>>,
}

impl Console for ScriptConsole {
    fn print(&mut self, s: &str) {
        self.out.borrow_mut().push_str(s);
    }

    fn print_error(&mut self, s: &str) {
        self.out.borrow_mut().push_str(s);
    }

    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.input.borrow_mut().pop_front()
    }
}

pub struct Harness {
    pub machine: Machine,
    out: Rc<RefCell<String>>,
    input: Rc<RefCell<VecDeque<String>>>,
    pub brk: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl Harness {
    /// Run one command line and return what it printed.
    pub fn run(&mut self, line: &str) -> String {
        self.out.borrow_mut().clear();
        self.machine.enter(line);
        self.out.borrow().clone()
    }

    /// Run one command line, returning the outcome and the output.
    pub fn run_outcome(&mut self, line: &str) -> (Outcome, String) {
        self.out.borrow_mut().clear();
        let out = self.machine.enter(line);
        (out, self.out.borrow().clone())
    }

    /// Queue a line for the `input` verb or the pager.
    pub fn push_input(&mut self, line: &str) {
        self.input.borrow_mut().push_back(line.to_string());
    }

    /// Everything printed since the last clear.
    pub fn output(&self) -> String {
        self.out.borrow().clone()
    }

    pub fn clear_output(&mut self) {
        self.out.borrow_mut().clear();
    }
}

/// A machine over the simulator disc with a capture console.
pub fn harness() -> Harness {
    let out = Rc::new(RefCell::new(String::new()));
    let input = Rc::new(RefCell::new(VecDeque::new()));
    let brk = Arc::new(AtomicBool::new(false));
    let console = ScriptConsole {
        out: out.clone(),
        input: input.clone(),
    };
    let machine = Machine::new(Box::new(SimDisc::new()), Box::new(console), brk.clone());
    Harness {
        machine,
        out,
        input,
        brk,
    }
}
