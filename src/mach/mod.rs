/*!
## Machine module

The diagnostic machine: sector buffers, the pattern generator and verifier,
the variable and program stores, and the interpreter that couples them to
the command surface.

*/

mod command;
mod machine;
mod pattern;
mod program;
mod rng;
mod vars;

pub use machine::Console;
pub use machine::Machine;
pub use machine::Outcome;
pub use pattern::Pattern;
pub use program::Program;
pub use rng::Lcg;
pub use vars::Vars;
