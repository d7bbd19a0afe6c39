/*!
## Language module

Character-level layer of the diagnostic: the shared command-line cursor,
the recursive-descent expression evaluator, and the error type every verb
reports through.

*/

mod cursor;
mod error;
pub mod expr;

pub use cursor::Cursor;
pub use error::Error;
pub use error::ErrorKind;
pub use expr::parse_number;
pub use expr::Scope;
