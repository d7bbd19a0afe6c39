use discdiag::term;

fn main() {
    term::main()
}
