/*!
# Introduction

The diagnostic maintains two buffers, one for reads and one for writes,
each holding 256 sectors of 512 bytes. The idea is that you set up patterns
in the write buffer to be written out to disc, then read sectors back into
the read buffer for check, comparison, or examination.

The command line is "minimally scriptable": multiple commands separated by
`;`, loops, procedures with parameters, and user variables. The emphasis is
on simple verbs oriented entirely to disc operations, with as much as
possible happening on a single line.

## A first session

Write the whole drive with the LBA-identify pattern, 256 sectors at a time:

```text
Diag> drive 3
Diag> unprot
Diag> s lba 0
Diag> p lba; pt lba lba; w lba bufsiz; s lba lba+bufsiz; l 4096
```

Then verify what was written:

```text
Diag> s lba 0
Diag> p lba; r lba bufsiz; c lba lba; s lba lba+bufsiz; l 4096
```

`pt lba lba` means "fill the write buffer with the `lba` pattern, starting
at the value of the variable `lba`". Every numeric parameter is an
expression; expressions cannot contain spaces.

## Stored programs

A line entered with a leading number is stored, inserted before that
1-based position:

```text
Diag> 1 dothis(num): echon The number is: ; p num
Diag> dothis 42
```

Variables created inside a procedure vanish when it returns; `set` updates
an outer variable when one exists, `local` always makes a fresh one.

If a file named `discdiag.ini` exists in the current directory it is loaded
at startup, and a procedure named `init` in it runs automatically.

**WARNING: this diagnostic CAN and WILL destroy your hard disc.**
*/
