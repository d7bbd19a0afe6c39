/*!
# Appendix A: Command Reference

## Disc verbs

| Verb | Action |
|------|--------|
| `r`, `read [lba [n]]` | Read sectors into the read buffer |
| `w`, `write [lba [n]]` | Write sectors from the write buffer |
| `dw`, `dumpwrite [n]` | Hex+ASCII dump of the write buffer |
| `dr`, `dumpread [n]` | Hex+ASCII dump of the read buffer |
| `pt`, `pattn [pat [val [len]]]` | Fill the write buffer with a pattern |
| `c`, `comp [pat [val [len]]]` | Verify the read buffer against a pattern |
| `cm`, `compmode {all\|one\|fail}` | Set miscompare handling |
| `drive [n]` | Select a drive, or print the current one |
| `listdrives`, `ld` | Probe drives 0..9 |
| `unprot` | Clear the write protect |

## Patterns

| Name | Bytes |
|------|-------|
| `cnt` | incrementing byte count |
| `dwcnt` | incrementing 32-bit big-endian counter |
| `val` | one 32-bit big-endian value per dword |
| `rand` | random stream, identical in every sector |
| `lba` | first dword of each sector is its LBA; background untouched |
| `buffs` | compare read buffer against write buffer (compare only) |

## Flow control

`l`/`loop [n]`, `lq`/`loopq [n]`, `u cond`, `while cond … wend`,
`repeat … until cond`, `for var start end [step] … fend`,
`select val … case v,v… / default … send`, `if cond`, `go label`, `end`.

## Values

Expressions use `+a -a (a) a*b a/b a%b a+b a-b a<b a>b a=b a!=b a<=b a>=b`;
comparisons yield 0 or 1. Literals take C base prefixes (`0x2a`, `052`,
`42`). Built-in variables: `drvsiz`, `rand`, `lbarnd`, `secsiz`, `bufsiz`.

## Print formats

`p`/`print` and `pn`/`printn` accept an optional double-quoted format with
`%[width[.prec]]{d|x|o}` directives over signed 64-bit values. Leading
zeros go in the precision: `%4.4x`, not `%04x`.
*/
