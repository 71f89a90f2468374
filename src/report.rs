//! Dry-run report: what would be written, entry by entry.
//!
//! Each planned entry produces one block: a `TPL` line describing the
//! template entry and a `DST` line describing the destination.
//!
//! ```text
//! TPL -rwxr-xr-x 1000:100  [NAME]/
//! DST -rwxrwxrwx 1000:100  /dst/alice/
//! TPL -rw-r--r-- 1000:100  greeting.txt.tpl
//! DST -rw-rw-rw- 1000:100  /dst/greeting.txt
//! ```
//!
//! Verbose content is printed one indented line per [`str::lines`] item, so a
//! trailing newline does not produce an extra empty indented line.
use std::io::{self, Write};

use crate::catalog::Entry;
use crate::render::OutputEntry;

const INDENT: &str = "    ";

/// `ls`-style rendering of the permission bits in `mode`, with `-` as the
/// type character.
#[must_use]
pub fn permission_string(mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    std::iter::once('-')
        .chain(
            BITS.iter()
                .map(|&(bit, c)| if mode & bit == 0 { '-' } else { c }),
        )
        .collect()
}

/// Write the report block for one planned entry.
///
/// `source` is the catalog entry `output` was rendered from.  When `writes`
/// is `false` the file would be suppressed by the delete-empty policy and the
/// destination is shown as `DST <deleted>`.  With `verbose`, file contents
/// are included, indented.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn write_entry<W: Write + ?Sized>(
    out: &mut W,
    source: &Entry,
    output: &OutputEntry,
    writes: bool,
    verbose: bool,
) -> io::Result<()> {
    let tpl = header(source.mode, source.uid, source.gid);
    let dst = header(output.mode, output.uid, output.gid);
    let dst_path = output.path.display();

    if output.is_dir() {
        writeln!(out, "TPL {tpl} {}/", source.path)?;
        writeln!(out, "DST {dst} {dst_path}/")?;
    } else if let Some(target) = output.link_target() {
        writeln!(
            out,
            "TPL {tpl} {} -> {}",
            source.path,
            source.link_target().unwrap_or_default()
        )?;
        writeln!(out, "DST {dst} {dst_path} -> {target}")?;
    } else {
        writeln!(out, "TPL {tpl} {}", source.path)?;
        if verbose {
            write_content(out, source.content())?;
        }
        if writes {
            writeln!(out, "DST {dst} {dst_path}")?;
            if verbose {
                write_content(out, output.content())?;
            }
        } else {
            writeln!(out, "DST <deleted>")?;
        }
    }
    Ok(())
}

fn header(mode: u32, uid: u32, gid: u32) -> String {
    format!("{} {uid:>4}:{gid:<4}", permission_string(mode))
}

fn write_content<W: Write + ?Sized>(out: &mut W, content: &[u8]) -> io::Result<()> {
    for line in String::from_utf8_lossy(content).lines() {
        writeln!(out, "{INDENT}{line}")?;
    }
    Ok(())
}
