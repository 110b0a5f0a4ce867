use super::traits::MoleculeSink;
use crate::core::chem;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use slotmap::SecondaryMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

const RECORD_TERMINATOR: &str = "$$$$";
const MAX_V2000_COUNT: usize = 999;
const CHARGES_PER_LINE: usize = 8;

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error in record {record} on line {line}: {kind}")]
    Parse {
        record: usize,
        line: usize,
        kind: SdfParseErrorKind,
    },
    #[error("Record '{title}' cannot be written as V2000: {reason}")]
    Unrepresentable { title: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdfParseErrorKind {
    #[error("Record ended before the counts line")]
    MissingCountsLine,
    #[error("V3000 connection tables are not supported")]
    UnsupportedV3000,
    #[error("Invalid integer in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid coordinate in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Unsupported bond type {0}")]
    UnsupportedBondType(u8),
    #[error("Bond references atom {index} but the record declares {count} atoms")]
    AtomIndexOutOfRange { index: usize, count: usize },
    #[error("Invalid bond: {0}")]
    InvalidBond(String),
    #[error("Record ended before all {expected} {section} lines were read")]
    Truncated {
        section: &'static str,
        expected: usize,
    },
    #[error("Malformed property line")]
    MalformedPropertyLine,
}

impl SdfError {
    fn parse(record: usize, line: usize, kind: SdfParseErrorKind) -> Self {
        Self::Parse { record, line, kind }
    }

    /// Whether reading can continue with the next record.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    start: usize,
    end: usize,
    columns: &'static str,
) -> Result<T, SdfParseErrorKind> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| SdfParseErrorKind::InvalidInt {
        columns,
        value: value.to_string(),
    })
}

fn parse_coordinate(line: &str, start: usize, columns: &'static str) -> Result<f64, SdfParseErrorKind> {
    let value = slice_and_trim(line, start, start + 10);
    value.parse().map_err(|_| SdfParseErrorKind::InvalidFloat {
        columns,
        value: value.to_string(),
    })
}

/// Maps the atom-block charge code to a formal charge.
fn charge_from_code(code: u8) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// Streams molecules out of a multi-record V2000 SD file.
///
/// Every record yields one item. A record that fails to parse yields
/// `Err(SdfError::Parse)` and reading resumes after its `$$$$` terminator; an
/// I/O error ends the iteration. Parsed structures are initialized (implicit
/// hydrogens, aromaticity) before they are returned.
pub struct SdfReader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    record: usize,
    done: bool,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            record: 0,
            done: false,
        }
    }

    /// Number of records started so far.
    pub fn records_read(&self) -> usize {
        self.record
    }

    fn next_block(&mut self) -> Option<Result<Vec<(usize, String)>, SdfError>> {
        let mut block = Vec::new();
        loop {
            match self.lines.next() {
                None => break,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) => {
                    self.line_no += 1;
                    if line.trim_end() == RECORD_TERMINATOR {
                        return Some(Ok(block));
                    }
                    block.push((self.line_no, line));
                }
            }
        }
        self.done = true;
        if block.iter().all(|(_, l)| l.trim().is_empty()) {
            None
        } else {
            Some(Ok(block))
        }
    }
}

impl SdfReader<BufReader<File>> {
    /// Opens an SD file. Paths without an `.sdf` extension are read anyway.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SdfError> {
        let path = path.as_ref();
        let is_sdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("sdf"));
        if !is_sdf {
            warn!(path = %path.display(), "Input file does not have an .sdf extension; reading it as SDF anyway.");
        }
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for SdfReader<R> {
    type Item = Result<Molecule, SdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let block = match self.next_block()? {
            Ok(block) => block,
            Err(e) => return Some(Err(e)),
        };
        self.record += 1;
        let record = self.record;
        let parsed = parse_record(&block)
            .map(|mut mol| {
                chem::initialize(&mut mol);
                mol
            })
            .map_err(|(line, kind)| SdfError::parse(record, line, kind));
        Some(parsed)
    }
}

type ParseResult<T> = Result<T, (usize, SdfParseErrorKind)>;

fn parse_record(block: &[(usize, String)]) -> ParseResult<Molecule> {
    let last_line = block.last().map_or(0, |(n, _)| *n);
    let (counts_no, counts) = block
        .get(3)
        .ok_or((last_line, SdfParseErrorKind::MissingCountsLine))?;
    if counts.contains("V3000") {
        return Err((*counts_no, SdfParseErrorKind::UnsupportedV3000));
    }
    let atom_count: usize = parse_int(counts, 0, 3, "1-3").map_err(|k| (*counts_no, k))?;
    let bond_count: usize = parse_int(counts, 3, 6, "4-6").map_err(|k| (*counts_no, k))?;

    let mut mol = Molecule::with_title(block[0].1.trim());
    let atom_lines = block.get(4..4 + atom_count).ok_or((
        last_line,
        SdfParseErrorKind::Truncated {
            section: "atom",
            expected: atom_count,
        },
    ))?;
    let mut ids = Vec::with_capacity(atom_count);
    for (no, line) in atom_lines {
        let atom = parse_atom_line(line).map_err(|k| (*no, k))?;
        ids.push(mol.add_atom(atom));
    }

    let bond_start = 4 + atom_count;
    let bond_lines = block.get(bond_start..bond_start + bond_count).ok_or((
        last_line,
        SdfParseErrorKind::Truncated {
            section: "bond",
            expected: bond_count,
        },
    ))?;
    for (no, line) in bond_lines {
        parse_bond_line(&mut mol, &ids, line).map_err(|k| (*no, k))?;
    }

    let rest = &block[bond_start + bond_count..];
    let data_start = parse_property_block(&mut mol, &ids, rest)?;
    parse_data_items(&mut mol, &rest[data_start..]);
    Ok(mol)
}

fn parse_atom_line(line: &str) -> Result<Atom, SdfParseErrorKind> {
    let x = parse_coordinate(line, 0, "1-10")?;
    let y = parse_coordinate(line, 10, "11-20")?;
    let z = parse_coordinate(line, 20, "21-30")?;
    let symbol = slice_and_trim(line, 31, 34);
    let element: Element = symbol
        .parse()
        .map_err(|_| SdfParseErrorKind::UnknownElement(symbol.to_string()))?;
    let charge_field = slice_and_trim(line, 36, 39);
    let code: u8 = if charge_field.is_empty() {
        0
    } else {
        parse_int(line, 36, 39, "37-39")?
    };
    Ok(Atom::new(element, Point3::new(x, y, z)).with_charge(charge_from_code(code)))
}

fn parse_bond_line(mol: &mut Molecule, ids: &[AtomId], line: &str) -> Result<(), SdfParseErrorKind> {
    let first: usize = parse_int(line, 0, 3, "1-3")?;
    let second: usize = parse_int(line, 3, 6, "4-6")?;
    let code: u8 = parse_int(line, 6, 9, "7-9")?;
    let order = BondOrder::from_ctfile(code).ok_or(SdfParseErrorKind::UnsupportedBondType(code))?;
    let resolve = |index: usize| {
        index
            .checked_sub(1)
            .and_then(|i| ids.get(i).copied())
            .ok_or(SdfParseErrorKind::AtomIndexOutOfRange {
                index,
                count: ids.len(),
            })
    };
    let (a, b) = (resolve(first)?, resolve(second)?);
    mol.add_bond(a, b, order)
        .map_err(|e| SdfParseErrorKind::InvalidBond(e.to_string()))?;
    Ok(())
}

/// Applies `M  CHG` lines and returns the offset just past `M  END`.
///
/// Following the CTfile rules, the first `M  CHG` line resets every charge
/// read from the atom block.
fn parse_property_block(
    mol: &mut Molecule,
    ids: &[AtomId],
    lines: &[(usize, String)],
) -> ParseResult<usize> {
    let mut charges_reset = false;
    for (offset, (no, line)) in lines.iter().enumerate() {
        if line.starts_with("M  END") {
            return Ok(offset + 1);
        }
        if line.starts_with('>') {
            return Ok(offset);
        }
        if !line.starts_with("M  CHG") {
            continue;
        }
        if !charges_reset {
            for id in ids {
                if let Some(atom) = mol.atom_mut(*id) {
                    atom.formal_charge = 0;
                }
            }
            charges_reset = true;
        }
        let tokens: Vec<&str> = line[6..].split_whitespace().collect();
        let entries: usize = tokens
            .first()
            .and_then(|t| t.parse().ok())
            .ok_or((*no, SdfParseErrorKind::MalformedPropertyLine))?;
        for pair in tokens[1..].chunks(2).take(entries) {
            let [index, charge] = pair else {
                return Err((*no, SdfParseErrorKind::MalformedPropertyLine));
            };
            let index: usize = index
                .parse()
                .map_err(|_| (*no, SdfParseErrorKind::MalformedPropertyLine))?;
            let charge: i8 = charge
                .parse()
                .map_err(|_| (*no, SdfParseErrorKind::MalformedPropertyLine))?;
            let id = index
                .checked_sub(1)
                .and_then(|i| ids.get(i))
                .ok_or((
                    *no,
                    SdfParseErrorKind::AtomIndexOutOfRange {
                        index,
                        count: ids.len(),
                    },
                ))?;
            if let Some(atom) = mol.atom_mut(*id) {
                atom.formal_charge = charge;
            }
        }
    }
    Ok(lines.len())
}

/// Reads `> <NAME>` data items into text properties. Multi-line values are
/// joined with newlines; a blank line ends a value.
fn parse_data_items(mol: &mut Molecule, lines: &[(usize, String)]) {
    let mut current: Option<(String, Vec<&str>)> = None;
    for (_, line) in lines {
        if line.starts_with('>') {
            if let Some((name, value)) = current.take() {
                mol.set_property(name, value.join("\n"));
            }
            let name = line
                .find('<')
                .and_then(|open| line[open + 1..].find('>').map(|close| &line[open + 1..open + 1 + close]))
                .unwrap_or("")
                .to_string();
            current = Some((name, Vec::new()));
        } else if line.trim().is_empty() {
            if let Some((name, value)) = current.take() {
                mol.set_property(name, value.join("\n"));
            }
        } else if let Some((_, value)) = current.as_mut() {
            value.push(line.trim_end());
        }
    }
    if let Some((name, value)) = current {
        mol.set_property(name, value.join("\n"));
    }
}

/// Writes molecules as V2000 SD records, properties as data items.
pub struct SdfWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> SdfWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn records_written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl SdfWriter<BufWriter<File>> {
    /// Creates the output file, including any missing parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SdfError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

/// Renders one record. Kept separate from the I/O so that a record which
/// cannot be represented never leaves partial output behind.
fn render_record(mol: &Molecule) -> Result<String, SdfError> {
    if mol.atom_count() > MAX_V2000_COUNT || mol.bond_count() > MAX_V2000_COUNT {
        return Err(SdfError::Unrepresentable {
            title: mol.title().to_string(),
            reason: format!(
                "{} atoms and {} bonds exceed the limit of {}",
                mol.atom_count(),
                mol.bond_count(),
                MAX_V2000_COUNT
            ),
        });
    }

    let mut out = String::new();
    let mut index: SecondaryMap<AtomId, usize> = SecondaryMap::new();
    let mut charged: Vec<(usize, i8)> = Vec::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", mol.title());
    let _ = writeln!(out, "  moldesc");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
        mol.atom_count(),
        mol.bond_count()
    );
    for (i, (id, atom)) in mol.atoms_iter().enumerate() {
        index.insert(id, i + 1);
        if atom.formal_charge != 0 {
            charged.push((i + 1, atom.formal_charge));
        }
        let _ = writeln!(
            out,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
            atom.position.x,
            atom.position.y,
            atom.position.z,
            atom.element.symbol()
        );
    }
    for bond in mol.bonds() {
        let _ = writeln!(
            out,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            index.get(bond.atom1_id).copied().unwrap_or(0),
            index.get(bond.atom2_id).copied().unwrap_or(0),
            bond.order.to_ctfile()
        );
    }
    for chunk in charged.chunks(CHARGES_PER_LINE) {
        let _ = write!(out, "M  CHG{:>3}", chunk.len());
        for (atom, charge) in chunk {
            let _ = write!(out, " {:>3} {:>3}", atom, charge);
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "M  END");
    for (name, value) in mol.properties() {
        let _ = writeln!(out, "> <{}>", name);
        let _ = writeln!(out, "{}", value);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", RECORD_TERMINATOR);
    Ok(out)
}

impl<W: Write> MoleculeSink for SdfWriter<W> {
    type Error = SdfError;

    fn write(&mut self, mol: &Molecule) -> Result<(), Self::Error> {
        let record = render_record(mol)?;
        self.writer.write_all(record.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::property::PropertyValue;
    use std::io::Cursor;

    const ETHANOL_AND_ACID: &str = "\
ethanol
  test

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000    1.2000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  1  0  0  0  0
M  END
> <ID>
MOL-1

$$$$
acetate
  test

  4  3  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000    1.2000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000   -1.2000    0.0000 O   0  5  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  2  0  0  0  0
  2  4  1  0  0  0  0
M  END
> <ID>
MOL-2

> <Notes>
first line
second line

$$$$
";

    fn read_all(input: &str) -> Vec<Result<Molecule, SdfError>> {
        SdfReader::new(Cursor::new(input.to_string())).collect()
    }

    #[test]
    fn reads_every_record_with_properties() {
        let records = read_all(ETHANOL_AND_ACID);
        assert_eq!(records.len(), 2);
        let ethanol = records[0].as_ref().unwrap();
        assert_eq!(ethanol.title(), "ethanol");
        assert_eq!(ethanol.atom_count(), 3);
        assert_eq!(ethanol.bond_count(), 2);
        assert_eq!(ethanol.property("ID"), Some(&PropertyValue::Text("MOL-1".into())));

        let acetate = records[1].as_ref().unwrap();
        assert_eq!(
            acetate.property("Notes").and_then(PropertyValue::as_text),
            Some("first line\nsecond line")
        );
        let charges: Vec<i8> = acetate.atoms_iter().map(|(_, a)| a.formal_charge).collect();
        assert_eq!(charges, vec![0, 0, 0, -1]);
    }

    #[test]
    fn reader_initializes_implicit_hydrogens() {
        let records = read_all(ETHANOL_AND_ACID);
        let ethanol = records[0].as_ref().unwrap();
        let hydrogens: Vec<u8> = ethanol.atoms_iter().map(|(_, a)| a.implicit_hydrogens).collect();
        assert_eq!(hydrogens, vec![3, 2, 1]);
        let acetate = records[1].as_ref().unwrap();
        let hydrogens: Vec<u8> = acetate.atoms_iter().map(|(_, a)| a.implicit_hydrogens).collect();
        assert_eq!(hydrogens, vec![3, 0, 0, 0]);
    }

    #[test]
    fn malformed_record_is_reported_and_skipped() {
        let broken = ETHANOL_AND_ACID.replacen("  1  2  1  0", "  1  9  1  0", 1);
        let records = read_all(&broken);
        assert_eq!(records.len(), 2);
        let err = records[0].as_ref().unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            SdfError::Parse {
                record: 1,
                line: 8,
                kind: SdfParseErrorKind::AtomIndexOutOfRange { index: 9, count: 3 }
            }
        ));
        assert_eq!(records[1].as_ref().unwrap().title(), "acetate");
    }

    #[test]
    fn m_chg_lines_override_atom_block_charges() {
        let input = ETHANOL_AND_ACID.replacen("M  END\n> <ID>\nMOL-2", "M  CHG  1   1   1\nM  END\n> <ID>\nMOL-2", 1);
        let records = read_all(&input);
        let acetate = records[1].as_ref().unwrap();
        let charges: Vec<i8> = acetate.atoms_iter().map(|(_, a)| a.formal_charge).collect();
        assert_eq!(charges, vec![1, 0, 0, 0]);
    }

    #[test]
    fn v3000_is_rejected() {
        let input = "title\n\n\n  0  0  0     0  0            999 V3000\nM  END\n$$$$\n";
        let records = read_all(input);
        assert!(matches!(
            records[0],
            Err(SdfError::Parse {
                kind: SdfParseErrorKind::UnsupportedV3000,
                ..
            })
        ));
    }

    #[test]
    fn trailing_blank_lines_do_not_form_a_record() {
        let input = format!("{ETHANOL_AND_ACID}\n\n");
        assert_eq!(read_all(&input).len(), 2);
    }

    #[test]
    fn written_records_read_back_with_properties_and_charges() {
        let records = read_all(ETHANOL_AND_ACID);
        let mut acetate = records.into_iter().nth(1).unwrap().unwrap();
        acetate.set_property("TPSA", 40.13);
        acetate.set_property("HBD", 0i64);

        let mut writer = SdfWriter::new(Vec::new());
        writer.write(&acetate).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.records_written(), 1);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("M  CHG  1   4  -1"));
        assert!(text.contains("> <TPSA>\n40.13\n"));

        let reread: Vec<_> = read_all(&text);
        let mol = reread[0].as_ref().unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.property("HBD").and_then(PropertyValue::as_text), Some("0"));
        assert_eq!(mol.property("ID").and_then(PropertyValue::as_text), Some("MOL-2"));
        let charges: Vec<i8> = mol.atoms_iter().map(|(_, a)| a.formal_charge).collect();
        assert_eq!(charges, vec![0, 0, 0, -1]);
    }

    #[test]
    fn create_makes_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.sdf");
        let mut writer = SdfWriter::create(&path).unwrap();
        writer.write(&Molecule::with_title("empty")).unwrap();
        writer.finish().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("empty\n"));
        assert!(text.trim_end().ends_with("$$$$"));
    }
}
