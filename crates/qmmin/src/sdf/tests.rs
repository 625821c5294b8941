use approx::assert_abs_diff_eq;
use insta::assert_snapshot;
use jiff::civil::date;
use tempfile::NamedTempFile;
use test_case::test_case;

use super::*;
use crate::transcript::Transcript;

fn writer() -> SdfWriter {
    SdfWriter::new("qmmin").with_timestamp(date(2026, 10, 19).at(9, 26, 0, 0))
}

fn water() -> ParsedMolecule {
    let mut mol = ParsedMolecule::new(vec![
        Atom::new(8, 0.0, 0.0, 0.0),
        Atom::new(1, 0.0, 0.757, 0.587),
        Atom::new(1, 0.0, -0.757, 0.587),
    ])
    .with_title("water");
    mol.annotate("FINAL_ENERGY", "-76.3412");
    mol
}

fn to_string(mol: &ParsedMolecule) -> String {
    let mut buf = Vec::new();
    writer().write(&mut buf, mol, "<buffer>").unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn write() {
    assert_snapshot!(to_string(&water()), @r"
    water
      qmmin   10192609263D

      3  0  0  0  0  0  0  0  0  0999 V2000
        0.0000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
        0.0000    0.7570    0.5870 H   0  0  0  0  0  0  0  0  0  0  0  0
        0.0000   -0.7570    0.5870 H   0  0  0  0  0  0  0  0  0  0  0  0
    M  END
    > <FINAL_ENERGY>
    -76.3412

    $$$$
    ");
}

#[test]
fn counts_line_width() {
    let got = to_string(&water());
    let counts = got.lines().nth(3).unwrap();
    assert_eq!(counts.len(), 39);
    let atom = got.lines().nth(4).unwrap();
    assert_eq!(&atom[31..34], "O  ");
}

#[test]
fn long_program_name() {
    let w = SdfWriter::new("a-very-long-name")
        .with_timestamp(date(2026, 1, 2).at(3, 4, 0, 0));
    assert_eq!(w.program_line(), "  a-very-l01022603043D");
}

#[test]
fn round_trip() {
    let want = Transcript::default()
        .read_file("testfiles/psi4/opt.dat")
        .unwrap()
        .molecule;
    let got = read_record(&to_string(&want)).unwrap();
    assert_eq!(got.atoms.len(), want.atoms.len());
    for (g, w) in got.atoms.iter().zip(&want.atoms) {
        assert_eq!(g.label(), w.label());
        assert_abs_diff_eq!(*g, *w, epsilon = 1e-4);
    }
    assert_eq!(
        got.annotation("FINAL_ENERGY"),
        Some("-76.0270321123571")
    );
    assert_eq!(got.annotations, want.annotations);
}

#[test]
fn several_records() {
    let file = NamedTempFile::new().unwrap();
    let mut other = water().with_title("other");
    other.annotate("FINAL_ENERGY", "-1.0");
    writer().write_all(file.path(), &[water(), other]).unwrap();

    let got = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(got.matches(DELIMITER).count(), 2);
    assert!(got.ends_with("$$$$\n"));

    let (first, second) = got.split_once("$$$$\n").unwrap();
    assert_eq!(read_record(first).unwrap(), water());
    let second = read_record(second).unwrap();
    assert_eq!(second.title, "other");
    assert_eq!(second.annotation("FINAL_ENERGY"), Some("-1.0"));
}

#[test]
fn write_file_failed() {
    let got = writer().write_file("testfiles/no/such/dir/out.sdf", &water());
    assert_eq!(
        got,
        Err(ParseError::WriteFailed(
            String::from("testfiles/no/such/dir/out.sdf"),
            io::ErrorKind::NotFound,
        ))
    );
}

#[test]
fn too_many_atoms() {
    let mol = ParsedMolecule::new(vec![Atom::new(6, 0.0, 0.0, 0.0); 1000]);
    let got = writer().write(&mut Vec::<u8>::new(), &mol, "big");
    assert_eq!(
        got,
        Err(ParseError::WriteFailed(
            String::from("big"),
            io::ErrorKind::InvalidInput
        ))
    );
}

#[test_case(-12345.5; "too wide")]
#[test_case(100000.0; "large positive")]
#[test_case(f64::NAN; "nan")]
#[test_case(f64::NEG_INFINITY; "infinite")]
fn coordinate_out_of_range(x: f64) {
    let mol = ParsedMolecule::new(vec![Atom::new(6, x, 1.0, 2.0)]);
    let mut buf = Vec::new();
    let got = writer().write(&mut buf, &mol, "wide");
    assert_eq!(
        got,
        Err(ParseError::WriteFailed(
            String::from("wide"),
            io::ErrorKind::InvalidInput
        ))
    );
    assert!(buf.is_empty());
}

#[test]
fn widest_coordinates() {
    let atom = Atom::new(6, -9999.9999, 99999.9999, 0.0);
    let mol = ParsedMolecule::new(vec![atom]);
    let got = read_record(&to_string(&mol)).unwrap();
    assert_eq!(got.atoms, mol.atoms);
}

/// a sink that rejects every write
struct Full;

impl Write for Full {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::StorageFull, "full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_rejects() {
    let got = writer().write(&mut Full, &water(), "full");
    assert_eq!(
        got,
        Err(ParseError::WriteFailed(
            String::from("full"),
            io::ErrorKind::StorageFull
        ))
    );
}

#[test]
fn read_malformed() {
    assert!(matches!(read_record(""), Err(ParseError::MalformedRecord(_))));
    let v3000 = "\n\n\n  0  0  0     0  0            999 V3000\n";
    assert_eq!(
        read_record(v3000),
        Err(ParseError::MalformedRecord(String::from(
            "only V2000 records are supported"
        )))
    );
}
