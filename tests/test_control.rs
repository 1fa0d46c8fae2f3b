use std::fs;

use tempdir::TempDir;

use rspost::control::{
    Incar,
    Kpoints,
};


const INCAR_SAMPLE: &str = "\
SYSTEM = SrTiO3 ! a perovskite
ENCUT = 400 ; ISMEAR = 0   # both on one line
ediff = 1E-6
";

const KPOINTS_SAMPLE: &str = "\
k-points along high symmetry lines
 20
line
reciprocal
  0.0 0.0 0.0  ! $\\Gamma$
  0.5 0.5 0.5  ! M
";


#[test]
fn test_incar_from_file() {
    let dir = TempDir::new("rspost_incar").unwrap();
    let path = dir.path().join("INCAR");
    fs::write(&path, INCAR_SAMPLE).unwrap();

    let incar = Incar::from_file(&path);
    assert_eq!(incar.read().unwrap(), INCAR_SAMPLE);

    let tags = incar.to_dict().unwrap();
    let entries = tags.iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(entries, vec![
        ("SYSTEM", "SrTiO3"),
        ("ENCUT",  "400"),
        ("ISMEAR", "0"),
        ("EDIFF",  "1E-6"),
    ]);
}


#[test]
fn test_incar_write_updates_file() {
    let dir = TempDir::new("rspost_incar").unwrap();
    let path = dir.path().join("INCAR");
    fs::write(&path, INCAR_SAMPLE).unwrap();

    let mut incar = Incar::from_file(&path);
    incar.write("NSW = 100\n").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "NSW = 100\n");
    assert_eq!(incar.to_dict().unwrap().get("NSW").map(String::as_str), Some("100"));
}


#[test]
fn test_incar_in_memory_write_keeps_disk_untouched() {
    let dir = TempDir::new("rspost_incar").unwrap();
    let path = dir.path().join("INCAR");
    fs::write(&path, INCAR_SAMPLE).unwrap();

    let mut in_memory = Incar::from_string(INCAR_SAMPLE);
    in_memory.write("NSW = 100\n").unwrap();

    assert_eq!(in_memory.read().unwrap(), "NSW = 100\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), INCAR_SAMPLE);
}


#[test]
fn test_kpoints_roundtrip() {
    let dir = TempDir::new("rspost_kpoints").unwrap();
    let path = dir.path().join("KPOINTS");
    fs::write(&path, KPOINTS_SAMPLE).unwrap();

    let mut kpoints = Kpoints::from_file(&path);
    assert_eq!(kpoints.read().unwrap(), KPOINTS_SAMPLE);

    let gamma_only = "gamma only\n 0\ngamma\n 1 1 1\n";
    kpoints.write(gamma_only).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), gamma_only);

    let in_memory = Kpoints::from_string(KPOINTS_SAMPLE);
    assert_eq!(in_memory.read().unwrap(), KPOINTS_SAMPLE);
}


#[test]
fn test_missing_file_propagates_plain_error() {
    let incar = Incar::from_file("/nonexistent/INCAR");
    let err = incar.read().unwrap_err();
    assert!(err.downcast_ref::<rspost::types::RefinementError>().is_none());
}
