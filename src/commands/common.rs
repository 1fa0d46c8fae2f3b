use std::{
    fs,
    io::Write,
    path::Path,
};

use anyhow::{
    bail,
    Context,
};
use log::info;

use crate::{
    raw::H5Store,
    settings::Settings,
    types::{
        Result,
        Vector,
    },
};


/// Open the raw data store, falling back to the configured default
/// location when no explicit file name was given.
pub fn open_store(vaspout: Option<&Path>) -> Result<H5Store> {
    let path = match vaspout {
        Some(path) => path.to_path_buf(),
        None => Settings::load()?.vaspout,
    };
    info!("Reading raw data from {:?} ...", path);
    H5Store::open(&path)
}


pub fn write_array_to_txt(file_name: &(impl AsRef<Path> + ?Sized), ys: Vec<&Vector<f64>>, comment: &str) -> Result<()> {
    let ncol = ys.len();

    let x = ys.get(0).context("At least one data column is needed")?;
    let nrow = x.len();

    if nrow == 0 || !ys.iter().all(|y| y.len() == nrow) {
        bail!("[WRT_ARRAY]: input data with zero length or they don't have consistent lengths");
    }

    let mut f = fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(file_name)?;

    writeln!(f, "# {}", comment.trim())?;

    for irow in 0 .. nrow {
        let mut s = String::with_capacity(8);
        for icol in 0 .. ncol {
            s.push_str(&format!("  {:15.6}", ys[icol][irow]));
        }
        s.push('\n');

        f.write(s.as_bytes())?;
    }

    Ok(())
}


#[cfg(test)]
mod test {
    use ndarray::Array;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_write_array_to_txt() {
        let dir = TempDir::new("rspost_txt").unwrap();
        let path = dir.path().join("data.txt");

        let x = Array::linspace(0.0, 1.0, 3);
        let y = x.mapv(|v| v * 2.0);
        write_array_to_txt(&path, vec![&x, &y], "x y").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# x y\n"));
        assert_eq!(written.lines().count(), 4);

        let mismatched = Array::linspace(0.0, 1.0, 4);
        assert!(write_array_to_txt(&path, vec![&x, &mismatched], "broken").is_err());
    }
}
