use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use indexmap::IndexMap;
use log::warn;
use regex::Regex;

use crate::types::Result;


/// A control file that either lives on disk or is held in memory. Writing
/// an in-memory file only updates the buffer.
#[derive(Debug, Clone)]
pub struct TextFile {
    backing: Backing,
}

#[derive(Debug, Clone)]
enum Backing {
    OnDisk(PathBuf),
    InMemory(String),
}

impl TextFile {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Self {
        Self { backing: Backing::OnDisk(path.as_ref().to_path_buf()) }
    }

    pub fn from_string(text: &str) -> Self {
        Self { backing: Backing::InMemory(text.to_string()) }
    }

    pub fn read(&self) -> Result<String> {
        match &self.backing {
            Backing::OnDisk(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read control file {:?}", path)),
            Backing::InMemory(text) => Ok(text.clone()),
        }
    }

    pub fn write(&mut self, text: &str) -> Result<()> {
        match &mut self.backing {
            Backing::OnDisk(path) => fs::write(&path, text)
                .with_context(|| format!("Failed to write control file {:?}", path))?,
            Backing::InMemory(buffer) => *buffer = text.to_string(),
        }
        Ok(())
    }

    pub fn print(&self) -> Result<()> {
        println!("{}", self.read()?);
        Ok(())
    }
}


/// The INCAR file with the input tags of a calculation.
#[derive(Debug, Clone)]
pub struct Incar {
    file: TextFile,
}

impl Incar {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Self {
        Self { file: TextFile::from_file(path) }
    }

    pub fn from_string(text: &str) -> Self {
        Self { file: TextFile::from_string(text) }
    }

    pub fn read(&self) -> Result<String> {
        self.file.read()
    }

    pub fn write(&mut self, text: &str) -> Result<()> {
        self.file.write(text)
    }

    pub fn print(&self) -> Result<()> {
        self.file.print()
    }

    /// Parse `TAG = value` statements into an ordered map. Keys are
    /// upper-cased, `#`/`!` comments are stripped, `;` separates statements
    /// sharing a line.
    pub fn to_dict(&self) -> Result<IndexMap<String, String>> {
        let text = self.file.read()?;
        let tag_re = Regex::new(r"^\s*([\w/]+)\s*=\s*(.*?)\s*$").unwrap();

        let mut tags = IndexMap::new();
        for line in text.lines() {
            let uncommented = line.split(&['#', '!'][..]).next().unwrap_or("");
            for statement in uncommented.split(';') {
                if statement.trim().is_empty() {
                    continue;
                }
                if let Some(captures) = tag_re.captures(statement) {
                    tags.insert(captures[1].to_ascii_uppercase(), captures[2].to_string());
                } else {
                    warn!("[INCAR]: Cannot parse statement {:?}, skipped", statement.trim());
                }
            }
        }

        Ok(tags)
    }
}


/// The KPOINTS file defining the k-point sampling of a calculation.
#[derive(Debug, Clone)]
pub struct Kpoints {
    file: TextFile,
}

impl Kpoints {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Self {
        Self { file: TextFile::from_file(path) }
    }

    pub fn from_string(text: &str) -> Self {
        Self { file: TextFile::from_string(text) }
    }

    pub fn read(&self) -> Result<String> {
        self.file.read()
    }

    pub fn write(&mut self, text: &str) -> Result<()> {
        self.file.write(text)
    }

    pub fn print(&self) -> Result<()> {
        self.file.print()
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let mut incar = Incar::from_string("ENCUT = 400\n");
        assert_eq!(incar.read().unwrap(), "ENCUT = 400\n");

        incar.write("ENCUT = 500\n").unwrap();
        assert_eq!(incar.read().unwrap(), "ENCUT = 500\n");
    }

    #[test]
    fn test_incar_to_dict() {
        let incar = Incar::from_string("\
SYSTEM = SrTiO3 ! a perovskite
ENCUT = 400 ; ISMEAR = 0   # smearing
# nothing here
 lwave = .FALSE.
garbage line
");
        let tags = incar.to_dict().unwrap();
        let entries = tags.iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(entries, vec![
            ("SYSTEM", "SrTiO3"),
            ("ENCUT",  "400"),
            ("ISMEAR", "0"),
            ("LWAVE",  ".FALSE."),
        ]);
    }

    #[test]
    fn test_incar_value_with_spaces() {
        let incar = Incar::from_string("MAGMOM = 2*1.0 4*0.0\n");
        let tags = incar.to_dict().unwrap();
        assert_eq!(tags.get("MAGMOM").map(String::as_str), Some("2*1.0 4*0.0"));
    }
}
