use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::s;

use crate::{
    graph::{
        Graph,
        Series,
    },
    selection,
    raw::RawPhononDos,
    refine::topology::Topology,
    types::{
        Cube,
        RefinementError,
        Result,
        Vector,
    },
};


const DEFAULT_IMAGE: &str = "phonon_dos.png";


/// Phonon density of states accessor. Partial DOS curves are summed from
/// the per-atom, per-direction projection array.
pub struct PhononDos {
    energies    : Vector<f64>,
    dos         : Vector<f64>,
    projections : Cube<f64>,
    topology    : Topology,
}

pub struct PhononDosDict {
    pub energies    : Vector<f64>,
    pub total       : Vector<f64>,
    pub projections : IndexMap<String, Vector<f64>>,
}

/// One resolved selection path: which atoms and directions to sum over.
struct Projection {
    label      : String,
    atoms      : Vec<usize>,
    directions : Vec<usize>,
}


impl PhononDos {
    pub fn from_raw(raw: RawPhononDos) -> Self {
        let RawPhononDos { energies, dos, projections, topology } = raw;
        Self {
            energies,
            dos,
            projections,
            topology: Topology::from_raw(topology),
        }
    }

    pub fn energies(&self) -> &Vector<f64> {
        &self.energies
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Energies, total DOS and one labelled partial DOS per selection path.
    ///
    /// Tokens: an element symbol, a 1-based atom index or `low:high` range,
    /// or a direction `x`/`y`/`z`. Unspecified categories select everything.
    pub fn to_dict(&self, selection: Option<&str>) -> Result<PhononDosDict> {
        let mut projections = IndexMap::new();
        for projection in self.resolve_selection(selection)? {
            let partial = self.partial_dos(&projection);
            projections.insert(projection.label, partial);
        }

        Ok(PhononDosDict {
            energies: self.energies.clone(),
            total: self.dos.clone(),
            projections,
        })
    }

    /// Graph of the total DOS plus any selected partial DOS.
    pub fn plot(&self, selection: Option<&str>) -> Result<Graph> {
        let data = self.to_dict(selection)?;

        let mut series = Vec::with_capacity(data.projections.len() + 1);
        series.push(Series {
            x: data.energies.clone(),
            y: data.total,
            name: "total".to_string(),
        });
        for (label, partial) in data.projections {
            series.push(Series {
                x: data.energies.clone(),
                y: partial,
                name: label,
            });
        }

        Ok(Graph {
            series,
            xlabel: "ω (THz)".to_string(),
            ylabel: "DOS (1/THz)".to_string(),
            title: None,
        })
    }

    pub fn to_plotly(&self, selection: Option<&str>) -> Result<plotly::Plot> {
        Ok(self.plot(selection)?.to_plotly())
    }

    /// Write a static image, `phonon_dos.png` when no file name is given.
    /// Returns the path actually written.
    pub fn to_image(&self, selection: Option<&str>, filename: Option<&Path>) -> Result<PathBuf> {
        let path = filename
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE));
        self.plot(selection)?.write_image(&path)?;
        Ok(path)
    }

    fn resolve_selection(&self, selection: Option<&str>) -> Result<Vec<Projection>> {
        let tree = selection::parse(selection.unwrap_or(""))?;
        let natoms = self.topology.number_atoms();

        let mut projections = Vec::new();
        for path in selection::paths(&tree) {
            let mut atoms:      Option<(Vec<usize>, &str)> = None;
            let mut directions: Option<(usize,      &str)> = None;

            for &token in path.iter() {
                if let Some(range) = self.topology.atom_range(token) {
                    set_unique(&mut atoms, range.collect(), token)?;
                } else if let Some(direction) = direction_index(token) {
                    set_unique(&mut directions, direction, token)?;
                } else if let Some(indices) = atom_indices(token, natoms) {
                    set_unique(&mut atoms, indices, token)?;
                } else {
                    return Err(RefinementError::UnknownToken {
                        token: token.to_string(),
                        available: self.available_tokens(),
                    }.into());
                }
            }

            projections.push(Projection {
                label: path.join("_"),
                atoms: atoms.map(|(a, _)| a)
                    .unwrap_or_else(|| (0 .. natoms).collect()),
                directions: directions.map(|(d, _)| vec![d])
                    .unwrap_or_else(|| vec![0, 1, 2]),
            });
        }

        Ok(projections)
    }

    fn partial_dos(&self, projection: &Projection) -> Vector<f64> {
        let mut partial = Vector::<f64>::zeros(self.energies.len());
        for &atom in &projection.atoms {
            for &direction in &projection.directions {
                partial += &self.projections.slice(s![atom, direction, ..]);
            }
        }
        partial
    }

    fn available_tokens(&self) -> String {
        format!("{}, x, y, z, atom indices 1..={}",
                self.topology.elements().iter().join(", "),
                self.topology.number_atoms())
    }
}

impl fmt::Display for PhononDos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.energies.first().copied().unwrap_or(0.0);
        let last  = self.energies.last().copied().unwrap_or(0.0);
        writeln!(f, "phonon DOS:")?;
        writeln!(f, "    [{:.2}, {:.2}] mesh with {} points", first, last, self.energies.len())?;
        writeln!(f, "    {} modes", 3 * self.topology.number_atoms())?;
        write!(f, "    {}", self.topology)
    }
}


fn direction_index(token: &str) -> Option<usize> {
    match token {
        "x" => Some(0),
        "y" => Some(1),
        "z" => Some(2),
        _ => None,
    }
}

/// 1-based atom index or inclusive `low:high` range, `None` when the token
/// is not of that shape or runs outside the structure.
fn atom_indices(token: &str, natoms: usize) -> Option<Vec<usize>> {
    let (low, high) = match token.split_once(':') {
        Some((low, high)) => (low.parse::<usize>().ok()?, high.parse::<usize>().ok()?),
        None => {
            let index = token.parse::<usize>().ok()?;
            (index, index)
        },
    };

    if low < 1 || high < low || high > natoms {
        return None;
    }
    Some((low - 1 .. high).collect())
}

fn set_unique<'a, T>(slot: &mut Option<(T, &'a str)>, value: T, token: &'a str) -> Result<()> {
    if let Some((_, previous)) = slot {
        return Err(RefinementError::ConflictingTokens(
            previous.to_string(), token.to_string()).into());
    }
    *slot = Some((value, token));
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_atom_indices() {
        assert_eq!(atom_indices("3", 7),   Some(vec![2]));
        assert_eq!(atom_indices("1:3", 7), Some(vec![0, 1, 2]));
        assert_eq!(atom_indices("7", 7),   Some(vec![6]));
        assert_eq!(atom_indices("8", 7),   None);
        assert_eq!(atom_indices("0", 7),   None);
        assert_eq!(atom_indices("3:2", 7), None);
        assert_eq!(atom_indices("a:2", 7), None);
        assert_eq!(atom_indices("Sr", 7),  None);
    }

    #[test]
    fn test_direction_index() {
        assert_eq!(direction_index("x"), Some(0));
        assert_eq!(direction_index("y"), Some(1));
        assert_eq!(direction_index("z"), Some(2));
        assert_eq!(direction_index("X"), None);
    }
}
