/// Raw records read from the `vaspout.h5` backing store.
///
/// Every record is a plain bundle of arrays and metadata, keyed by dataset
/// name inside the file. No refinement happens here: the accessors in
/// `crate::refine` borrow these arrays read-only and do the reshaping.
use std::path::Path;

use anyhow::{
    bail,
    Context,
};
use hdf5::types::VarLenUnicode;
use ndarray::{
    Array4,
    Axis,
    Ix2,
    Ix3,
    Ix4,
};

use crate::types::{
    Cube,
    Matrix,
    Result,
    Vector,
};


const DS_KPOINT_MODE:          &str = "input/kpoints/mode";
const DS_KPOINT_NUMBER:        &str = "input/kpoints/number_kpoints";
const DS_KPOINT_LABELS:        &str = "input/kpoints/labels_kpoints";
const DS_KPOINT_LABEL_INDICES: &str = "input/kpoints/positions_labels_kpoints";
const DS_KPOINT_COORDINATES:   &str = "results/electron_eigenvalues/kpoint_coordinates";
const DS_KPOINT_WEIGHTS:       &str = "results/electron_eigenvalues/kpoints_symmetry_weight";
const DS_CELL_LATTICE:         &str = "results/positions/lattice_vectors";
const DS_CELL_SCALE:           &str = "results/positions/scale";

const DS_DIELECTRIC_ENERGIES: &str = "results/linear_response/energies_dielectric_function";
const DS_DIELECTRIC_DENSITY:  &str = "results/linear_response/density_density_dielectric_function";
const DS_DIELECTRIC_CURRENT:  &str = "results/linear_response/current_current_dielectric_function";
const DS_DIELECTRIC_ION:      &str = "results/linear_response/ion_dielectric_function";

const DS_PHONON_ENERGIES:    &str = "results/phonons/energies_dos";
const DS_PHONON_DOS:         &str = "results/phonons/dos";
const DS_PHONON_PROJECTIONS: &str = "results/phonons/projected_dos";
const DS_ION_TYPES:          &str = "results/positions/ion_types";
const DS_NUMBER_ION_TYPES:   &str = "results/positions/number_ion_types";


#[derive(Clone, Debug)]
pub struct RawCell {
    pub scale           : f64,
    pub lattice_vectors : Matrix<f64>,
}


#[derive(Clone, Debug)]
pub struct RawKpoints {
    pub mode          : String,
    pub number        : usize,          // k-points per line in line mode, 0 otherwise
    pub coordinates   : Matrix<f64>,    // (nkpoints, 3), direct
    pub weights       : Vector<f64>,
    pub labels        : Option<Vec<String>>,
    pub label_indices : Option<Vec<usize>>,  // 1-based, parallel to labels
    pub cell          : RawCell,
}


#[derive(Clone, Debug)]
pub struct RawDielectricFunction {
    pub energies        : Vector<f64>,
    pub density_density : Option<Array4<f64>>,  // (3, 3, nenergies, 2), trailing axis = (re, im)
    pub current_current : Option<Array4<f64>>,
    pub ion             : Option<Array4<f64>>,
}


#[derive(Clone, Debug)]
pub struct RawTopology {
    pub ion_types        : Vec<String>,
    pub number_ion_types : Vec<usize>,
}


#[derive(Clone, Debug)]
pub struct RawPhononDos {
    pub energies    : Vector<f64>,
    pub dos         : Vector<f64>,
    pub projections : Cube<f64>,    // (nions, 3, nenergies)
    pub topology    : RawTopology,
}


/// Thin reader over a `vaspout.h5` file. All storage failures propagate as
/// plain errors; only the refinement layer produces `RefinementError`s.
pub struct H5Store {
    file: hdf5::File,
}

impl H5Store {
    pub fn open(path: &(impl AsRef<Path> + ?Sized)) -> Result<Self> {
        let path = path.as_ref();
        let file = hdf5::File::open(path)
            .with_context(|| format!("Failed to open raw data store {:?}", path))?;
        Ok(Self { file })
    }

    pub fn kpoint(&self) -> Result<RawKpoints> {
        let mode = self.read_string(DS_KPOINT_MODE)?;
        let number = self.read_optional_usize(DS_KPOINT_NUMBER)?.unwrap_or(0);
        let coordinates = self.file.dataset(DS_KPOINT_COORDINATES)?.read_2d::<f64>()?;
        let weights = self.file.dataset(DS_KPOINT_WEIGHTS)?.read_1d::<f64>()?;

        let labels = match self.file.dataset(DS_KPOINT_LABELS) {
            Ok(ds) => Some(ds.read_1d::<VarLenUnicode>()?
                           .iter()
                           .map(|s| s.as_str().to_string())
                           .collect::<Vec<String>>()),
            Err(_) => None,
        };
        let label_indices = match self.file.dataset(DS_KPOINT_LABEL_INDICES) {
            Ok(ds) => Some(ds.read_1d::<i32>()?
                           .iter()
                           .map(|&i| i as usize)
                           .collect::<Vec<usize>>()),
            Err(_) => None,
        };

        Ok(RawKpoints {
            mode, number, coordinates, weights, labels, label_indices,
            cell: self.cell()?,
        })
    }

    pub fn dielectric_function(&self) -> Result<RawDielectricFunction> {
        Ok(RawDielectricFunction {
            energies:        self.file.dataset(DS_DIELECTRIC_ENERGIES)?.read_1d::<f64>()?,
            density_density: self.read_optional_tensor(DS_DIELECTRIC_DENSITY)?,
            current_current: self.read_optional_tensor(DS_DIELECTRIC_CURRENT)?,
            ion:             self.read_optional_tensor(DS_DIELECTRIC_ION)?,
        })
    }

    pub fn phonon_dos(&self) -> Result<RawPhononDos> {
        let energies = self.file.dataset(DS_PHONON_ENERGIES)?.read_1d::<f64>()?;
        let dos = self.file.dataset(DS_PHONON_DOS)?.read_1d::<f64>()?;
        let projections = self.file.dataset(DS_PHONON_PROJECTIONS)?
            .read_dyn::<f64>()?
            .into_dimensionality::<Ix3>()?;

        Ok(RawPhononDos {
            energies, dos, projections,
            topology: self.topology()?,
        })
    }

    pub fn topology(&self) -> Result<RawTopology> {
        let ion_types = self.file.dataset(DS_ION_TYPES)?
            .read_1d::<VarLenUnicode>()?
            .iter()
            .map(|s| s.as_str().trim().to_string())
            .collect::<Vec<String>>();
        let number_ion_types = self.file.dataset(DS_NUMBER_ION_TYPES)?
            .read_1d::<i32>()?
            .iter()
            .map(|&i| i as usize)
            .collect::<Vec<usize>>();

        Ok(RawTopology { ion_types, number_ion_types })
    }

    pub fn cell(&self) -> Result<RawCell> {
        let scale = self.read_optional_scalar(DS_CELL_SCALE)?.unwrap_or(1.0);
        let arr = self.file.dataset(DS_CELL_LATTICE)?.read_dyn::<f64>()?;
        let lattice_vectors = match arr.ndim() {
            2 => arr.into_dimensionality::<Ix2>()?,
            // trajectory of lattices, the final step is the relevant one
            3 => {
                let arr = arr.into_dimensionality::<Ix3>()?;
                let last = arr.shape()[0] - 1;
                arr.index_axis(Axis(0), last).to_owned()
            },
            d => bail!("Lattice vectors dataset has unexpected dimension {}", d),
        };

        Ok(RawCell { scale, lattice_vectors })
    }

    fn read_string(&self, name: &str) -> Result<String> {
        let raw = self.file.dataset(name)?.read_scalar::<VarLenUnicode>()?;
        Ok(raw.as_str().to_string())
    }

    fn read_optional_scalar(&self, name: &str) -> Result<Option<f64>> {
        match self.file.dataset(name) {
            Ok(ds) => Ok(Some(ds.read_scalar::<f64>()?)),
            Err(_) => Ok(None),
        }
    }

    fn read_optional_usize(&self, name: &str) -> Result<Option<usize>> {
        match self.file.dataset(name) {
            Ok(ds) => Ok(Some(ds.read_scalar::<i32>()? as usize)),
            Err(_) => Ok(None),
        }
    }

    fn read_optional_tensor(&self, name: &str) -> Result<Option<Array4<f64>>> {
        match self.file.dataset(name) {
            Ok(ds) => Ok(Some(ds.read_dyn::<f64>()?.into_dimensionality::<Ix4>()?)),
            Err(_) => Ok(None),
        }
    }
}
