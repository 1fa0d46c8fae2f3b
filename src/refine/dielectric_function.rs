use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

use indexmap::IndexMap;
use itertools::{
    iproduct,
    Itertools,
};
use ndarray::Array4;

use crate::{
    graph::{
        Graph,
        Series,
    },
    selection,
    raw::RawDielectricFunction,
    types::{
        c64,
        Cube,
        RefinementError,
        Result,
        Vector,
    },
};


/// Direction labels in the order they are reported to the user.
pub const DIRECTIONS: &[&str] = &["isotropic", "xx", "yy", "zz", "xy", "yz", "xz"];

const REAL_IMAG_KEYWORDS: &[&str] = &["Re", "Im", "real", "imag", "imaginary"];

const DEFAULT_IMAGE: &str = "dielectric_function.png";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Isotropic,
    Xx,
    Yy,
    Zz,
    Xy,
    Yz,
    Xz,
}

impl Direction {
    /// Reversed spellings normalize into the fixed set, which keeps
    /// direction extraction symmetric by construction.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "isotropic"  => Some(Direction::Isotropic),
            "xx"         => Some(Direction::Xx),
            "yy"         => Some(Direction::Yy),
            "zz"         => Some(Direction::Zz),
            "xy" | "yx"  => Some(Direction::Xy),
            "yz" | "zy"  => Some(Direction::Yz),
            "xz" | "zx"  => Some(Direction::Xz),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Isotropic => "isotropic",
            Direction::Xx        => "xx",
            Direction::Yy        => "yy",
            Direction::Zz        => "zz",
            Direction::Xy        => "xy",
            Direction::Yz        => "yz",
            Direction::Xz        => "xz",
        }
    }

    fn indices(&self) -> Option<(usize, usize)> {
        match self {
            Direction::Isotropic => None,
            Direction::Xx        => Some((0, 0)),
            Direction::Yy        => Some((1, 1)),
            Direction::Zz        => Some((2, 2)),
            Direction::Xy        => Some((0, 1)),
            Direction::Yz        => Some((1, 2)),
            Direction::Xz        => Some((0, 2)),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealImag {
    Re,
    Im,
}

impl RealImag {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "re" | "real"                => Some(RealImag::Re),
            "im" | "imag" | "imaginary"  => Some(RealImag::Im),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RealImag::Re => "Re",
            RealImag::Im => "Im",
        }
    }
}


/// Trace/3 of the 3x3 tensor at every energy.
pub fn isotropic(tensor: &Cube<c64>) -> Vector<c64> {
    let nenergies = tensor.dim().2;
    Vector::from_shape_fn(nenergies, |e| {
        (tensor[(0, 0, e)] + tensor[(1, 1, e)] + tensor[(2, 2, e)]) / 3.0
    })
}

/// Symmetrized tensor entry at every energy, `get_direction(t, xy)` equals
/// `get_direction(t, yx)` since both average the two off-diagonal entries.
pub fn get_direction(tensor: &Cube<c64>, direction: Direction) -> Vector<c64> {
    match direction.indices() {
        None => isotropic(tensor),
        Some((i, j)) => {
            let nenergies = tensor.dim().2;
            Vector::from_shape_fn(nenergies, |e| {
                (tensor[(i, j, e)] + tensor[(j, i, e)]) * 0.5
            })
        },
    }
}


/// Frequency dependent dielectric function accessor. The raw tensors carry
/// a trailing (re, im) axis which is folded into complex values here.
pub struct DielectricFunction {
    energies   : Vector<f64>,
    components : Vec<(String, Cube<c64>)>,
}

pub struct DielectricDict {
    pub energies   : Vector<f64>,
    pub components : IndexMap<String, Cube<c64>>,
}


impl DielectricFunction {
    pub fn from_raw(raw: RawDielectricFunction) -> Self {
        let RawDielectricFunction { energies, density_density, current_current, ion } = raw;

        let mut components = Vec::new();
        if let Some(tensor) = density_density {
            components.push(("density".to_string(), to_complex(&tensor)));
        }
        if let Some(tensor) = current_current {
            components.push(("current".to_string(), to_complex(&tensor)));
        }
        if let Some(tensor) = ion {
            components.push(("ion".to_string(), to_complex(&tensor)));
        }

        Self { energies, components }
    }

    pub fn energies(&self) -> &Vector<f64> {
        &self.energies
    }

    /// Energies plus the available complex tensors, keyed by their full
    /// dataset names.
    pub fn to_dict(&self) -> DielectricDict {
        let components = self.components.iter()
            .map(|(name, tensor)| (full_name(name).to_string(), tensor.clone()))
            .collect::<IndexMap<String, Cube<c64>>>();

        DielectricDict {
            energies: self.energies.clone(),
            components,
        }
    }

    /// Expand a selection string into (component, Re/Im, direction) triples.
    ///
    /// Every category left out of a path falls back to its default:
    /// component -> every available component, real/imag -> both (Re first),
    /// direction -> isotropic.
    pub fn resolve_selection(&self, selection: Option<&str>) -> Result<Vec<(usize, RealImag, Direction)>> {
        let tree = selection::parse(selection.unwrap_or(""))?;
        let paths = selection::paths(&tree);

        let mut triples = Vec::new();
        if paths.is_empty() {
            self.expand(None, None, None, &mut triples);
            return Ok(triples);
        }

        for path in paths {
            let mut component: Option<(usize,    &str)> = None;
            let mut real_imag: Option<(RealImag, &str)> = None;
            let mut direction: Option<(Direction, &str)> = None;

            for token in path {
                if let Some(index) = self.components.iter().position(|(name, _)| name == token) {
                    set_unique(&mut component, index, token)?;
                } else if let Some(part) = RealImag::from_token(token) {
                    set_unique(&mut real_imag, part, token)?;
                } else if let Some(dir) = Direction::from_token(token) {
                    set_unique(&mut direction, dir, token)?;
                } else {
                    return Err(RefinementError::UnknownToken {
                        token: token.to_string(),
                        available: self.available_tokens(),
                    }.into());
                }
            }

            self.expand(component.map(|(c, _)| c),
                        real_imag.map(|(r, _)| r),
                        direction.map(|(d, _)| d),
                        &mut triples);
        }

        Ok(triples)
    }

    /// Graph with one series per resolved triple, in resolution order.
    pub fn plot(&self, selection: Option<&str>) -> Result<Graph> {
        let triples = self.resolve_selection(selection)?;

        let mut series = Vec::with_capacity(triples.len());
        for (component, real_imag, direction) in triples {
            let (name, tensor) = &self.components[component];
            let values = get_direction(tensor, direction);
            let y = match real_imag {
                RealImag::Re => values.mapv(|v| v.re),
                RealImag::Im => values.mapv(|v| v.im),
            };
            series.push(Series {
                x: self.energies.clone(),
                y,
                name: series_name(name, real_imag, direction),
            });
        }

        Ok(Graph {
            series,
            xlabel: "Energy (eV)".to_string(),
            ylabel: "dielectric function ϵ".to_string(),
            title: None,
        })
    }

    pub fn to_plotly(&self, selection: Option<&str>) -> Result<plotly::Plot> {
        Ok(self.plot(selection)?.to_plotly())
    }

    /// Write a static image, `dielectric_function.png` when no file name is
    /// given. Returns the path actually written.
    pub fn to_image(&self, selection: Option<&str>, filename: Option<&Path>) -> Result<PathBuf> {
        let path = filename
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE));
        self.plot(selection)?.write_image(&path)?;
        Ok(path)
    }

    fn expand(&self,
              component: Option<usize>,
              real_imag: Option<RealImag>,
              direction: Option<Direction>,
              out: &mut Vec<(usize, RealImag, Direction)>) {
        let components = match component {
            Some(c) => vec![c],
            None => (0 .. self.components.len()).collect(),
        };
        let real_imags = match real_imag {
            Some(r) => vec![r],
            None => vec![RealImag::Re, RealImag::Im],
        };
        let direction = direction.unwrap_or(Direction::Isotropic);

        for (c, r) in iproduct!(components, real_imags) {
            out.push((c, r, direction));
        }
    }

    fn available_tokens(&self) -> String {
        self.components.iter()
            .map(|(name, _)| name.as_str())
            .chain(REAL_IMAG_KEYWORDS.iter().copied())
            .chain(DIRECTIONS.iter().copied())
            .join(", ")
    }
}

impl fmt::Display for DielectricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.energies.first().copied().unwrap_or(0.0);
        let last  = self.energies.last().copied().unwrap_or(0.0);
        writeln!(f, "dielectric function:")?;
        writeln!(f, "    energies: [{:.2}, {:.2}] {} points", first, last, self.energies.len())?;
        writeln!(f, "    components: {}", self.components.iter().map(|(name, _)| name.as_str()).join(", "))?;
        write!(f, "    directions: {}", DIRECTIONS.join(", "))
    }
}


fn to_complex(tensor: &Array4<f64>) -> Cube<c64> {
    let shape = tensor.dim();
    Cube::from_shape_fn((shape.0, shape.1, shape.2), |(i, j, e)| {
        c64::new(tensor[(i, j, e, 0)], tensor[(i, j, e, 1)])
    })
}

fn full_name(short: &str) -> &str {
    match short {
        "density" => "density_density",
        "current" => "current_current",
        other => other,
    }
}

fn series_name(component: &str, real_imag: RealImag, direction: Direction) -> String {
    match direction {
        Direction::Isotropic => format!("{},{}", real_imag.label(), component),
        _ => format!("{},{},{}", real_imag.label(), component, direction.label()),
    }
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
    fn test_direction_tokens() {
        assert_eq!(Direction::from_token("yx"), Some(Direction::Xy));
        assert_eq!(Direction::from_token("zy"), Some(Direction::Yz));
        assert_eq!(Direction::from_token("zx"), Some(Direction::Xz));
        assert_eq!(Direction::from_token("isotropic"), Some(Direction::Isotropic));
        assert_eq!(Direction::from_token("xw"), None);
        // direction labels match exactly, no case folding
        assert_eq!(Direction::from_token("XX"), None);
    }

    #[test]
    fn test_real_imag_tokens() {
        for token in ["Re", "re", "RE", "real", "Real"] {
            assert_eq!(RealImag::from_token(token), Some(RealImag::Re));
        }
        for token in ["Im", "im", "imag", "imaginary", "IMAGINARY"] {
            assert_eq!(RealImag::from_token(token), Some(RealImag::Im));
        }
        assert_eq!(RealImag::from_token("rel"), None);
    }

    #[test]
    fn test_series_name() {
        assert_eq!(series_name("density", RealImag::Re, Direction::Isotropic), "Re,density");
        assert_eq!(series_name("current", RealImag::Im, Direction::Xy), "Im,current,xy");
    }
}
