use std::fmt;

use anyhow::ensure;
use ndarray::{
    arr2,
    ArrayView1,
    Axis,
};

use crate::{
    raw::{
        RawCell,
        RawKpoints,
    },
    types::{
        Matrix,
        RefinementError,
        Result,
        Vector,
    },
};


/// Tolerance used when matching grid points against a path segment.
const GRID_TOL: f64 = 1e-8;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpointMode {
    Automatic,
    GeneratingLattice,
    Explicit,
    Gamma,
    Line,
    Monkhorst,
}

impl fmt::Display for KpointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KpointMode::Automatic         => "automatic",
            KpointMode::GeneratingLattice => "generating lattice",
            KpointMode::Explicit          => "explicit",
            KpointMode::Gamma             => "gamma",
            KpointMode::Line              => "line",
            KpointMode::Monkhorst         => "monkhorst",
        };
        f.write_str(name)
    }
}


/// K-point grid or path accessor over the raw records.
pub struct Kpoint {
    raw: RawKpoints,
}

/// Flattened view of the k-point data. `labels` is absent when neither
/// stored nor synthesizable labels exist.
pub struct KpointDict {
    pub mode        : KpointMode,
    pub line_length : usize,
    pub coordinates : Matrix<f64>,
    pub weights     : Vector<f64>,
    pub labels      : Option<Vec<String>>,
}


impl Kpoint {
    pub fn from_raw(raw: RawKpoints) -> Self {
        Self { raw }
    }

    /// Mode stored in the raw data. Only the first non-blank character
    /// counts, case-insensitive.
    pub fn mode(&self) -> Result<KpointMode> {
        let first = self.raw.mode.trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase());

        match first {
            Some('a') => Ok(KpointMode::Automatic),
            Some('b') => Ok(KpointMode::GeneratingLattice),
            Some('e') => Ok(KpointMode::Explicit),
            Some('g') => Ok(KpointMode::Gamma),
            Some('l') => Ok(KpointMode::Line),
            Some('m') => Ok(KpointMode::Monkhorst),
            _ => Err(RefinementError::UnknownKpointMode(self.raw.mode.clone()).into()),
        }
    }

    pub fn number_kpoints(&self) -> usize {
        self.raw.coordinates.nrows()
    }

    /// K-points per line in line mode, the total number of k-points
    /// otherwise.
    pub fn line_length(&self) -> Result<usize> {
        if self.mode()? == KpointMode::Line && self.raw.number > 0 {
            Ok(self.raw.number)
        } else {
            Ok(self.number_kpoints())
        }
    }

    pub fn number_lines(&self) -> Result<usize> {
        Ok(self.number_kpoints() / self.line_length()?)
    }

    pub fn coordinates(&self) -> &Matrix<f64> {
        &self.raw.coordinates
    }

    pub fn weights(&self) -> &Vector<f64> {
        &self.raw.weights
    }

    /// Cumulative arc length along every line segment, in cartesian
    /// coordinates. Each segment starts at the endpoint value of the
    /// previous one, so the whole path stays monotonically non-decreasing.
    pub fn distances(&self) -> Result<Vector<f64>> {
        let cartesian = self.cartesian_coordinates()?;
        let nkpoints = cartesian.nrows();
        let line = self.line_length()?.max(1);

        let mut distances = Vector::<f64>::zeros(nkpoints);
        let mut previous = 0.0;
        let mut iseg = 0usize;
        while iseg < nkpoints {
            let end = (iseg + line).min(nkpoints);
            distances[iseg] = previous;
            for i in iseg + 1 .. end {
                let step = (&cartesian.row(i) - &cartesian.row(i - 1))
                    .mapv(|x| x * x)
                    .sum()
                    .sqrt();
                distances[i] = distances[i - 1] + step;
            }
            previous = distances[end - 1];
            iseg = end;
        }

        Ok(distances)
    }

    /// Indices of the grid points lying on the segment start -> finish, in
    /// direct coordinates.
    pub fn path_indices(&self, start: [f64; 3], finish: [f64; 3]) -> Vec<usize> {
        let direction = [
            finish[0] - start[0],
            finish[1] - start[1],
            finish[2] - start[2],
        ];
        let norm2 = direction.iter().map(|d| d * d).sum::<f64>();

        self.raw.coordinates.axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, point)| {
                let offset = [
                    point[0] - start[0],
                    point[1] - start[1],
                    point[2] - start[2],
                ];
                if norm2 < GRID_TOL {
                    return offset.iter().map(|v| v * v).sum::<f64>().sqrt() < GRID_TOL;
                }
                let t = (offset[0] * direction[0]
                       + offset[1] * direction[1]
                       + offset[2] * direction[2]) / norm2;
                if t < -GRID_TOL || t > 1.0 + GRID_TOL {
                    return false;
                }
                let deviation = offset.iter().zip(direction.iter())
                    .map(|(o, d)| {
                        let r = o - t * d;
                        r * r
                    })
                    .sum::<f64>()
                    .sqrt();
                deviation < GRID_TOL
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Per-point labels. Stored labels win; in line mode without stored
    /// labels the segment boundaries are labelled with their coordinates.
    pub fn labels(&self) -> Result<Option<Vec<String>>> {
        if let (Some(labels), Some(indices)) = (&self.raw.labels, &self.raw.label_indices) {
            Ok(Some(self.stored_labels(labels, indices)?))
        } else if self.mode()? == KpointMode::Line {
            Ok(Some(self.synthesized_labels()?))
        } else {
            Ok(None)
        }
    }

    pub fn to_dict(&self) -> Result<KpointDict> {
        Ok(KpointDict {
            mode:        self.mode()?,
            line_length: self.line_length()?,
            coordinates: self.raw.coordinates.clone(),
            weights:     self.raw.weights.clone(),
            labels:      self.labels()?,
        })
    }

    fn cartesian_coordinates(&self) -> Result<Matrix<f64>> {
        let inverse = inverted_lattice(&self.raw.cell)?;
        Ok(self.raw.coordinates.dot(&inverse.t()))
    }

    fn stored_labels(&self, labels: &[String], indices: &[usize]) -> Result<Vec<String>> {
        let mut out = vec![String::new(); self.number_kpoints()];
        let line = self.line_length()?.max(1);
        let line_mode = self.mode()? == KpointMode::Line;

        for (label, &stored) in labels.iter().zip(indices.iter()) {
            ensure!(stored >= 1, "Label indices count from 1, got {}", stored);
            // in line mode the stored indices enumerate the segment endpoints
            let index = if line_mode {
                line * ((stored - 1) / 2) + ((stored - 1) % 2) * (line - 1)
            } else {
                stored - 1
            };
            ensure!(index < out.len(),
                    "Label index {} outside of the {} k-points", stored, out.len());
            out[index] = label.clone();
        }

        Ok(out)
    }

    fn synthesized_labels(&self) -> Result<Vec<String>> {
        let nkpoints = self.number_kpoints();
        let line = self.line_length()?.max(1);
        let mut out = vec![String::new(); nkpoints];

        let mut iseg = 0usize;
        while iseg < nkpoints {
            let end = (iseg + line).min(nkpoints);
            out[iseg] = coordinate_label(self.raw.coordinates.row(iseg));
            out[end - 1] = coordinate_label(self.raw.coordinates.row(end - 1));
            iseg = end;
        }

        Ok(out)
    }
}


fn inverted_lattice(cell: &RawCell) -> Result<Matrix<f64>> {
    let l = cell.lattice_vectors.mapv(|v| v * cell.scale);
    ensure!(l.dim() == (3, 3),
            "Lattice vectors must form a 3x3 matrix, got {:?}", l.dim());

    let (a, b, c) = (l[(0, 0)], l[(0, 1)], l[(0, 2)]);
    let (d, e, f) = (l[(1, 0)], l[(1, 1)], l[(1, 2)]);
    let (g, h, i) = (l[(2, 0)], l[(2, 1)], l[(2, 2)]);

    let det = a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g);
    ensure!(det.abs() > f64::EPSILON, "Lattice vectors are singular");

    let inverse = arr2(&[
        [e * i - f * h, c * h - b * i, b * f - c * e],
        [f * g - d * i, a * i - c * g, c * d - a * f],
        [d * h - e * g, b * g - a * h, a * e - b * d],
    ]) / det;

    Ok(inverse)
}


fn coordinate_label(coordinate: ArrayView1<f64>) -> String {
    let parts = coordinate.iter()
        .map(|&x| fraction(x))
        .collect::<Vec<String>>()
        .join(" ");
    format!("$[{}]$", parts)
}

/// Closest fraction with denominator up to 100, rendered as LaTeX.
fn fraction(x: f64) -> String {
    let mut numerator = x.round() as i64;
    let mut denominator = 1i64;
    let mut error = (x - numerator as f64).abs();
    for d in 2 ..= 100i64 {
        let n = (x * d as f64).round() as i64;
        let e = (x - n as f64 / d as f64).abs();
        if e + 1e-12 < error {
            numerator = n;
            denominator = d;
            error = e;
        }
    }

    let common = gcd(numerator.abs().max(1), denominator);
    let (numerator, denominator) = (numerator / common, denominator / common);
    if denominator == 1 {
        format!("{}", numerator)
    } else {
        format!(r"\frac{{{}}}{{{}}}", numerator, denominator)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(fraction(0.0),    "0");
        assert_eq!(fraction(1.0),    "1");
        assert_eq!(fraction(0.5),    r"\frac{1}{2}");
        assert_eq!(fraction(-0.5),   r"\frac{-1}{2}");
        assert_eq!(fraction(0.25),   r"\frac{1}{4}");
        assert_eq!(fraction(1.0 / 3.0), r"\frac{1}{3}");
        assert_eq!(fraction(0.375),  r"\frac{3}{8}");
    }

    #[test]
    fn test_inverted_lattice() {
        let cell = RawCell {
            scale: 2.0,
            lattice_vectors: arr2(&[
                [1.0, 0.0, 0.0],
                [0.0, 2.0, 0.0],
                [0.0, 0.0, 4.0],
            ]),
        };
        let inverse = inverted_lattice(&cell).unwrap();
        assert_eq!(inverse, arr2(&[
            [0.5, 0.0,  0.0],
            [0.0, 0.25, 0.0],
            [0.0, 0.0,  0.125],
        ]));

        let singular = RawCell {
            scale: 1.0,
            lattice_vectors: arr2(&[
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
            ]),
        };
        assert!(inverted_lattice(&singular).is_err());
    }
}
