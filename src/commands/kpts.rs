use std::path::PathBuf;

use anyhow::ensure;
use clap::Args;
use colored::Colorize;
use log::{
    info,
    warn,
};

use crate::{
    cli::OptProcess,
    commands::common::{
        open_store,
        write_array_to_txt,
    },
    refine::kpoint::Kpoint,
    types::Result,
};


#[derive(Debug, Args)]
/// Summarize the k-point sampling of a calculation.
pub struct Kpts {
    #[arg(short = 'f', long)]
    /// vaspout.h5 file name. The configured default location is used when omitted.
    vaspout: Option<PathBuf>,

    #[arg(long)]
    /// Write the accumulated path distances to this file.
    txtout: Option<PathBuf>,

    #[arg(long, num_args(3), allow_negative_numbers = true)]
    /// Direct coordinates of the path start for the grid index lookup.
    start: Option<Vec<f64>>,

    #[arg(long, num_args(3), allow_negative_numbers = true)]
    /// Direct coordinates of the path finish for the grid index lookup.
    finish: Option<Vec<f64>>,

    #[arg(short, long)]
    /// List every k-point with its weight and label.
    list: bool,
}


impl OptProcess for Kpts {
    fn process(&self) -> Result<()> {
        let store = open_store(self.vaspout.as_deref())?;
        let kpoint = Kpoint::from_raw(store.kpoint()?);

        let mode = kpoint.mode()?;
        let labels = kpoint.labels()?;

        let mut summary = String::with_capacity(256);
        summary.push_str("------------------------------------------------\n");
        summary.push_str(&format!(" {:>16} : {}\n", "mode",
                                  mode.to_string().bright_yellow()));
        summary.push_str(&format!(" {:>16} : {}\n", "kpoints",
                                  format!("{}", kpoint.number_kpoints()).bright_cyan()));
        summary.push_str(&format!(" {:>16} : {}\n", "line length",
                                  format!("{}", kpoint.line_length()?).bright_cyan()));
        summary.push_str(&format!(" {:>16} : {}\n", "lines",
                                  format!("{}", kpoint.number_lines()?).bright_cyan()));
        if let Some(labels) = labels.as_ref() {
            let named = labels.iter().filter(|l| !l.is_empty()).count();
            summary.push_str(&format!(" {:>16} : {}\n", "labelled points",
                                      format!("{}", named).bright_cyan()));
        }
        summary.push_str("------------------------------------------------");
        println!("{}", summary);

        match (self.start.as_ref(), self.finish.as_ref()) {
            (Some(start), Some(finish)) => {
                ensure!(start.len() == 3 && finish.len() == 3,
                        "Both --start and --finish take exactly three coordinates.");
                let start  = [start[0],  start[1],  start[2]];
                let finish = [finish[0], finish[1], finish[2]];
                let indices = kpoint.path_indices(start, finish);
                println!(" indices on the path {:?} -> {:?} : {:?}", start, finish, indices);
            },
            (None, None) => {},
            _ => warn!("Both --start and --finish are needed for the path lookup, skipped."),
        }

        if self.list {
            let coordinates = kpoint.coordinates();
            let weights = kpoint.weights();
            for i in 0 .. kpoint.number_kpoints() {
                let label = labels.as_ref()
                    .map(|l| l[i].as_str())
                    .unwrap_or("");
                println!("{:6}  {:10.6} {:10.6} {:10.6}  {:10.6}  {}",
                         i,
                         coordinates[(i, 0)], coordinates[(i, 1)], coordinates[(i, 2)],
                         weights[i],
                         label);
            }
        }

        if let Some(txtout) = self.txtout.as_ref() {
            let distances = kpoint.distances()?;
            info!("Writing path distances to {:?}", txtout);
            write_array_to_txt(txtout, vec![&distances], "distance(1/A)")?;
        }

        Ok(())
    }
}
