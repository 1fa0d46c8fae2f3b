use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    cli::OptProcess,
    commands::common::{
        open_store,
        write_array_to_txt,
    },
    refine::phonon_dos::PhononDos,
    types::Result,
};


#[derive(Debug, Args)]
/// Plot the phonon density of states.
///
/// The selection picks partial DOS curves by element symbol, 1-based atom
/// index (or low:high range) and direction x/y/z, e.g. "Sr(x) 3 1:2(z)".
/// The total DOS is always plotted.
pub struct Phdos {
    #[arg(short = 'f', long)]
    /// vaspout.h5 file name. The configured default location is used when omitted.
    vaspout: Option<PathBuf>,

    #[arg(short, long)]
    /// Partial DOS selection, e.g. "Sr(x,y) O".
    select: Option<String>,

    #[arg(long, default_value = "phonon_dos.txt")]
    /// Specify the file name to be written with raw plot data.
    txtout: PathBuf,

    #[arg(long, default_value = "phonon_dos.html")]
    /// Specify the file name to be written with html plot.
    htmlout: PathBuf,

    #[arg(long)]
    /// Also write a static image, format deduced from the extension
    /// (png/jpg/webp/svg/pdf/eps).
    imgout: Option<PathBuf>,

    #[arg(long)]
    /// Render the plot and print the rendered code to stdout.
    to_inline_html: bool,

    #[arg(long)]
    /// Open the browser and show the plot immediately.
    show: bool,
}


impl OptProcess for Phdos {
    fn process(&self) -> Result<()> {
        let store = open_store(self.vaspout.as_deref())?;
        let phdos = PhononDos::from_raw(store.phonon_dos()?);
        println!("{}", phdos);

        let graph = phdos.plot(self.select.as_deref())?;

        let header = std::iter::once("omega(THz)".to_string())
            .chain(graph.series.iter().map(|s| s.name.clone()))
            .collect::<Vec<String>>()
            .join(" ");
        let columns = std::iter::once(phdos.energies())
            .chain(graph.series.iter().map(|s| &s.y))
            .collect::<Vec<_>>();

        info!("Writing raw data to {:?}", self.txtout);
        write_array_to_txt(&self.txtout, columns, &header)?;

        info!("Writing plot to {:?}", self.htmlout);
        graph.write_html(&self.htmlout);

        if let Some(imgout) = self.imgout.as_ref() {
            info!("Writing image to {:?}", imgout);
            graph.write_image(imgout)?;
        }

        if self.show {
            graph.show();
        }

        if self.to_inline_html {
            info!("Printing inline html to stdout ...");
            println!("{}", graph.to_inline_html());
        }

        Ok(())
    }
}
