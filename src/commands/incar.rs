use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::{
    cli::OptProcess,
    control,
    types::Result,
};


#[derive(Debug, Args)]
/// Print the tags of an INCAR file as a dictionary.
pub struct Incar {
    #[arg(default_value = "./INCAR")]
    /// INCAR file name.
    incar: PathBuf,
}


impl OptProcess for Incar {
    fn process(&self) -> Result<()> {
        let incar = control::Incar::from_file(&self.incar);
        let tags = incar.to_dict()?;

        for (tag, value) in tags.iter() {
            println!(" {:>16} = {}", tag.bright_green(), value);
        }

        Ok(())
    }
}
