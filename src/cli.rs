use std::sync::OnceLock;

use clap::{
    builder::styling::{
        AnsiColor,
        Effects,
        Styles,
    },
    Parser,
};
use enum_dispatch::enum_dispatch;

use crate::{
    commands::{
        dielectric::Dielectric,
        incar::Incar,
        kpts::Kpts,
        phdos::Phdos,
    },
    types::Result,
};


pub fn get_style() -> Styles {
    static INSTANCE: OnceLock<Styles> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Styles::styled()
            .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
            .usage(AnsiColor::Green.on_default()   | Effects::BOLD)
            .literal(AnsiColor::Green.on_default() | Effects::BOLD)
            .placeholder(AnsiColor::BrightBlue.on_default())
            .error(AnsiColor::BrightRed.on_default())
            .valid(AnsiColor::BrightYellow.on_default())
    }).to_owned()
}


#[enum_dispatch]
pub trait OptProcess {
    fn process(&self) -> Result<()>;
}


#[enum_dispatch(OptProcess)]
#[derive(Debug, Parser)]
#[command(name = "rspost",
            about = "A command-line tool to refine and plot the results stored in vaspout.h5.",
            version,
            author = "@Ionizing github.com/Ionizing/rspost",
            styles = get_style()
            )]
enum Opt {
    Dielectric,

    Phdos,

    Kpts,

    Incar,
}


pub fn run() -> Result<()> {
    Opt::parse().process()
}
