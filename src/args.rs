use anyhow::{bail, Context, Result};

use crate::config::{parse_opacity, Geometry, WindowConfig, WID_PLACEHOLDER};

pub const NAME: &str = "xwinwrap";

#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub config: WindowConfig,
    pub placeholder: String,
    pub daemonize: bool,
    pub debug: bool,
    pub help: bool,
    pub command: Vec<String>,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            config: WindowConfig::default(),
            placeholder: WID_PLACEHOLDER.to_string(),
            daemonize: false,
            debug: false,
            help: false,
            command: Vec::new(),
        }
    }
}

pub fn usage() -> String {
    format!(
        "Usage: {name} [-g {{w}}x{{h}}+{{x}}+{{y}}] [-ni] [-argb] [-fdt] [-fs] [-s] [-st] [-sp] [-a] [-d] \
[-b] [-nf] [-o OPACITY] [-sh SHAPE] [-ov] -- COMMAND ARG1 ...
Options:
    -g      - Specify Geometry (w=width, h=height, x=x-coord, y=y-coord. ex: -g 640x480+100+100)
    -ni     - Ignore Input
    -argb   - RGB
    -fdt    - force WID window a desktop type window
    -sub    - Set WID placeholder (default is {placeholder})
    -fs     - Full Screen
    -un     - Undecorated
    -s      - Sticky
    -st     - Skip Taskbar
    -sp     - Skip Pager
    -a      - Above
    -b      - Below
    -nf     - No Focus
    -o      - Opacity value between 0 to 1 (ex: -o 0.20)
    -sh     - Shape of window (choose between rectangle, circle or triangle. Default is rectangle)
    -ov     - Set override_redirect flag (For seamless desktop background integration in non-fullscreenmode)
    -d      - Daemonize
    -fa     - Force the child window to attach (no need to provide it with WID)
    -debug  - Enable debug messages",
        name = NAME,
        placeholder = WID_PLACEHOLDER
    )
}

fn value<'a, I: Iterator<Item = &'a String>>(args: &mut I, flag: &str) -> Result<&'a String> {
    match args.next() {
        Some(value) => Ok(value),
        None => bail!("Missing argument for {}", flag),
    }
}

/// Parses everything after the program name. The child command follows `--`.
pub fn parse(args: &[String]) -> Result<Invocation> {
    let mut inv = Invocation::default();
    let mut args = args.iter();
    while let Some(item) = args.next() {
        let flags = &mut inv.config.flags;
        match item.as_str() {
            "-a" => flags.above = true,
            "-b" => flags.below = true,
            "-d" => inv.daemonize = true,
            "-h" => inv.help = true,
            "-s" => flags.sticky = true,
            "-ni" => flags.no_input = true,
            "-fs" => flags.fullscreen = true,
            "-un" => flags.undecorated = true,
            "-st" => flags.skip_taskbar = true,
            "-sp" => flags.skip_pager = true,
            "-nf" => flags.no_focus = true,
            "-ov" => flags.override_redirect = true,
            "-fdt" => flags.desktop_type = true,
            "-argb" => flags.argb = true,
            "-debug" => inv.debug = true,
            "-fa" => flags.force_attach = true,
            "-g" => {
                let geom: Geometry = value(&mut args, "-g")?.parse()?;
                geom.apply(&mut inv.config.geometry);
            }
            "-o" => inv.config.opacity = parse_opacity(value(&mut args, "-o")?)?,
            "-sh" => {
                let shape = value(&mut args, "-sh")?;
                inv.config.shape = shape
                    .parse()
                    .with_context(|| format!("Invalid shape '{}'\n{}", shape, usage()))?;
            }
            "-sub" => inv.placeholder = value(&mut args, "-sub")?.clone(),
            "--" => {
                inv.command = args.by_ref().cloned().collect();
                break;
            }
            other => bail!("Invalid argument '{}'. use -h to get help.", other),
        }
    }
    Ok(inv)
}
