use std::path::PathBuf;

const DEFAULT_BANKS_TO_SHOW: usize = 4;
const USAGE: &str = "<rom_path> [--boot <boot_rom>] [--save <save_file>] [--banks <n>]";

/// Command-line settings for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rom_path: PathBuf,
    pub boot_rom_path: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub banks_to_show: usize,
}

impl Config {
    /// Parses arguments, excluding the program name.
    pub fn from_args<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut rom_path = None;
        let mut boot_rom_path = None;
        let mut save_path = None;
        let mut banks_to_show = DEFAULT_BANKS_TO_SHOW;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--boot" => boot_rom_path = Some(PathBuf::from(value_for(&mut args, "--boot")?)),
                "--save" => save_path = Some(PathBuf::from(value_for(&mut args, "--save")?)),
                "--banks" => {
                    let raw = value_for(&mut args, "--banks")?;
                    banks_to_show = raw
                        .parse()
                        .map_err(|e| format!("Invalid --banks value '{}': {}", raw, e))?;
                }
                flag if flag.starts_with("--") => {
                    return Err(format!("Unknown option '{}'. Usage: {}", flag, USAGE));
                }
                path => {
                    if rom_path.is_some() {
                        return Err(format!("Unexpected argument '{}'. Usage: {}", path, USAGE));
                    }
                    rom_path = Some(PathBuf::from(path));
                }
            }
        }

        let rom_path = rom_path.ok_or_else(|| format!("Missing ROM path. Usage: {}", USAGE))?;
        Ok(Config {
            rom_path,
            boot_rom_path,
            save_path,
            banks_to_show,
        })
    }
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{} needs a value", flag))
}
