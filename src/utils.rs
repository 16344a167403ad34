use std::path::{Path, PathBuf};

use hifitime::{Unit, prelude::Epoch};
use itertools::Itertools;

/// 1-based day of year, in UTC
pub fn day_of_year(t: Epoch) -> u16 {
    let (year, month, day, _, _, _, _) = t.to_gregorian_utc();
    let jan1 = Epoch::from_gregorian_utc_at_midnight(year, 1, 1);
    let midnight = Epoch::from_gregorian_utc_at_midnight(year, month, day);
    (midnight - jan1).to_unit(Unit::Day).round() as u16 + 1
}

/// Remote file name, stripped of its gzip extension
pub fn local_filename(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    name.strip_suffix(".gz").unwrap_or(name)
}

/// Lists configuration files (.conf) contained in `directory`, sorted by name.
pub fn discover_configs<P: AsRef<Path>>(directory: P) -> std::io::Result<Vec<PathBuf>> {
    let mut configs = Vec::new();

    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "conf") {
            configs.push(path);
        }
    }

    Ok(configs.into_iter().sorted().collect())
}
