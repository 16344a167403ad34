use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use log::{debug, info};

use crate::{archive::FileKind, error::Error, runtime::Tool};

/// Products are reported on stderr, following these prefixes
const RINEX_OBS: &str = "->rinex obs : ";
const RINEX_NAV: &str = "->rinex nav : ";

/// Rover products of the format converter
#[derive(Debug, Clone, PartialEq)]
pub struct RoverFiles {
    pub obs: PathBuf,
    pub nav: PathBuf,
}

/// Retrieves product paths from the converter diagnostics
pub fn parse_products(diagnostics: &str) -> Result<RoverFiles, Error> {
    let product = |prefix: &str, kind: FileKind| {
        diagnostics
            .split(['\r', '\n'])
            .find_map(|line| {
                let offset = line.find(prefix)?;
                let path = line[offset + prefix.len()..].trim();
                if path.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(path))
                }
            })
            .ok_or(Error::ConverterOutput(kind))
    };

    Ok(RoverFiles {
        obs: product(RINEX_OBS, FileKind::Obs)?,
        nav: product(RINEX_NAV, FileKind::Nav)?,
    })
}

/// Converts a U-Blox capture to RINEX 3.04 (Observation and Navigation)
pub async fn convert(tool: &Tool, capture: &Path, timeout: Duration) -> Result<RoverFiles, Error> {
    let mut command = tool.command();

    command
        .args(["-v", "3.04", "-r", "ubx", "-od", "-os"])
        .arg(capture)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("{:?}", command);

    let output = command.spawn().map_err(|source| Error::EngineInvocation {
        program: tool.program.clone(),
        source,
    })?;

    let output = tokio::time::timeout(timeout, output.wait_with_output())
        .await
        .map_err(|_| Error::Timeout {
            task: format!("{} {}", tool.program, capture.display()),
            after: timeout,
        })??;

    let files = parse_products(&String::from_utf8_lossy(&output.stderr))?;

    for path in [&files.obs, &files.nav] {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(Error::MissingProduct(path.clone()));
        }
    }

    info!("rover observations: {}", files.obs.display());
    info!("rover navigation: {}", files.nav.display());

    Ok(files)
}

#[cfg(test)]
mod test {
    use super::{RoverFiles, convert, parse_products};
    use crate::{archive::FileKind, error::Error, runtime::Tool};
    use std::{
        path::{Path, PathBuf},
        time::Duration,
    };

    #[test]
    fn converter_diagnostics() {
        let stderr = "input file  : /data/rover.ubx (u-blox)
->rinex obs : /data/rover.obs
->rinex nav : /data/rover.nav
->sbas log  : /data/rover.sbs
\rscanning: 2023/07/10 10:58:12 O=3547 N=24";

        assert_eq!(
            parse_products(stderr).unwrap(),
            RoverFiles {
                obs: PathBuf::from("/data/rover.obs"),
                nav: PathBuf::from("/data/rover.nav"),
            }
        );
    }

    #[test]
    fn missing_navigation() {
        let stderr = "->rinex obs : /data/rover.obs\n";
        match parse_products(stderr) {
            Err(Error::ConverterOutput(kind)) => assert_eq!(kind, FileKind::Nav),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    /// Fake converter, interpreted by `sh`: products are announced next to the capture,
    /// but only created if the capture says so.
    #[cfg(unix)]
    const CONVERTER: &str = r#"
for arg in "$@"; do capture="$arg"; done
dir=$(dirname "$capture")
if grep -q SLEEP "$capture"; then
    sleep 30
fi
if grep -q PRODUCE "$capture"; then
    echo "OBSERVATION DATA" > "$dir/rover.obs"
    echo "NAVIGATION DATA" > "$dir/rover.nav"
fi
echo "->rinex obs : $dir/rover.obs" >&2
echo "->rinex nav : $dir/rover.nav" >&2
"#;

    #[cfg(unix)]
    fn fake_converter(dir: &Path) -> Tool {
        let script = dir.join("convbin.sh");
        std::fs::write(&script, CONVERTER).unwrap();

        Tool {
            program: "sh".to_string(),
            args: vec![script.to_string_lossy().to_string()],
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn converted_capture() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("rover.ubx");
        std::fs::write(&capture, "PRODUCE").unwrap();

        let files = convert(&fake_converter(dir.path()), &capture, Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(
            files,
            RoverFiles {
                obs: dir.path().join("rover.obs"),
                nav: dir.path().join("rover.nav"),
            }
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn announced_product_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("rover.ubx");
        std::fs::write(&capture, "nothing to convert").unwrap();

        match convert(&fake_converter(dir.path()), &capture, Duration::from_secs(30)).await {
            Err(Error::MissingProduct(path)) => assert_eq!(path, dir.path().join("rover.obs")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn converter_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("rover.ubx");
        std::fs::write(&capture, "SLEEP").unwrap();

        match convert(&fake_converter(dir.path()), &capture, Duration::from_millis(300)).await {
            Err(Error::Timeout { after, .. }) => assert_eq!(after, Duration::from_millis(300)),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
