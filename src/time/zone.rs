//! Time zone resolution.

use anyhow::Result;
use chrono_tz::Tz;
use std::path::Path;

/// Parse an IANA zone name, or fall back to the system zone when none is given.
pub fn resolve_timezone(name: Option<&str>) -> Result<Tz> {
    match name {
        Some(name) => parse_timezone(name),
        None => Ok(system_timezone()),
    }
}

/// Parse an IANA zone name such as `America/Los_Angeles`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim().parse::<Tz>().map_err(|_| {
        anyhow::anyhow!("Unknown time zone '{name}'. Use an IANA name such as 'Europe/Berlin'")
    })
}

/// The system's zone: `$TZ`, then `/etc/timezone`, then the `/etc/localtime` link target.
///
/// Falls back to UTC with a warning when none of them names a known zone. A `/etc/localtime`
/// that is a copied zone file rather than a symlink carries no name, so such setups without
/// `TZ` or `/etc/timezone` end up on UTC.
pub fn system_timezone() -> Tz {
    let candidates = [
        std::env::var("TZ").ok(),
        std::fs::read_to_string("/etc/timezone").ok(),
        localtime_link_target(Path::new("/etc/localtime")),
    ];

    for candidate in candidates.into_iter().flatten() {
        let name = candidate.trim().trim_start_matches(':');
        if let Ok(tz) = name.parse::<Tz>() {
            return tz;
        }
    }

    log_warning!("Could not determine the system time zone, using UTC");
    Tz::UTC
}

/// Zone name from a symlink such as `/etc/localtime -> /usr/share/zoneinfo/Europe/Berlin`.
fn localtime_link_target(link: &Path) -> Option<String> {
    let target = std::fs::read_link(link).ok()?;
    zone_name_from_path(&target)
}

fn zone_name_from_path(path: &Path) -> Option<String> {
    let path = path.to_str()?;
    let (_, name) = path.split_once("zoneinfo/")?;
    Some(name.trim_start_matches("posix/").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(
            parse_timezone("America/Los_Angeles").unwrap(),
            chrono_tz::America::Los_Angeles
        );
        assert_eq!(parse_timezone(" UTC ").unwrap(), Tz::UTC);
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_zone_name_from_link_target() {
        assert_eq!(
            zone_name_from_path(Path::new("/usr/share/zoneinfo/Europe/Berlin")),
            Some("Europe/Berlin".to_string())
        );
        assert_eq!(
            zone_name_from_path(Path::new("../usr/share/zoneinfo/posix/Asia/Tokyo")),
            Some("Asia/Tokyo".to_string())
        );
        assert_eq!(zone_name_from_path(Path::new("/etc/localtime.bak")), None);
    }

    /// Test that a regular file in place of the localtime link yields no zone name
    #[test]
    fn test_copied_localtime_file_has_no_zone_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let localtime = temp_dir.path().join("localtime");
        std::fs::write(&localtime, b"TZif2").unwrap();

        assert_eq!(localtime_link_target(&localtime), None);
    }

    #[test]
    #[serial]
    fn test_system_timezone_prefers_tz_variable() {
        let original = std::env::var("TZ").ok();
        unsafe {
            std::env::set_var("TZ", ":Pacific/Auckland");
        }

        assert_eq!(system_timezone(), chrono_tz::Pacific::Auckland);
        assert_eq!(
            resolve_timezone(None).unwrap(),
            chrono_tz::Pacific::Auckland
        );

        unsafe {
            match original {
                Some(value) => std::env::set_var("TZ", value),
                None => std::env::remove_var("TZ"),
            }
        }
    }
}
