use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DIST_DIR: &str = "client/dist";
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

pub fn server_port() -> u16 {
    std::env::var("VDMA_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PORT)
}

/// Directory holding the built client bundle.
pub fn dist_dir() -> PathBuf {
    std::env::var("VDMA_DIST_DIR")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR))
}

pub fn bind_addr() -> IpAddr {
    std::env::var("VDMA_BIND_ADDR")
        .ok()
        .and_then(|value| value.trim().parse::<IpAddr>().ok())
        .unwrap_or(DEFAULT_BIND_ADDR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        temp_env::with_vars_unset(["VDMA_PORT", "VDMA_DIST_DIR", "VDMA_BIND_ADDR"], || {
            assert_eq!(server_port(), DEFAULT_PORT);
            assert_eq!(dist_dir(), PathBuf::from(DEFAULT_DIST_DIR));
            assert_eq!(bind_addr(), DEFAULT_BIND_ADDR);
        });
    }

    #[test]
    fn reads_valid_overrides() {
        temp_env::with_vars(
            [
                ("VDMA_PORT", Some("8080")),
                ("VDMA_DIST_DIR", Some("/srv/vdma")),
                ("VDMA_BIND_ADDR", Some("127.0.0.1")),
            ],
            || {
                assert_eq!(server_port(), 8080);
                assert_eq!(dist_dir(), PathBuf::from("/srv/vdma"));
                assert_eq!(bind_addr(), IpAddr::from([127, 0, 0, 1]));
            },
        );
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("VDMA_PORT", Some("not-a-port")),
                ("VDMA_DIST_DIR", Some("   ")),
                ("VDMA_BIND_ADDR", Some("localhost:9")),
            ],
            || {
                assert_eq!(server_port(), DEFAULT_PORT);
                assert_eq!(dist_dir(), PathBuf::from(DEFAULT_DIST_DIR));
                assert_eq!(bind_addr(), DEFAULT_BIND_ADDR);
            },
        );
        temp_env::with_var("VDMA_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_PORT);
        });
    }
}
