//! Attribute projection: tree entry modes to POSIX stats.

use chrono::{DateTime, Utc};

use crate::provider::{MODE_DIR, MODE_LINK, MODE_MASK, MODE_REG, MODE_SUBMODULE};

/// A POSIX stat as projected by the filesystem core.
///
/// All four timestamps carry the tree time of the containing ref; synthetic
/// directories above ref level carry the wall clock at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub mode: u32,
    pub nlink: u32,
    pub size: u64,
    pub atime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    pub ctime: DateTime<Utc>,
    pub birthtime: DateTime<Utc>,
}

/// Project a tree entry mode onto a full POSIX stat.
///
/// Directories become `0755`, symlinks and submodules become links with
/// `0777`, and everything else is a regular file: `0644`, or `0755` when
/// the entry's executable bit is set.
pub(crate) fn stat_from_mode(mode: u32, size: u64, time: DateTime<Utc>) -> FileStat {
    let mode = match mode & MODE_MASK {
        MODE_DIR => MODE_DIR | 0o755,
        MODE_LINK | MODE_SUBMODULE => MODE_LINK | 0o777,
        _ => {
            if mode & 0o100 != 0 {
                MODE_REG | 0o755
            } else {
                MODE_REG | 0o644
            }
        }
    };
    FileStat {
        mode,
        nlink: 1,
        size,
        atime: time,
        mtime: time,
        ctime: time,
        birthtime: time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_600_000_000, 0).unwrap()
    }

    #[test]
    fn test_directory_mode() {
        let stat = stat_from_mode(MODE_DIR, 0, t0());
        assert_eq!(stat.mode, MODE_DIR | 0o755);
        assert_eq!(stat.nlink, 1);
    }

    #[test]
    fn test_symlink_and_submodule_modes() {
        let stat = stat_from_mode(MODE_LINK, 10, t0());
        assert_eq!(stat.mode, MODE_LINK | 0o777);

        let stat = stat_from_mode(MODE_SUBMODULE, 0, t0());
        assert_eq!(stat.mode, MODE_LINK | 0o777);
    }

    #[test]
    fn test_regular_file_modes() {
        let stat = stat_from_mode(MODE_REG | 0o644, 42, t0());
        assert_eq!(stat.mode, MODE_REG | 0o644);
        assert_eq!(stat.size, 42);

        let stat = stat_from_mode(MODE_REG | 0o755, 42, t0());
        assert_eq!(stat.mode, MODE_REG | 0o755);
    }

    #[test]
    fn test_timestamps_all_equal() {
        let stat = stat_from_mode(MODE_REG | 0o644, 0, t0());
        assert_eq!(stat.atime, t0());
        assert_eq!(stat.mtime, t0());
        assert_eq!(stat.ctime, t0());
        assert_eq!(stat.birthtime, t0());
    }
}
