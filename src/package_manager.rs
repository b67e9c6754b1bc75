//! 包管理器探测：
//! 1. 显式指定（`--package-manager` / `GALAXY_PACKAGE_MANAGER`）
//! 2. 目录中的锁文件
//! 3. 已安装的可执行文件（bun > pnpm > yarn）
//! 4. 回退到 npm

use std::{fmt, path::Path, process::Command};

use clap::ValueEnum;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s.trim(), true).ok()
    }

    pub(crate) fn install_command(self) -> String {
        format!("{} install", self.as_str())
    }

    pub(crate) fn dev_command(self) -> String {
        match self {
            PackageManager::Bun => "bun dev".to_string(),
            pm => format!("{} run dev", pm.as_str()),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 锁文件与对应包管理器（按优先级）
const LOCKFILES: [(&str, PackageManager); 4] = [
    ("bun.lockb", PackageManager::Bun),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("package-lock.json", PackageManager::Npm),
];

/// 按优先级探测的可执行文件
const FALLBACKS: [PackageManager; 3] = [PackageManager::Bun, PackageManager::Pnpm, PackageManager::Yarn];

/// 判断某个可执行文件是否可用
pub(crate) trait BinaryLookup {
    fn available(&self, program: &str) -> bool;
}

/// 通过运行 `<bin> --version` 判断
pub(crate) struct PathLookup;

impl BinaryLookup for PathLookup {
    fn available(&self, program: &str) -> bool {
        Command::new(program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

pub(crate) fn detect(
    preferred: Option<PackageManager>,
    dir: &Path,
    lookup: &dyn BinaryLookup,
) -> PackageManager {
    if let Some(pm) = preferred {
        debug!(pm = %pm, "package manager given explicitly");
        return pm;
    }
    for (lockfile, pm) in LOCKFILES {
        if dir.join(lockfile).is_file() {
            debug!(pm = %pm, lockfile, "package manager from lockfile");
            return pm;
        }
    }
    for pm in FALLBACKS {
        if lookup.available(pm.as_str()) {
            debug!(pm = %pm, "package manager found on PATH");
            return pm;
        }
    }
    debug!("falling back to npm");
    PackageManager::Npm
}
