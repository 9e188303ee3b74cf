// crates/cm_mesh/src/io/mod.rs

//! 网格 IO 模块
//!
//! 提供各种网格格式的读写支持。
//!
//! - 原生 ASCII (.14 / .grd)
//! - 通用 ASCII 2dm (.2dm)
//! - DFlow netCDF (*_net.nc，需启用 `netcdf` feature)
//!
//! 格式集合是封闭的：未知格式在入口处报错，不做猜测降级。

pub mod adcirc;
pub mod dflow;
pub mod twodm;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use std::path::Path;

/// 支持的网格格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// 原生 ASCII 格式 (.14 / .grd)
    Adcirc,
    /// 通用 ASCII 2dm 格式 (.2dm)
    TwoDm,
    /// DFlow netCDF 格式 (*_net.nc)
    Dflow,
}

impl MeshFormat {
    /// 从文件名推断格式
    ///
    /// # Errors
    /// 无法识别的文件名返回 [`cm_foundation::CmError::UnsupportedFormat`]。
    pub fn from_path(path: &Path) -> MeshResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_lowercase();
        if name.ends_with("_net.nc") {
            return Ok(Self::Dflow);
        }
        match path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "14" | "grd" => Ok(Self::Adcirc),
            "2dm" => Ok(Self::TwoDm),
            other => Err(MeshError::Foundation(
                cm_foundation::CmError::unsupported_format(
                    other,
                    vec![
                        ".14/.grd".into(),
                        ".2dm".into(),
                        "*_net.nc".into(),
                    ],
                ),
            )),
        }
    }

    /// 格式名称
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Adcirc => "adcirc",
            Self::TwoDm => "2dm",
            Self::Dflow => "dflow",
        }
    }
}

/// 按格式读取文件内容到已清空的网格
pub(crate) fn read_into(mesh: &mut Mesh, path: &Path, format: MeshFormat) -> MeshResult<()> {
    match format {
        MeshFormat::Adcirc => adcirc::read_file(mesh, path),
        MeshFormat::TwoDm => twodm::read_file(mesh, path),
        MeshFormat::Dflow => dflow::read_file(mesh, path),
    }
}

/// 按格式写出网格
pub(crate) fn write_from(mesh: &Mesh, path: &Path, format: MeshFormat) -> MeshResult<()> {
    match format {
        MeshFormat::Adcirc => adcirc::write_file(mesh, path),
        MeshFormat::TwoDm => twodm::write_file(mesh, path),
        MeshFormat::Dflow => dflow::write_file(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inference() {
        assert_eq!(
            MeshFormat::from_path(Path::new("fort.14")).unwrap(),
            MeshFormat::Adcirc
        );
        assert_eq!(
            MeshFormat::from_path(Path::new("estuary.GRD")).unwrap(),
            MeshFormat::Adcirc
        );
        assert_eq!(
            MeshFormat::from_path(Path::new("mesh.2dm")).unwrap(),
            MeshFormat::TwoDm
        );
        assert_eq!(
            MeshFormat::from_path(Path::new("delta_net.nc")).unwrap(),
            MeshFormat::Dflow
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(MeshFormat::from_path(Path::new("mesh.msh")).is_err());
        assert!(MeshFormat::from_path(Path::new("plain.nc")).is_err());
    }
}
