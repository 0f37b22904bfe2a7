//! IO module for reading source layers and writing derived layers.
//!
//! Operations are organized by format type rather than domain.
//!
//! # Format Modules
//!
//! - `csv` - CSV attribute tables
//! - `parquet` - Parquet attribute tables (requires `parquet` feature)
//! - `shp` - Shapefile attribute tables (geometry is ignored)

mod csv;
mod shp;

#[cfg(feature = "parquet")]
mod parquet;

use std::path::Path;

use anyhow::{Result, bail};

use crate::store::Layer;

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFormat {
    Csv,
    Parquet,
    Shapefile,
}

impl LayerFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(LayerFormat::Csv),
            Some("parquet") => Ok(LayerFormat::Parquet),
            Some("shp") => Ok(LayerFormat::Shapefile),
            _ => bail!("[io] Unsupported layer format: {}", path.display()),
        }
    }
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("layer")
        .to_string()
}

/// Read a layer from a CSV, Parquet, or shapefile. Features are keyed by
/// `id_column` when given, otherwise by row number.
pub fn read_layer(path: &Path, id_column: Option<&str>) -> Result<Layer> {
    let df = match LayerFormat::from_path(path)? {
        LayerFormat::Csv => csv::read_csv(path, id_column)?,
        LayerFormat::Shapefile => shp::read_shapefile(path)?,
        #[cfg(feature = "parquet")]
        LayerFormat::Parquet => parquet::read_parquet(path)?,
        #[cfg(not(feature = "parquet"))]
        LayerFormat::Parquet => bail!("[io] Parquet support requires the `parquet` feature"),
    };

    Layer::from_dataframe(layer_name(path), df, id_column)
}

/// Read a layer from CSV text.
pub fn read_layer_csv_string(name: &str, csv: &str, id_column: Option<&str>) -> Result<Layer> {
    Layer::from_dataframe(name, csv::read_csv_string(csv, id_column)?, id_column)
}

/// Write a layer (ids, attributes and outputs) to a CSV or Parquet file.
pub fn write_layer(layer: &Layer, path: &Path) -> Result<()> {
    let mut df = layer.to_dataframe()?;
    match LayerFormat::from_path(path)? {
        LayerFormat::Csv => csv::write_csv(&mut df, path),
        #[cfg(feature = "parquet")]
        LayerFormat::Parquet => parquet::write_parquet(&mut df, path),
        #[cfg(not(feature = "parquet"))]
        LayerFormat::Parquet => bail!("[io] Parquet support requires the `parquet` feature"),
        LayerFormat::Shapefile => bail!("[io] Writing shapefiles is not supported: {}", path.display()),
    }
}

/// Write a layer to CSV text.
pub fn write_layer_csv_string(layer: &Layer) -> Result<String> {
    csv::write_csv_string(&mut layer.to_dataframe()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(LayerFormat::from_path(Path::new("a/b.CSV")).unwrap(), LayerFormat::Csv);
        assert_eq!(LayerFormat::from_path(Path::new("b.shp")).unwrap(), LayerFormat::Shapefile);
        assert_eq!(LayerFormat::from_path(Path::new("b.parquet")).unwrap(), LayerFormat::Parquet);
        assert!(LayerFormat::from_path(Path::new("b.gpkg")).is_err());
        assert!(LayerFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn csv_string_round_trip_keeps_ids() {
        let layer = read_layer_csv_string("sites", "code,slope\n01,1.5\n02,3\n", Some("code")).unwrap();
        let text = write_layer_csv_string(&layer).unwrap();
        assert!(text.starts_with("code,slope\n01,1.5\n"));
    }
}
