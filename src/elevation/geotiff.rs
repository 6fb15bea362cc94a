//! GeoTIFF DEM reader.
//!
//! Loads elevation rasters from GeoTIFF files using the pure Rust `tiff`
//! crate, so no system dependencies are required. The geotransform comes from the
//! ModelPixelScale (tag 33550) and ModelTiepoint (tag 33922) tags; sample
//! coordinates are pixel centers.

use std::fs::File;
use std::path::Path;

use log::info;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::grid::ElevationGrid;
use super::ElevationError;

/// Default no-data marker for DEMs without an explicit one.
const DEFAULT_NODATA: f64 = -9999.0;

/// Load an elevation grid from a GeoTIFF file.
///
/// Samples equal to the conventional -9999 no-data marker become NaN;
/// use [`read_dem_geotiff_with_nodata`] for rasters with a different
/// marker.
pub fn read_dem_geotiff(path: &Path) -> Result<ElevationGrid, ElevationError> {
    read_dem_geotiff_with_nodata(path, DEFAULT_NODATA)
}

/// Load an elevation grid from a GeoTIFF file with an explicit no-data value.
pub fn read_dem_geotiff_with_nodata(
    path: &Path,
    nodata: f64,
) -> Result<ElevationGrid, ElevationError> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;

    let (width, height) = decoder.dimensions()?;

    let pixel_scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let model_tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();

    let (scale, tiepoint) = match (pixel_scale, model_tiepoint) {
        (Some(scale), Some(tiepoint)) if scale.len() >= 2 && tiepoint.len() >= 6 => {
            (scale, tiepoint)
        }
        _ => {
            return Err(ElevationError::MissingGeotransform(format!(
                "{}: no ModelPixelScale/ModelTiepoint tags",
                path.display()
            )))
        }
    };

    // ModelTiepoint format: [I, J, K, X, Y, Z] anchoring pixel (I, J) at
    // world (X, Y); ModelPixelScale format: [ScaleX, ScaleY, ScaleZ].
    // Row 0 is the northern edge, so y decreases down the rows.
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    let (x_axis, y_axis) = pixel_center_axes(
        origin_x,
        origin_y,
        scale[0],
        scale[1],
        width as usize,
        height as usize,
    );

    let flat = decode_samples(decoder.read_image()?);

    let mut values = Vec::with_capacity(height as usize);
    for row in 0..height as usize {
        let start = row * width as usize;
        let row_values = flat[start..start + width as usize]
            .iter()
            .map(|&v| {
                if v.is_nan() || (v - nodata).abs() < 0.01 {
                    f64::NAN
                } else {
                    v
                }
            })
            .collect();
        values.push(row_values);
    }

    info!(
        "read {}x{} GeoTIFF DEM from {}",
        width,
        height,
        path.display()
    );
    ElevationGrid::new(x_axis, y_axis, values)
}

/// Pixel-center axes for a north-up geotransform.
///
/// The y axis comes out descending; [`ElevationGrid::new`] normalizes it.
fn pixel_center_axes(
    origin_x: f64,
    origin_y: f64,
    scale_x: f64,
    scale_y: f64,
    width: usize,
    height: usize,
) -> (Vec<f64>, Vec<f64>) {
    let x = (0..width)
        .map(|i| origin_x + (i as f64 + 0.5) * scale_x)
        .collect();
    let y = (0..height)
        .map(|j| origin_y - (j as f64 + 0.5) * scale_y)
        .collect();
    (x, y)
}

fn decode_samples(result: DecodingResult) -> Vec<f64> {
    match result {
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F64(data) => data,
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
    }
}
