//! GeoTIFF decoding for single-band elevation rasters.
//!
//! Only the first image is read. Georeferencing comes from the
//! ModelTiepoint + ModelPixelScale pair (PixelIsArea); the CRS comes from the
//! GeoKey directory. A GDAL_NODATA tag turns matching samples into `NaN`.

use std::io::Cursor;

use geo_common::{GeoError, GeoResult};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

/// GeoKey holding an EPSG projected CRS code.
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
/// GeoKey holding an EPSG geographic CRS code.
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
/// GeoKey value meaning "user-defined", which carries no EPSG code.
const USER_DEFINED: u16 = 32767;

/// Raw result of decoding a DEM source.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    /// Row-major samples, row 0 = north edge, no-data as `NaN`.
    pub raster: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// Embedded CRS, when the file carries one.
    pub crs_name: Option<String>,
    /// `[min_x, min_y, max_x, max_y]` in the embedded CRS.
    pub bounds: [f64; 4],
}

/// Decode a GeoTIFF held in memory.
pub fn decode_geotiff(bytes: &[u8]) -> GeoResult<DecodedRaster> {
    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e| GeoError::decode(format!("not a TIFF: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| GeoError::decode(format!("failed to read dimensions: {}", e)))?;
    let (width, height) = (width as usize, height as usize);

    let scale = read_f64_tag(&mut decoder, Tag::ModelPixelScaleTag)?;
    let tiepoint = read_f64_tag(&mut decoder, Tag::ModelTiepointTag)?;
    let bounds = match (scale, tiepoint) {
        (Some(scale), Some(tiepoint)) => extent_from_tiepoint(&tiepoint, &scale, width, height)?,
        _ => {
            return Err(GeoError::decode(
                "missing ModelTiepoint/ModelPixelScale georeferencing",
            ))
        }
    };

    let crs_name = match decoder.find_tag(Tag::GeoKeyDirectoryTag) {
        Ok(Some(value)) => value
            .into_u16_vec()
            .ok()
            .and_then(|keys| crs_from_geokeys(&keys)),
        Ok(None) => None,
        Err(e) => return Err(GeoError::decode(format!("bad GeoKey directory: {}", e))),
    };

    let nodata = match decoder.find_tag(Tag::GdalNodata) {
        Ok(Some(value)) => value
            .into_string()
            .ok()
            .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f32>().ok()),
        _ => None,
    };

    let image = decoder
        .read_image()
        .map_err(|e| GeoError::decode(format!("failed to read image data: {}", e)))?;
    let mut raster = samples_to_f32(image)?;

    // Multi-band files interleave samples; keep the first band.
    if raster.len() > width * height && raster.len() % (width * height) == 0 {
        let bands = raster.len() / (width * height);
        raster = raster.into_iter().step_by(bands).collect();
    }
    if raster.len() != width * height {
        return Err(GeoError::decode(format!(
            "decoded {} samples for a {}x{} image",
            raster.len(),
            width,
            height
        )));
    }

    if let Some(nodata) = nodata {
        for v in raster.iter_mut() {
            if *v == nodata {
                *v = f32::NAN;
            }
        }
    }

    debug!(
        width,
        height,
        crs = ?crs_name,
        nodata = ?nodata,
        extent = ?bounds,
        "Decoded GeoTIFF"
    );

    Ok(DecodedRaster {
        raster,
        width,
        height,
        crs_name,
        bounds,
    })
}

fn read_f64_tag(decoder: &mut Decoder<Cursor<&[u8]>>, tag: Tag) -> GeoResult<Option<Vec<f64>>> {
    match decoder.find_tag(tag) {
        Ok(Some(value)) => value
            .into_f64_vec()
            .map(Some)
            .map_err(|e| GeoError::decode(format!("bad {:?} tag: {}", tag, e))),
        Ok(None) => Ok(None),
        Err(e) => Err(GeoError::decode(format!("bad {:?} tag: {}", tag, e))),
    }
}

/// Compute `[min_x, min_y, max_x, max_y]` from a tiepoint `[I, J, K, X, Y, Z]`
/// and a pixel scale `[sx, sy, sz]`.
pub fn extent_from_tiepoint(
    tiepoint: &[f64],
    scale: &[f64],
    width: usize,
    height: usize,
) -> GeoResult<[f64; 4]> {
    if tiepoint.len() < 6 || scale.len() < 2 {
        return Err(GeoError::decode(format!(
            "tiepoint/scale too short: {} / {} values",
            tiepoint.len(),
            scale.len()
        )));
    }

    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let (sx, sy) = (scale[0], scale[1]);

    let min_x = x - i * sx;
    let max_y = y + j * sy;
    let max_x = min_x + width as f64 * sx;
    let min_y = max_y - height as f64 * sy;

    Ok([min_x, min_y, max_x, max_y])
}

/// Extract an `EPSG:<code>` name from a GeoKey directory.
///
/// The directory is a header of four shorts followed by
/// `[key_id, location, count, value]` entries. Projected codes win over
/// geographic ones.
pub fn crs_from_geokeys(keys: &[u16]) -> Option<String> {
    if keys.len() < 4 {
        return None;
    }
    let count = keys[3] as usize;

    let mut projected = None;
    let mut geographic = None;
    for entry in keys[4..].chunks_exact(4).take(count) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 || value == 0 || value == USER_DEFINED {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE_GEO_KEY => projected = Some(value),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(value),
            _ => {}
        }
    }

    projected.or(geographic).map(|code| format!("EPSG:{}", code))
}

fn samples_to_f32(image: DecodingResult) -> GeoResult<Vec<f32>> {
    let data = match image {
        DecodingResult::U8(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(d) => d.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(d) => d,
        DecodingResult::F64(d) => d.into_iter().map(|v| v as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err(GeoError::decode("unsupported sample format")),
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_from_tiepoint() {
        let tiepoint = [0.0, 0.0, 0.0, 350000.0, 5700000.0, 0.0];
        let scale = [10.0, 10.0, 0.0];
        let extent = extent_from_tiepoint(&tiepoint, &scale, 100, 50).unwrap();
        assert_eq!(extent, [350000.0, 5699500.0, 351000.0, 5700000.0]);
    }

    #[test]
    fn test_extent_with_offset_tiepoint() {
        // Tiepoint anchored at pixel (2, 1) instead of the origin.
        let tiepoint = [2.0, 1.0, 0.0, 20.0, 90.0, 0.0];
        let scale = [1.0, 1.0, 0.0];
        let extent = extent_from_tiepoint(&tiepoint, &scale, 4, 4).unwrap();
        assert_eq!(extent, [18.0, 87.0, 22.0, 91.0]);
    }

    #[test]
    fn test_crs_from_geokeys_projected() {
        #[rustfmt::skip]
        let keys = [
            1, 1, 0, 3,
            1024, 0, 1, 1,
            1025, 0, 1, 1,
            3072, 0, 1, 25832,
        ];
        assert_eq!(crs_from_geokeys(&keys), Some("EPSG:25832".to_string()));
    }

    #[test]
    fn test_crs_from_geokeys_geographic_only() {
        #[rustfmt::skip]
        let keys = [
            1, 1, 0, 2,
            1024, 0, 1, 2,
            2048, 0, 1, 4326,
        ];
        assert_eq!(crs_from_geokeys(&keys), Some("EPSG:4326".to_string()));
    }

    #[test]
    fn test_crs_from_geokeys_user_defined() {
        let keys = [1, 1, 0, 1, 3072, 0, 1, 32767];
        assert_eq!(crs_from_geokeys(&keys), None);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = decode_geotiff(b"definitely not a tiff");
        assert!(matches!(result, Err(GeoError::Decode(_))));
    }
}
