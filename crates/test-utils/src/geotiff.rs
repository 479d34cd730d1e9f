//! In-memory GeoTIFF encoding for DEM tests.

use std::io::Cursor;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// GeoKey directory declaring a projected CRS by EPSG code.
pub fn projected_geokeys(epsg: u16) -> [u16; 8] {
    // header (version 1.1.0, 1 key), ProjectedCSTypeGeoKey = epsg
    [1, 1, 0, 1, 3072, 0, 1, epsg]
}

/// Encode a single-band f32 GeoTIFF.
///
/// `tiepoint` is `[I, J, K, X, Y, Z]` and `scale` `[sx, sy, sz]`.
pub fn encode_test_geotiff(
    width: u32,
    height: u32,
    data: &[f32],
    tiepoint: [f64; 6],
    scale: [f64; 3],
    geokeys: Option<&[u16]>,
    nodata: Option<&str>,
) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).expect("tiff encoder");
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(width, height)
            .expect("tiff image");
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .expect("pixel scale tag");
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .expect("tiepoint tag");
        if let Some(keys) = geokeys {
            image
                .encoder()
                .write_tag(Tag::GeoKeyDirectoryTag, keys)
                .expect("geokey tag");
        }
        if let Some(nodata) = nodata {
            image
                .encoder()
                .write_tag(Tag::GdalNodata, nodata)
                .expect("nodata tag");
        }
        image.write_data(data).expect("tiff data");
    }
    buf.into_inner()
}

/// Encode a north-up DEM covering `extent` (`[min_x, min_y, max_x, max_y]`)
/// in a projected EPSG CRS.
pub fn encode_dem_for_extent(
    width: u32,
    height: u32,
    data: &[f32],
    extent: [f64; 4],
    epsg: u16,
) -> Vec<u8> {
    let [min_x, min_y, max_x, max_y] = extent;
    let sx = (max_x - min_x) / width as f64;
    let sy = (max_y - min_y) / height as f64;
    let keys = projected_geokeys(epsg);
    encode_test_geotiff(
        width,
        height,
        data,
        [0.0, 0.0, 0.0, min_x, max_y, 0.0],
        [sx, sy, 0.0],
        Some(&keys[..]),
        None,
    )
}
