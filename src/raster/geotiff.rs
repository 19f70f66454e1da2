use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::{GeoTransform, RasterBand};

impl RasterBand {
    /// Open a GeoTIFF at `path` and load the 1-based `band` as f64 cells.
    ///
    /// Bands are addressed as TIFF directories when the file stores one
    /// sample per pixel, or as interleaved sample planes of the first
    /// directory otherwise. Georeferencing and the no-data sentinel always
    /// come from the first directory. Failure to open or georeference the
    /// raster is fatal; there is no retry.
    pub fn open(path: &Path, band: usize) -> Result<Self> {
        ensure!(band >= 1, "band index is 1-based, got {band}");

        let file = File::open(path)
            .with_context(|| format!("Failed to open raster: {}", path.display()))?;
        let mut decoder = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Unreadable raster format: {}", path.display()))?;

        let transform = read_geotransform(&mut decoder)
            .with_context(|| format!("Failed to georeference raster: {}", path.display()))?;
        let nodata = read_nodata(&mut decoder);

        let samples = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;
        let (values, width, height) = if samples > 1 {
            ensure!(
                band <= samples,
                "band {band} out of range: raster has {samples} sample bands"
            );
            let (width, height) = decoder.dimensions()?;
            let pixels = decode_to_f64(decoder.read_image()?)?;
            let plane = pixels.into_iter().skip(band - 1).step_by(samples).collect();
            (plane, width, height)
        } else {
            for loaded in 1..band {
                ensure!(
                    decoder.more_images(),
                    "band {band} out of range: raster has {loaded} band(s)"
                );
                decoder
                    .next_image()
                    .with_context(|| format!("Failed to advance to band {}", loaded + 1))?;
            }
            let (width, height) = decoder.dimensions()?;
            (decode_to_f64(decoder.read_image()?)?, width, height)
        };

        let data = Array2::from_shape_vec((height as usize, width as usize), values)
            .context("Raster dimensions do not match the decoded buffer")?;
        Self::new(data, transform, nodata)
    }
}

/// Widen any supported sample format to f64.
fn decode_to_f64(image: DecodingResult) -> Result<Vec<f64>> {
    Ok(match image {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        _ => bail!("unsupported raster sample format"),
    })
}

/// Affine georeferencing from GeoTIFF tags: a full ModelTransformation
/// matrix wins, otherwise ModelPixelScale + ModelTiepoint.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Ok(m) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        ensure!(m.len() >= 8, "malformed ModelTransformation tag");
        return Ok(GeoTransform::new([m[3], m[0], m[1], m[7], m[4], m[5]]));
    }

    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag);
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag);
    match (scale, tiepoint) {
        (Ok(scale), Ok(tie)) if scale.len() >= 2 && tie.len() >= 6 => Ok(GeoTransform::new([
            tie[3] - tie[0] * scale[0],
            scale[0],
            0.0,
            tie[4] + tie[1] * scale[1],
            0.0,
            -scale[1],
        ])),
        _ => bail!("no affine georeferencing (ModelTransformation or PixelScale+Tiepoint)"),
    }
}

/// GDAL encodes the no-data sentinel as ASCII in tag 42113.
fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()?
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse()
        .ok()
}
